//! Prompt composition — pure string builders, no oracle calls.
//!
//! Three templates: extraction (new text + serialized existing graph),
//! relevance ranking (query + enumerated snippet previews), and prompt
//! optimization (query + formatted context).  Templates use `{{key}}`
//! placeholders substituted at build time; the serialization helpers
//! (`format_existing_graph`, `format_context`, `domain_of`) are public
//! because the engine reuses them for fallback output.

use crate::graph::Graph;
use crate::store::Snippet;

/// Maximum snippet preview length in the relevance enumeration.
const RELEVANCE_PREVIEW_CHARS: usize = 200;

// ── Templates ─────────────────────────────────────────────────────────────────

const EXTRACTION_TEMPLATE: &str = r#"You are an expert knowledge graph extraction system. Analyze the provided text and extract meaningful nodes (entities/concepts) and their relationships.

EXISTING GRAPH CONTEXT:
{{existing_context}}

NEW TEXT TO ANALYZE:
"{{text}}"

INSTRUCTIONS:
1. Extract 3-7 key nodes (entities, concepts, people, organizations, topics) from the text
2. Identify meaningful relationships between nodes (both within the new text and connections to existing nodes)
3. Each node should have: name, type (person, concept, organization, topic, etc.), description
4. Each relationship should have: fromNode, toNode, relationshipType, description
5. Consider the existing graph context to avoid duplicates and find connections
6. IMPORTANT: Look for conceptual relationships between related terms across different snippets. For example:
   - "Artificial Intelligence" and "Machine Learning" should be connected (e.g., "Machine Learning" is a "subset of" "Artificial Intelligence")
   - "Python" and "Programming" should be connected (e.g., "Python" is a "type of" "Programming Language")
   - "Neural Networks" and "Deep Learning" should be connected (e.g., "Neural Networks" are "fundamental to" "Deep Learning")
7. Use relationship types like: "subset of", "type of", "part of", "related to", "uses", "implements", "applies", "fundamental to", "relies on", "enables", "includes"
8. When you find a concept in the new text that is semantically related to an existing node, create a relationship even if they weren't mentioned together
9. Prioritize creating cross-snippet conceptual connections that build a more interconnected knowledge graph

Return a JSON object with this exact structure:
{
  "nodes": [
    {
      "id": "unique_id",
      "name": "Node Name",
      "type": "node_type",
      "description": "Brief description"
    }
  ],
  "relationships": [
    {
      "id": "unique_id",
      "fromNode": "node_id",
      "toNode": "node_id",
      "relationshipType": "relationship_type",
      "description": "Relationship description"
    }
  ]
}

Return ONLY the JSON object, no explanation."#;

const RELEVANCE_TEMPLATE: &str = r#"You are an expert at identifying relevant context for user queries. Given a user's prompt and a list of saved text snippets, identify which snippets are most relevant to help answer or improve the user's prompt.

USER PROMPT:
"{{query}}"

SAVED SNIPPETS:
{{snippets}}

INSTRUCTIONS:
Analyze the user's prompt and identify which saved snippets would be most helpful for:
1. Providing relevant background context
2. Supporting the user's request with specific information
3. Adding domain expertise or examples
4. Enhancing the prompt with related concepts

For example, if the user says "write an email reply to Alicia", look for all snippets that mention "Alicia" or contain previous email conversations with her.

Return ONLY a JSON array of the indices of the most relevant snippets, ordered by relevance (most relevant first). Return at most {{max_results}} indices. If no snippets are relevant, return an empty array [].

Example response: [2, 7, 1, 4]

Return ONLY the JSON array, no explanation."#;

const OPTIMIZATION_TEMPLATE: &str = r#"You are an expert prompt engineer. Transform the user's prompt using advanced prompt engineering techniques and integrate all relevant context from their saved sources.

OPTIMIZATION FRAMEWORK:
1. ROLE & EXPERTISE: Add "You are [specific expert/role]" when helpful
2. TASK CLARITY: Make the request specific and actionable
3. FORMAT & CONSTRAINTS: Specify output format, length, tone, audience
4. CONTEXT INTEGRATION: Weave in ALL relevant saved context naturally
5. STRUCTURED APPROACH: Use step-by-step when complex tasks benefit

PROMPT ENGINEERING TECHNIQUES TO APPLY:
- Start with role assignment when beneficial ("You are a [expert]...")
- Add specific constraints (word count, format, audience)
- Include context naturally within the prompt body
- Use structured templates: "I need [task] for [audience/purpose]. Please present it in [format], with [constraints]"
- Add instruction stacking: "First [step 1], then [step 2]" for complex tasks
- Specify tone and style requirements

SAVED CONTEXT TO INTEGRATE:
{{context}}

ORIGINAL USER PROMPT:
{{original_prompt}}

INSTRUCTIONS:
Rewrite the prompt to be more effective by:
1. Incorporating ALL relevant context from the saved context naturally into the prompt body. Do not assume any prior knowledge.
2. Applying appropriate prompt engineering techniques from the framework above
3. Making the request more specific and actionable
4. Adding helpful constraints (format, length, audience, tone) when beneficial
5. Structuring complex requests with clear steps

Return ONLY the optimized prompt with no explanation or meta-commentary."#;

// ── Builders ──────────────────────────────────────────────────────────────────

/// Extraction prompt: the new text plus a serialization of the current graph
/// so the oracle can dedupe against it and propose cross-snippet edges.
pub fn extraction_prompt(text: &str, existing: &Graph) -> String {
    render(
        EXTRACTION_TEMPLATE,
        &[
            ("existing_context", &format_existing_graph(existing)),
            ("text", text),
        ],
    )
}

/// Relevance-ranking prompt enumerating every snippet by zero-based index.
pub fn relevance_prompt(query: &str, snippets: &[Snippet], max_results: usize) -> String {
    let listing = snippets
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let concepts = if s.nodes.is_empty() {
                String::new()
            } else {
                let names: Vec<&str> = s.nodes.iter().map(|n| n.name.as_str()).collect();
                format!("\nConcepts: {}", names.join(", "))
            };
            format!(
                "{index}: From {}: \"{}\"{concepts}",
                domain_of(&s.source_url),
                preview(&s.text, RELEVANCE_PREVIEW_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    render(
        RELEVANCE_TEMPLATE,
        &[
            ("query", query),
            ("snippets", &listing),
            ("max_results", &max_results.to_string()),
        ],
    )
}

/// Optimization prompt: the original user prompt plus already-formatted
/// context (see [`format_context`]).
pub fn optimization_prompt(original_prompt: &str, context: &str) -> String {
    render(
        OPTIMIZATION_TEMPLATE,
        &[("context", context), ("original_prompt", original_prompt)],
    )
}

// ── Serialization helpers ─────────────────────────────────────────────────────

/// Human-readable serialization of the existing graph for the extraction
/// prompt.
pub fn format_existing_graph(graph: &Graph) -> String {
    if graph.is_empty() {
        return "No existing graph data.".to_string();
    }

    let mut context = String::from("EXISTING NODES:\n");
    for node in &graph.nodes {
        context.push_str(&format!(
            "- {} ({}): {}\n",
            node.name, node.node_type, node.description
        ));
    }

    if !graph.relationships.is_empty() {
        context.push_str("\nEXISTING RELATIONSHIPS:\n");
        for rel in &graph.relationships {
            context.push_str(&format!(
                "- {} {} {}: {}\n",
                rel.from_node, rel.relationship_type, rel.to_node, rel.description
            ));
        }
    }

    context
}

/// Context block handed to the optimization prompt (and used verbatim as the
/// fallback prefix when the optimization call itself fails).
///
/// Empty input formats to the empty string, so an empty history degrades to
/// the original prompt alone.
pub fn format_context(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return String::new();
    }

    let mut context = String::from("RELEVANT CONTEXT:\n");
    for (index, s) in snippets.iter().enumerate() {
        context.push_str(&format!(
            "{}. From {}: \"{}\"\n",
            index + 1,
            domain_of(&s.source_url),
            s.text
        ));
        if !s.nodes.is_empty() {
            let names: Vec<&str> = s.nodes.iter().map(|n| n.name.as_str()).collect();
            context.push_str(&format!("   Key concepts: {}\n", names.join(", ")));
        }
    }
    context.push_str("\nUSING THE ABOVE CONTEXT:\n");
    context
}

/// Hostname of `url` minus a leading `www.`, or `"unknown"` when the URL is
/// blank or malformed.  Display grouping only — never an identity key.
pub fn domain_of(url: &str) -> String {
    let rest = match url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() => rest,
        _ => return "unknown".to_string(),
    };
    let host_port = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default();
    if host.is_empty() {
        return "unknown".to_string();
    }
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Truncate `text` to at most `max_chars` characters, appending `…` when
/// anything was cut.  Char-boundary safe.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Substitute `{{key}}` placeholders.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}
