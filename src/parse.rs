//! Parsing of oracle completions into structured data.
//!
//! Completions routinely arrive wrapped in conversational code fences
//! (```` ```json … ``` ````) — [`strip_code_fences`] removes those before
//! the strict serde decode.  Parse failures are tagged per completion kind
//! so callers can apply the right recovery: an extraction failure degrades
//! to an empty batch, a relevance failure degrades to unranked context.

use thiserror::Error;
use tracing::debug;

use crate::graph::Graph;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed extraction: {0}")]
    MalformedExtraction(String),

    #[error("malformed relevance list: {0}")]
    MalformedRelevance(String),
}

/// Remove code-fence markers anywhere in the text and trim the result.
///
/// Handles the common oracle framings: a leading ```` ```json ```` (with or
/// without trailing newline), bare ```` ``` ```` fences, and stray fences
/// mid-text.  Everything between fences is preserved.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Decode an extraction completion into a node/relationship batch.
///
/// After the serde decode, entries that fail basic shape checks are dropped:
/// nodes with a blank `name` or `type`, relationships with a blank endpoint
/// or `relationship_type`.  No deeper validation — dedup and reference
/// resolution are the merge layer's concern.
pub fn parse_extraction(raw: &str) -> Result<Graph, ParseError> {
    let cleaned = strip_code_fences(raw);
    let mut batch: Graph = serde_json::from_str(&cleaned)
        .map_err(|e| ParseError::MalformedExtraction(format!("{e}; raw: {}", preview(raw))))?;

    let nodes_before = batch.nodes.len();
    let rels_before = batch.relationships.len();
    batch
        .nodes
        .retain(|n| !n.name.trim().is_empty() && !n.node_type.trim().is_empty());
    batch.relationships.retain(|r| {
        !r.from_node.trim().is_empty()
            && !r.to_node.trim().is_empty()
            && !r.relationship_type.trim().is_empty()
    });
    if batch.nodes.len() < nodes_before || batch.relationships.len() < rels_before {
        debug!(
            dropped_nodes = nodes_before - batch.nodes.len(),
            dropped_relationships = rels_before - batch.relationships.len(),
            "extraction batch contained blank-field entries"
        );
    }

    Ok(batch)
}

/// Decode a relevance completion into a raw index list.
///
/// Range validation is the selector's job — this only guarantees "a JSON
/// array of integers".
pub fn parse_relevance_indices(raw: &str) -> Result<Vec<i64>, ParseError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| ParseError::MalformedRelevance(format!("{e}; raw: {}", preview(raw))))
}

/// First 120 chars of the raw completion, for error context without dumping
/// entire completions into logs.
fn preview(raw: &str) -> String {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    if end < trimmed.len() {
        format!("{}…", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}
