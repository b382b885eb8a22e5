//! Graph merge and rebuild.
//!
//! [`merge`] folds one extraction batch into the persistent graph under the
//! dedup rules; [`rebuild`] reconstructs the whole graph from the surviving
//! snippet list after a deletion.  Both are pure functions — the store layer
//! decides when their results are written back.

use tracing::debug;

use crate::store::Snippet;

use super::{Graph, Node, Relationship};

/// Merge an extraction batch into an existing graph.
///
/// Dedup rules, first write wins:
/// * an incoming node is discarded when any node already in the merged list
///   has a case-insensitively equal `name` or an equal `id` — no field-level
///   merge, the existing node keeps its description untouched;
/// * an incoming relationship is discarded when the merged list already has
///   one with the same `(from_node, to_node, relationship_type)` triple
///   (direction-sensitive).
///
/// Duplicates are checked against the growing result, so repeats inside a
/// single batch collapse too.  Existing entries keep their relative order;
/// unique incoming entries append in batch order.  Nothing is ever removed
/// or mutated here — removal happens only through [`rebuild`].
///
/// An incoming relationship that references a just-discarded duplicate
/// node's id is kept as-is, not remapped to the surviving node's id.  The
/// resulting dangling edge is tolerated throughout (it resolves by name at
/// display time or not at all).
pub fn merge(existing: &Graph, incoming: &Graph) -> Graph {
    let mut merged = existing.clone();

    for node in &incoming.nodes {
        if find_node(&merged.nodes, node).is_none() {
            merged.nodes.push(node.clone());
        } else {
            debug!(name = %node.name, id = %node.id, "merge: duplicate node discarded");
        }
    }

    for rel in &incoming.relationships {
        if find_relationship(&merged.relationships, rel).is_none() {
            merged.relationships.push(rel.clone());
        } else {
            debug!(
                from = %rel.from_node,
                to = %rel.to_node,
                kind = %rel.relationship_type,
                "merge: duplicate relationship discarded"
            );
        }
    }

    merged
}

/// Reconstruct the graph from scratch out of the surviving snippets.
///
/// Folds each snippet's own extraction batch through the same dedup rules
/// as [`merge`], in stored snippet order.  The result is a deterministic
/// function of the snippet list — the authoritative reconciliation whenever
/// the incrementally-merged graph and the snippet list could disagree.
pub fn rebuild(snippets: &[Snippet]) -> Graph {
    let mut graph = Graph::default();
    for snippet in snippets {
        let batch = Graph {
            nodes: snippet.nodes.clone(),
            relationships: snippet.relationships.clone(),
        };
        graph = merge(&graph, &batch);
    }
    graph
}

/// Locate a node the candidate would duplicate: case-insensitive name match
/// or exact id match.
fn find_node<'a>(nodes: &'a [Node], candidate: &Node) -> Option<&'a Node> {
    let candidate_name = candidate.name.to_lowercase();
    nodes
        .iter()
        .find(|n| n.name.to_lowercase() == candidate_name || n.id == candidate.id)
}

/// Locate a relationship with the same direction-sensitive triple.
fn find_relationship<'a>(
    relationships: &'a [Relationship],
    candidate: &Relationship,
) -> Option<&'a Relationship> {
    relationships.iter().find(|r| {
        r.from_node == candidate.from_node
            && r.to_node == candidate.to_node
            && r.relationship_type == candidate.relationship_type
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{node, rel};

    fn graph(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Graph {
        Graph { nodes, relationships }
    }

    #[test]
    fn merge_appends_unique_entries() {
        let existing = graph(vec![node("n1", "Python")], vec![]);
        let incoming = graph(
            vec![node("n2", "Rust")],
            vec![rel("r1", "n1", "n2", "related to")],
        );
        let merged = merge(&existing, &incoming);
        assert_eq!(merged.nodes.len(), 2);
        assert_eq!(merged.relationships.len(), 1);
        // Existing entries keep their position; new ones append.
        assert_eq!(merged.nodes[0].name, "Python");
        assert_eq!(merged.nodes[1].name, "Rust");
    }

    #[test]
    fn node_dedup_is_case_insensitive_on_name() {
        let existing = graph(vec![node("n1", "ai")], vec![]);
        let incoming = graph(vec![node("n2", "AI")], vec![]);
        let merged = merge(&existing, &incoming);
        assert_eq!(merged.nodes.len(), 1);
        assert_eq!(merged.nodes[0].id, "n1", "existing node wins");
    }

    #[test]
    fn node_dedup_matches_on_id() {
        let existing = graph(vec![node("n1", "Python")], vec![]);
        let incoming = graph(vec![node("n1", "Entirely Different Name")], vec![]);
        let merged = merge(&existing, &incoming);
        assert_eq!(merged.nodes.len(), 1);
        assert_eq!(merged.nodes[0].name, "Python");
    }

    #[test]
    fn first_write_wins_keeps_existing_description() {
        let mut updated = node("n1", "Python");
        updated.description = "a newer, better description".to_string();
        let existing = graph(vec![node("n1", "Python")], vec![]);
        let merged = merge(&existing, &graph(vec![updated], vec![]));
        assert_eq!(merged.nodes[0].description, "Python description");
    }

    #[test]
    fn duplicates_within_one_batch_collapse() {
        let incoming = graph(
            vec![node("a1", "Rust"), node("a2", "rust")],
            vec![
                rel("r1", "a1", "a2", "uses"),
                rel("r2", "a1", "a2", "uses"),
            ],
        );
        let merged = merge(&Graph::default(), &incoming);
        assert_eq!(merged.nodes.len(), 1);
        assert_eq!(merged.relationships.len(), 1);
        assert_eq!(merged.relationships[0].id, "r1");
    }

    #[test]
    fn relationship_triple_dedup_ignores_description() {
        let existing = graph(vec![], vec![rel("r1", "a", "b", "uses")]);
        let mut dup = rel("r2", "a", "b", "uses");
        dup.description = "different wording".to_string();
        let merged = merge(&existing, &graph(vec![], vec![dup]));
        assert_eq!(merged.relationships.len(), 1);
        assert_eq!(merged.relationships[0].id, "r1");
        assert_eq!(merged.relationships[0].description, "");
    }

    #[test]
    fn relationship_direction_is_significant() {
        let existing = graph(vec![], vec![rel("r1", "a", "b", "uses")]);
        let reversed = rel("r2", "b", "a", "uses");
        let merged = merge(&existing, &graph(vec![], vec![reversed]));
        assert_eq!(merged.relationships.len(), 2);
    }

    #[test]
    fn merge_is_idempotent_on_content() {
        let existing = graph(vec![node("n1", "Python")], vec![]);
        let batch = graph(
            vec![node("n2", "Rust"), node("n3", "Go")],
            vec![rel("r1", "n2", "n3", "related to")],
        );
        let once = merge(&existing, &batch);
        let twice = merge(&once, &batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn dangling_edge_to_discarded_node_is_not_remapped() {
        // Snippet B's "python" node is discarded as a duplicate of "Python",
        // but its relationship keeps referencing the discarded id n2.
        let existing = graph(vec![node("n1", "Python")], vec![]);
        let incoming = graph(
            vec![node("n2", "python")],
            vec![rel("r1", "n2", "n1", "related to")],
        );
        let merged = merge(&existing, &incoming);
        assert_eq!(merged.nodes.len(), 1);
        assert_eq!(merged.nodes[0].id, "n1");
        assert_eq!(merged.relationships.len(), 1);
        assert_eq!(merged.relationships[0].from_node, "n2");
        assert_eq!(merged.relationships[0].to_node, "n1");
    }

    #[test]
    fn rebuild_accumulates_across_snippets_in_order() {
        let snippets = vec![
            Snippet::test_fixture(
                "s1",
                vec![node("n1", "Python")],
                vec![],
            ),
            Snippet::test_fixture(
                "s2",
                vec![node("n2", "python"), node("n3", "Rust")],
                vec![rel("r1", "n2", "n1", "related to")],
            ),
        ];
        let graph = rebuild(&snippets);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "n1");
        assert_eq!(graph.nodes[1].id, "n3");
        assert_eq!(graph.relationships.len(), 1);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let snippets = vec![
            Snippet::test_fixture("s1", vec![node("n1", "A"), node("n2", "B")], vec![]),
            Snippet::test_fixture(
                "s2",
                vec![node("n3", "b")],
                vec![rel("r1", "n1", "n2", "uses"), rel("r2", "n2", "n1", "uses")],
            ),
        ];
        assert_eq!(rebuild(&snippets), rebuild(&snippets));
    }

    #[test]
    fn rebuild_of_empty_list_is_empty_graph() {
        assert!(rebuild(&[]).is_empty());
    }
}
