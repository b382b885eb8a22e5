//! Read-only graph queries used by display surfaces.
//!
//! Dangling edges (a `from_node`/`to_node` id with no matching node) are
//! skipped by resolution helpers, never treated as errors.

use super::{Graph, Node, Relationship};

/// A relationship together with the resolved peer node on its far side.
#[derive(Debug, Clone)]
pub struct Neighbor<'a> {
    pub relationship: &'a Relationship,
    pub node: &'a Node,
}

/// Number of relationships that reference `node_id` on either end.
pub fn degree(graph: &Graph, node_id: &str) -> usize {
    graph
        .relationships
        .iter()
        .filter(|r| r.from_node == node_id || r.to_node == node_id)
        .count()
}

/// The `limit` most-connected nodes, ordered by descending degree.
///
/// Ties keep graph order (stable sort), so output is deterministic.
pub fn top_nodes_by_degree<'a>(graph: &'a Graph, limit: usize) -> Vec<&'a Node> {
    let mut ranked: Vec<(&Node, usize)> = graph
        .nodes
        .iter()
        .map(|n| (n, degree(graph, &n.id)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(n, _)| n).collect()
}

/// Case-insensitive substring filter over node name, type, and description.
pub fn filter_nodes<'a>(graph: &'a Graph, query: &str) -> Vec<&'a Node> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return graph.nodes.iter().collect();
    }
    graph
        .nodes
        .iter()
        .filter(|n| {
            n.name.to_lowercase().contains(&q)
                || n.node_type.to_lowercase().contains(&q)
                || n.description.to_lowercase().contains(&q)
        })
        .collect()
}

/// Relationships touching `node_id`, each with the peer node resolved.
///
/// Edges whose far end does not resolve to a node in the graph are omitted
/// — this is where dangling edges silently fail to render.
pub fn neighbors<'a>(graph: &'a Graph, node_id: &str) -> Vec<Neighbor<'a>> {
    graph
        .relationships
        .iter()
        .filter(|r| r.from_node == node_id || r.to_node == node_id)
        .filter_map(|r| {
            let peer_id = if r.from_node == node_id { &r.to_node } else { &r.from_node };
            graph
                .nodes
                .iter()
                .find(|n| &n.id == peer_id)
                .map(|node| Neighbor { relationship: r, node })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{node, rel};

    fn sample() -> Graph {
        Graph {
            nodes: vec![node("n1", "Python"), node("n2", "Rust"), node("n3", "Go")],
            relationships: vec![
                rel("r1", "n1", "n2", "related to"),
                rel("r2", "n1", "n3", "related to"),
                rel("r3", "n2", "ghost", "uses"),
            ],
        }
    }

    #[test]
    fn degree_counts_both_directions() {
        let g = sample();
        assert_eq!(degree(&g, "n1"), 2);
        assert_eq!(degree(&g, "n2"), 2);
        assert_eq!(degree(&g, "n3"), 1);
    }

    #[test]
    fn top_nodes_ranked_and_limited() {
        let g = sample();
        let top = top_nodes_by_degree(&g, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "n1");
    }

    #[test]
    fn filter_matches_name_type_and_description() {
        let g = sample();
        assert_eq!(filter_nodes(&g, "pyth").len(), 1);
        assert_eq!(filter_nodes(&g, "CONCEPT").len(), 3);
        assert!(filter_nodes(&g, "no such thing").is_empty());
    }

    #[test]
    fn blank_filter_returns_all_nodes() {
        let g = sample();
        assert_eq!(filter_nodes(&g, "   ").len(), 3);
    }

    #[test]
    fn neighbors_resolve_peers_and_skip_dangling() {
        let g = sample();
        let n2_neighbors = neighbors(&g, "n2");
        // r1 resolves to n1; r3 points at "ghost" and is skipped.
        assert_eq!(n2_neighbors.len(), 1);
        assert_eq!(n2_neighbors[0].node.id, "n1");
        assert_eq!(n2_neighbors[0].relationship.relationship_type, "related to");
    }
}
