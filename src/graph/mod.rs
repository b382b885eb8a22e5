//! Knowledge-graph data model and algorithms.
//!
//! The graph is a flat pair of vectors — nodes and directed, typed edges —
//! persisted as a single JSON value and rebuilt wholesale when snippets are
//! deleted.  Identity rules:
//!
//! * a node is identified by its case-insensitive `name` **or** its `id`
//!   (oracle-assigned ids are not globally unique across extraction calls,
//!   so the name is the stronger key);
//! * a relationship is identified by its `(from_node, to_node,
//!   relationship_type)` triple, direction-sensitive.
//!
//! Merging is append-only and first-write-wins: see [`merge::merge`].

pub mod merge;
pub mod query;

pub use merge::{merge, rebuild};

use serde::{Deserialize, Serialize};

/// A graph vertex: one entity or concept extracted from saved text.
///
/// `id` is assigned by the oracle per extraction call and may collide or
/// dangle across calls; `name` is the display key and the primary identity.
/// `node_type` is an open string vocabulary (person, concept, organization,
/// topic, …) — the oracle invents new values freely and we keep them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub description: String,
}

/// A directed, typed edge between two nodes.
///
/// `from_node` / `to_node` hold `Node::id` values.  They SHOULD resolve to
/// nodes in the same graph but are not enforced to: an edge referencing a
/// discarded duplicate node's id is kept as-is and simply fails to resolve
/// (see [`query::neighbors`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "fromNode")]
    pub from_node: String,
    #[serde(rename = "toNode")]
    pub to_node: String,
    #[serde(rename = "relationshipType")]
    pub relationship_type: String,
    #[serde(default)]
    pub description: String,
}

/// The full knowledge graph, and also the shape of one extraction batch —
/// the oracle returns the same `{nodes, relationships}` object that the
/// persistent graph is stored as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Graph {
    /// `true` when the graph holds neither nodes nor relationships.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            node_type: "concept".to_string(),
            description: format!("{name} description"),
        }
    }

    pub fn rel(id: &str, from: &str, to: &str, kind: &str) -> Relationship {
        Relationship {
            id: id.to_string(),
            from_node: from.to_string(),
            to_node: to.to_string(),
            relationship_type: kind.to_string(),
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_default_is_empty() {
        assert!(Graph::default().is_empty());
    }

    #[test]
    fn serde_uses_original_field_names() {
        let g = Graph {
            nodes: vec![fixtures::node("n1", "Python")],
            relationships: vec![fixtures::rel("r1", "n2", "n1", "related to")],
        };
        let json = serde_json::to_string(&g).expect("serialize");
        assert!(json.contains("\"type\":\"concept\""));
        assert!(json.contains("\"fromNode\":\"n2\""));
        assert!(json.contains("\"toNode\":\"n1\""));
        assert!(json.contains("\"relationshipType\":\"related to\""));
    }

    #[test]
    fn deserialize_tolerates_missing_descriptions() {
        let json = r#"{
            "nodes": [{"id": "n1", "name": "AI", "type": "concept"}],
            "relationships": [{"fromNode": "a", "toNode": "b", "relationshipType": "uses"}]
        }"#;
        let g: Graph = serde_json::from_str(json).expect("deserialize");
        assert_eq!(g.nodes[0].description, "");
        assert_eq!(g.relationships[0].id, "");
    }
}
