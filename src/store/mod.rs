//! Persistent state — snippets and the merged graph.
//!
//! Persistence is two whole-value records behind the [`StateStore`] trait:
//!
//! * `"snippets"` — JSON array of every saved [`Snippet`], in save order;
//! * `"graph"` — the current merged [`Graph`], a materialized view that is
//!   always re-derivable from the snippet list via
//!   [`rebuild`](crate::graph::rebuild).
//!
//! Stores are pluggable backends with blocking I/O (`Send + Sync`);
//! [`StoreHandle`] wraps calls in `spawn_blocking` so async callers never
//! block, mirroring how session stores are dispatched elsewhere in this
//! codebase's lineage.  A single `set` call is assumed atomic; nothing here
//! provides atomicity across the two records — the engine's writer lock
//! keeps them consistent instead.

pub mod json_file;
pub mod mem;

pub use json_file::JsonFileStore;
pub use mem::MemStore;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::graph::{Graph, Node, Relationship};

/// Record key for the snippet list.
pub const SNIPPETS_KEY: &str = "snippets";
/// Record key for the merged graph.
pub const GRAPH_KEY: &str = "graph";

/// One saved unit of text plus the extraction batch attributed to it.
///
/// Immutable after creation.  `nodes`/`relationships` are a denormalized
/// copy of what the oracle extracted *for this snippet* (empty when the
/// extraction failed); the authoritative aggregate lives in the graph
/// record.  The per-snippet copy is what makes
/// [`rebuild`](crate::graph::rebuild) possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// UUIDv7 — time-ordered, the sole external key.
    pub id: String,
    pub text: String,
    /// Origin reference; may be blank or malformed, used only for display
    /// grouping and never for equality.
    #[serde(rename = "sourceUrl", default)]
    pub source_url: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Snippet {
    /// Create a snippet with a fresh id and the current timestamp.
    pub fn new(text: String, source_url: String, batch: Graph) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            text,
            source_url,
            timestamp: chrono::Utc::now().timestamp_millis(),
            nodes: batch.nodes,
            relationships: batch.relationships,
        }
    }

    /// `true` when this snippet's own batch mentions `node`, by id or by
    /// case-insensitive name.
    pub fn mentions(&self, node: &Node) -> bool {
        let name = node.name.to_lowercase();
        self.nodes
            .iter()
            .any(|n| n.id == node.id || n.name.to_lowercase() == name)
    }

    #[cfg(test)]
    pub(crate) fn test_fixture(
        id: &str,
        nodes: Vec<Node>,
        relationships: Vec<Relationship>,
    ) -> Self {
        Self {
            id: id.to_string(),
            text: format!("text of {id}"),
            source_url: "https://example.com/page".to_string(),
            timestamp: 0,
            nodes,
            relationships,
        }
    }
}

/// Pluggable persistence backend: whole-value get/set of named records.
///
/// Implementations use blocking I/O and must be cheap to share behind an
/// `Arc`.  Callers go through [`StoreHandle`], which owns the
/// `spawn_blocking` dispatch and the JSON (de)serialization.
pub trait StateStore: Send + Sync {
    /// Unique backend name (e.g. `"json_file"`), for logs.
    fn store_type(&self) -> &str;

    /// Read a record. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write a record, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Async façade over a [`StateStore`]: typed reads and writes of the two
/// records, dispatched to the blocking pool.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn StateStore>,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Read the snippet list; a never-written record is the empty list.
    pub async fn snippets(&self) -> Result<Vec<Snippet>, AppError> {
        let raw = self.get(SNIPPETS_KEY).await?;
        match raw {
            Some(data) => serde_json::from_str(&data)
                .map_err(|e| AppError::Store(format!("malformed snippets record: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Read the merged graph; a never-written record is the empty graph.
    pub async fn graph(&self) -> Result<Graph, AppError> {
        let raw = self.get(GRAPH_KEY).await?;
        match raw {
            Some(data) => serde_json::from_str(&data)
                .map_err(|e| AppError::Store(format!("malformed graph record: {e}"))),
            None => Ok(Graph::default()),
        }
    }

    /// Write both records.
    ///
    /// Two separate `set` calls — there is no cross-record transaction, so
    /// this must only run inside the engine's writer critical section.
    pub async fn write_state(&self, snippets: &[Snippet], graph: &Graph) -> Result<(), AppError> {
        let snippets_json = serde_json::to_string_pretty(snippets)
            .map_err(|e| AppError::Store(format!("serialize snippets: {e}")))?;
        let graph_json = serde_json::to_string_pretty(graph)
            .map_err(|e| AppError::Store(format!("serialize graph: {e}")))?;
        self.set(SNIPPETS_KEY, snippets_json).await?;
        self.set(GRAPH_KEY, graph_json).await
    }

    async fn get(&self, key: &'static str) -> Result<Option<String>, AppError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.get(key))
            .await
            .map_err(|e| AppError::Store(format!("get join: {e}")))?
    }

    async fn set(&self, key: &'static str, value: String) -> Result<(), AppError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.set(key, &value))
            .await
            .map_err(|e| AppError::Store(format!("set join: {e}")))?
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("store_type", &self.store.store_type())
            .finish()
    }
}
