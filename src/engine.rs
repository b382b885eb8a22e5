//! The engine — owns the store and the oracle, exposes the public
//! operations consumed by display surfaces (CLI, future UIs).
//!
//! ## Write serialization
//!
//! Save, delete, and clear each perform a read-modify-write of the two
//! store records.  A save additionally spends seconds in an oracle round
//! trip before its write, so an unserialized design has a classic
//! lost-update hazard: a delete completing mid-flight would be overwritten
//! by the save's stale snapshot, resurrecting the deleted snippet's graph
//! contribution.
//!
//! All read-modify-write sequences therefore run under one writer lock, and
//! a save re-reads the store *inside* the critical section, after its
//! oracle round trip.  The graph snapshot taken before the oracle call is
//! only prompt context — advisory data that may go stale without harm.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::graph::{self, Graph, Node};
use crate::oracle::{self, OracleProvider};
use crate::parse;
use crate::prompts;
use crate::select;
use crate::store::{JsonFileStore, Snippet, StateStore, StoreHandle};

pub struct Weaver {
    store: StoreHandle,
    oracle: OracleProvider,
    /// Bound on snippets selected as context for `optimize_query`.
    max_context_snippets: usize,
    /// Serializes every store read-modify-write sequence.
    write_lock: Mutex<()>,
}

impl Weaver {
    /// Assemble an engine from parts.  Prefer [`from_config`](Self::from_config)
    /// outside of tests.
    pub fn new(
        store: Arc<dyn StateStore>,
        oracle: OracleProvider,
        max_context_snippets: usize,
    ) -> Self {
        Self {
            store: StoreHandle::new(store),
            oracle,
            max_context_snippets,
            write_lock: Mutex::new(()),
        }
    }

    /// Build the engine the way `main` does: JSON-file store under the
    /// configured data dir, oracle provider from config + env key.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = JsonFileStore::open(&config.data_dir)?;
        let provider = oracle::providers::build(&config.oracle, config.api_key.clone())?;
        Ok(Self::new(
            Arc::new(store),
            provider,
            config.max_context_snippets,
        ))
    }

    // ── Save ──────────────────────────────────────────────────────────────

    /// Save a snippet: extract its entities through the oracle, merge them
    /// into the graph, persist both records.
    ///
    /// Extraction failures of any kind (transport, HTTP, empty completion,
    /// malformed output) are recoverable: the snippet is still saved, with
    /// an empty batch, and the graph simply learns nothing from it.
    pub async fn save_snippet(&self, text: &str, source_url: &str) -> Result<Snippet, AppError> {
        // Snapshot for prompt context only — the authoritative read happens
        // again under the lock below.
        let graph_snapshot = self.store.graph().await?;
        let batch = self.extract(text, &graph_snapshot).await;

        let snippet = Snippet::new(text.to_string(), source_url.to_string(), batch.clone());

        let _guard = self.write_lock.lock().await;
        let mut snippets = self.store.snippets().await?;
        let graph = self.store.graph().await?;
        let merged = graph::merge(&graph, &batch);
        snippets.push(snippet.clone());
        self.store.write_state(&snippets, &merged).await?;

        info!(
            id = %snippet.id,
            nodes = snippet.nodes.len(),
            relationships = snippet.relationships.len(),
            preview = %prompts::preview(text, 50),
            "snippet saved"
        );
        Ok(snippet)
    }

    /// One extraction round trip, degraded to an empty batch on any failure.
    async fn extract(&self, text: &str, existing: &Graph) -> Graph {
        let prompt = prompts::extraction_prompt(text, existing);
        let completion = match self.oracle.complete(&prompt).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "oracle extraction failed, saving snippet without graph data");
                return Graph::default();
            }
        };
        match parse::parse_extraction(&completion) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "extraction unparseable, saving snippet without graph data");
                Graph::default()
            }
        }
    }

    // ── Delete / clear ────────────────────────────────────────────────────

    /// Delete a snippet and rebuild the graph from the survivors.
    ///
    /// The graph cannot be shrunk incrementally — the merged graph does not
    /// track which snippet contributed which entry — so deletion always
    /// goes through a full [`graph::rebuild`].  An unknown id is a no-op.
    pub async fn delete_snippet(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut snippets = self.store.snippets().await?;
        let before = snippets.len();
        snippets.retain(|s| s.id != id);
        if snippets.len() == before {
            debug!(%id, "delete: no snippet with this id");
        }
        let graph = graph::rebuild(&snippets);
        self.store.write_state(&snippets, &graph).await?;
        info!(%id, remaining = snippets.len(), "snippet deleted");
        Ok(())
    }

    /// Drop all snippets and the graph.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.store.write_state(&[], &Graph::default()).await?;
        info!("all snippets cleared");
        Ok(())
    }

    // ── Query optimization ────────────────────────────────────────────────

    /// Enrich `original_prompt` with relevant saved context and rewrite it
    /// through the oracle.
    ///
    /// Two independent degradation layers: if relevance selection fails the
    /// context falls back to the first N snippets unranked; if the
    /// optimization call itself fails the formatted context is prepended to
    /// the original prompt and returned as-is.
    pub async fn optimize_query(&self, original_prompt: &str) -> Result<String, AppError> {
        let snippets = self.store.snippets().await?;

        let selected = match select::select_relevant(
            &self.oracle,
            original_prompt,
            &snippets,
            self.max_context_snippets,
        )
        .await
        {
            Ok(selected) => selected,
            Err(e) => {
                warn!(error = %e, "relevance selection failed, using unranked context");
                snippets
                    .iter()
                    .take(self.max_context_snippets)
                    .cloned()
                    .collect()
            }
        };

        let context = prompts::format_context(&selected);
        let prompt = prompts::optimization_prompt(original_prompt, &context);
        match self.oracle.complete(&prompt).await {
            Ok(optimized) => Ok(optimized),
            Err(e) => {
                warn!(error = %e, "optimization call failed, returning context-prefixed prompt");
                Ok(format!("{context}{original_prompt}"))
            }
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Current merged graph.
    pub async fn graph(&self) -> Result<Graph, AppError> {
        self.store.graph().await
    }

    /// All saved snippets, in save order.
    pub async fn snippets(&self) -> Result<Vec<Snippet>, AppError> {
        self.store.snippets().await
    }

    /// Snippets whose own extraction batch mentions `node`, by id or
    /// case-insensitive name.
    pub async fn snippets_mentioning(&self, node: &Node) -> Result<Vec<Snippet>, AppError> {
        let snippets = self.store.snippets().await?;
        Ok(snippets.into_iter().filter(|s| s.mentions(node)).collect())
    }
}

impl std::fmt::Debug for Weaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weaver")
            .field("store", &self.store)
            .field("max_context_snippets", &self.max_context_snippets)
            .finish()
    }
}
