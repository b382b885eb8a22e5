//! Weaver — knowledge-graph snippet memory.
//!
//! Save text snippets, let an external LLM ("the oracle") extract entities
//! and relationships from each one, and keep the results merged into a
//! single deduplicated graph.  Saved history doubles as retrieval context:
//! `optimize_query` asks the oracle which snippets matter for a new prompt
//! and rewrites the prompt around them.
//!
//! The [`engine::Weaver`] type is the public surface; everything else is
//! the machinery behind its six operations (save / delete / clear /
//! optimize / graph / snippets).

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod logger;
pub mod oracle;
pub mod parse;
pub mod prompts;
pub mod select;
pub mod store;

pub use engine::Weaver;
pub use error::AppError;
