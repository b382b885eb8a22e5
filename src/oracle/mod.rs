//! Oracle abstraction — the external completion service.
//!
//! `OracleProvider` is an enum over concrete backends.  Enum dispatch avoids
//! `dyn` trait objects and the `async-trait` dependency; adding a backend =
//! new module in `providers/` + new variant + new `complete` arm.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! There is no retry policy at this layer: the first failure is terminal for
//! that call, and recovery (empty batch, unranked fallback) belongs to the
//! callers.

pub mod providers;

pub use providers::dummy::DummyProvider;
pub use providers::gemini::GeminiProvider;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("unknown oracle provider: {0}")]
    UnknownProvider(String),

    /// API key required but absent — set `WEAVER_API_KEY`.
    #[error("oracle provider '{0}' requires an api key (set WEAVER_API_KEY)")]
    MissingApiKey(String),

    /// Network-level failure: connect, TLS, timeout, undecodable body.
    #[error("oracle transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx response that carried no usable completion text.
    #[error("oracle returned no usable text")]
    EmptyCompletion,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available oracle backends.
#[derive(Debug, Clone)]
pub enum OracleProvider {
    Gemini(GeminiProvider),
    Dummy(DummyProvider),
}

impl OracleProvider {
    /// Send `prompt` and return the oracle's first textual completion.
    pub async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        match self {
            OracleProvider::Gemini(p) => p.complete(prompt).await,
            OracleProvider::Dummy(p) => p.complete(prompt).await,
        }
    }
}
