//! Oracle provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;

use crate::config::OracleConfig;
use crate::oracle::{OracleError, OracleProvider};

/// Construct an [`OracleProvider`] from config and an optional API key.
///
/// `api_key` is sourced from the `WEAVER_API_KEY` env var (never TOML) and
/// is only required by backends that authenticate.
pub fn build(config: &OracleConfig, api_key: Option<String>) -> Result<OracleProvider, OracleError> {
    match config.provider.as_str() {
        "dummy" => Ok(OracleProvider::Dummy(dummy::DummyProvider::new())),
        "gemini" => {
            let key = api_key.ok_or_else(|| OracleError::MissingApiKey("gemini".to_string()))?;
            let p = gemini::GeminiProvider::new(
                config.api_url.clone(),
                key,
                config.timeout_seconds,
            )?;
            Ok(OracleProvider::Gemini(p))
        }
        other => Err(OracleError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> OracleConfig {
        OracleConfig {
            provider: provider.to_string(),
            api_url: "https://example.invalid/v1beta/models/test:generateContent".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn builds_dummy_without_key() {
        let p = build(&config("dummy"), None).expect("build dummy");
        assert!(matches!(p, OracleProvider::Dummy(_)));
    }

    #[test]
    fn gemini_requires_api_key() {
        let err = build(&config("gemini"), None).expect_err("should require key");
        assert!(matches!(err, OracleError::MissingApiKey(_)));
    }

    #[test]
    fn gemini_builds_with_key() {
        let p = build(&config("gemini"), Some("test-key".into())).expect("build gemini");
        assert!(matches!(p, OracleProvider::Gemini(_)));
    }

    #[test]
    fn unknown_provider_errors() {
        let err = build(&config("clippy"), None).expect_err("unknown");
        assert!(err.to_string().contains("clippy"));
    }
}
