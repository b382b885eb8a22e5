//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! when it exists (every key has a default, so the file is optional), then
//! applies env overrides:
//!
//! * `WEAVER_DATA_DIR`  — where the JSON records live
//! * `WEAVER_LOG_LEVEL` — tracing filter fallback
//! * `WEAVER_API_KEY`   — oracle API key; env only, never TOML

use std::{env, fs, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::error::AppError;

const CONFIG_PATH: &str = "config/default.toml";

/// Oracle endpoint configuration (`[oracle]` in the TOML).
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Which backend is active (`"gemini"` or `"dummy"`).
    pub provider: String,
    /// Full completion endpoint URL; the API key is appended as a query
    /// parameter at request time.
    pub api_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for persistent records (already expanded, no `~`).
    pub data_dir: PathBuf,
    pub log_level: String,
    pub oracle: OracleConfig,
    /// API key from `WEAVER_API_KEY` env — `None` for keyless providers.
    /// Never sourced from TOML.
    pub api_key: Option<String>,
    /// Bound on snippets selected as context for query optimization.
    pub max_context_snippets: usize,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    weaver: RawWeaver,
    #[serde(default)]
    oracle: RawOracle,
    #[serde(default)]
    context: RawContext,
}

#[derive(Debug, Deserialize)]
struct RawWeaver {
    #[serde(default = "default_data_dir")]
    data_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct RawOracle {
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default = "default_api_url")]
    api_url: String,
    #[serde(default = "default_timeout")]
    timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    #[serde(default = "default_max_snippets")]
    max_snippets: usize,
}

impl Default for RawWeaver {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), log_level: default_log_level() }
    }
}

impl Default for RawOracle {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for RawContext {
    fn default() -> Self {
        Self { max_snippets: default_max_snippets() }
    }
}

fn default_data_dir() -> String {
    "~/.weaver".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_snippets() -> usize {
    crate::select::DEFAULT_MAX_RESULTS
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load configuration: TOML file (optional) + env overrides.
pub fn load() -> Result<Config, AppError> {
    let raw = if Path::new(CONFIG_PATH).exists() {
        let data = fs::read_to_string(CONFIG_PATH)
            .map_err(|e| AppError::Config(format!("cannot read {CONFIG_PATH}: {e}")))?;
        parse_raw(&data)?
    } else {
        RawConfig::default()
    };
    resolve(raw)
}

fn parse_raw(data: &str) -> Result<RawConfig, AppError> {
    toml::from_str(data).map_err(|e| AppError::Config(format!("malformed config: {e}")))
}

fn resolve(raw: RawConfig) -> Result<Config, AppError> {
    let data_dir = env::var("WEAVER_DATA_DIR").unwrap_or(raw.weaver.data_dir);
    let log_level = env::var("WEAVER_LOG_LEVEL").unwrap_or(raw.weaver.log_level);
    let api_key = env::var("WEAVER_API_KEY").ok().filter(|k| !k.is_empty());

    if raw.context.max_snippets == 0 {
        return Err(AppError::Config("context.max_snippets must be > 0".to_string()));
    }

    Ok(Config {
        data_dir: expand_tilde(&data_dir),
        log_level,
        oracle: OracleConfig {
            provider: raw.oracle.provider,
            api_url: raw.oracle.api_url,
            timeout_seconds: raw.oracle.timeout_seconds,
        },
        api_key,
        max_context_snippets: raw.context.max_snippets,
    })
}

/// Expand a leading `~/` using the home directory; paths without it pass
/// through untouched.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_resolves_to_defaults() {
        let raw = parse_raw("").expect("parse");
        assert_eq!(raw.oracle.provider, "gemini");
        assert_eq!(raw.oracle.timeout_seconds, 30);
        assert_eq!(raw.context.max_snippets, 5);
        assert!(raw.oracle.api_url.contains("generateContent"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let raw = parse_raw(
            "[oracle]\nprovider = \"dummy\"\n\n[context]\nmax_snippets = 3\n",
        )
        .expect("parse");
        assert_eq!(raw.oracle.provider, "dummy");
        assert_eq!(raw.context.max_snippets, 3);
        assert_eq!(raw.weaver.log_level, "info");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = parse_raw("[oracle\nbroken").expect_err("should fail");
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn zero_max_snippets_rejected() {
        let raw = parse_raw("[context]\nmax_snippets = 0\n").expect("parse");
        let err = resolve(raw).expect_err("should reject");
        assert!(err.to_string().contains("max_snippets"));
    }

    #[test]
    fn tilde_expansion() {
        let expanded = expand_tilde("~/data");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }
}
