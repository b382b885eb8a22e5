//! Gemini `generateContent` provider.
//!
//! One round-trip per call: POST `{api_url}?key={api_key}` with the prompt
//! as a single user part.  All wire types are private to this module —
//! callers never see them.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::oracle::OracleError;

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for the Gemini `generateContent` endpoint.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.  The API key travels as a
/// query parameter, the endpoint's native authentication scheme.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Build a provider from the endpoint URL, key, and request timeout.
    pub fn new(api_url: String, api_key: String, timeout_seconds: u64) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| OracleError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_url, api_key })
    }

    /// Send `prompt` and return the first candidate's text.
    pub async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        debug!(url = %self.api_url, prompt_len = prompt.len(), "sending oracle request");
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(prompt = %prompt, "full oracle prompt");
        }

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_url, error = %e, "oracle HTTP request failed (transport)");
                OracleError::Transport(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize oracle response");
            OracleError::Transport(format!("failed to parse response body: {e}"))
        })?;

        debug!(candidates = parsed.candidates.len(), "received oracle response");

        // Missing candidates / content / parts / text all collapse to the
        // same outcome: no usable completion.
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(OracleError::EmptyCompletion)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OracleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    error!(%status, body_len = body.len(), "oracle returned HTTP error");
    Err(OracleError::Status { status: status.as_u16(), body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_contract() {
        let payload = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: "hello".into() }] }],
        };
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn response_extracts_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"the answer"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("deserialize");
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        assert_eq!(text.as_deref(), Some("the answer"));
    }

    #[test]
    fn response_tolerates_missing_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn response_tolerates_missing_parts_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("deserialize");
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);
        assert!(text.is_none());
    }
}
