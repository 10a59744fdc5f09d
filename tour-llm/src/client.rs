//! LLM client: unified interface for the generateContent and
//! OpenAI-compatible backends.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{GenerationRequest, GenerationResponse};

/// Anything that can answer a [`GenerationRequest`].
///
/// The tour host is generic over this so tests can plug in a scripted
/// generator instead of the network.
pub trait TextGenerator: Send + Sync {
    /// Produce text for `request`. Errors mean "use the fallback".
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, LlmError>> + Send;

    /// Whether a backend is configured at all.
    fn is_available(&self) -> bool;
}

/// Provider backend for remote generation.
#[derive(Clone)]
pub enum LlmProvider {
    /// `generateContent` API; the key travels as the `key` query parameter.
    GenerativeLanguage {
        /// e.g. `https://generativelanguage.googleapis.com`
        base_url: String,
        /// e.g. `gemini-pro`
        model: String,
        /// Credential.
        api_key: String,
    },
    /// OpenAI-compatible chat completions with a bearer token.
    OpenAiCompatible {
        /// e.g. `https://api.openai.com`
        base_url: String,
        /// Model name.
        model: String,
        /// Credential.
        api_key: String,
    },
    /// No backend: all calls fail, triggering the fallback.
    None,
}

impl fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenerativeLanguage { base_url, model, .. } => f
                .debug_struct("GenerativeLanguage")
                .field("base_url", base_url)
                .field("model", model)
                .field("api_key", &"<redacted>")
                .finish(),
            Self::OpenAiCompatible { base_url, model, .. } => f
                .debug_struct("OpenAiCompatible")
                .field("base_url", base_url)
                .field("model", model)
                .field("api_key", &"<redacted>")
                .finish(),
            Self::None => f.write_str("None"),
        }
    }
}

#[derive(Clone, Copy)]
enum Auth<'a> {
    QueryKey(&'a str),
    Bearer(&'a str),
}

/// The HTTP client that routes requests to the configured backend.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new client.
    #[must_use]
    pub fn new(provider: LlmProvider, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            max_retries,
        }
    }

    /// Create a client with no backend (all calls fail → fallback).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, 0)
    }

    /// The configured provider.
    #[must_use]
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    async fn generate_inner(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::GenerativeLanguage {
                base_url,
                model,
                api_key,
            } => {
                let url = format!(
                    "{}/v1beta/models/{model}:generateContent",
                    base_url.trim_end_matches('/')
                );
                self.post_with_retries(
                    &url,
                    &generative_body(request),
                    Auth::QueryKey(api_key),
                    model,
                    request.timeout_ms,
                    extract_generative_text,
                )
                .await
            }
            LlmProvider::OpenAiCompatible {
                base_url,
                model,
                api_key,
            } => {
                let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
                self.post_with_retries(
                    &url,
                    &chat_body(model, request),
                    Auth::Bearer(api_key),
                    model,
                    request.timeout_ms,
                    extract_chat_text,
                )
                .await
            }
        }
    }

    async fn post_with_retries(
        &self,
        url: &str,
        body: &Value,
        auth: Auth<'_>,
        model: &str,
        timeout_ms: u64,
        extract: fn(&Value) -> Result<String, LlmError>,
    ) -> Result<GenerationResponse, LlmError> {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!("Retrying LLM call (attempt {}/{})", attempt + 1, self.max_retries + 1);
            }

            let start = Instant::now();
            let builder = self
                .http
                .post(url)
                .json(body)
                .timeout(Duration::from_millis(timeout_ms));
            let builder = match auth {
                Auth::QueryKey(key) => builder.query(&[("key", key)]),
                Auth::Bearer(key) => builder.bearer_auth(key),
            };

            match builder.send().await {
                Ok(resp) if resp.status().is_success() => {
                    let json: Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.without_url().to_string()))?;
                    let text = extract(&json)?;
                    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    debug!(latency_ms, model, "LLM reply received");
                    return Ok(GenerationResponse {
                        text,
                        latency_ms,
                        model: model.to_string(),
                    });
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!("LLM endpoint returned error: {}", last_error);
                }
                Err(e) => {
                    // Strip the URL: it carries the key for query-auth backends.
                    let e = e.without_url();
                    let err = if e.is_timeout() {
                        LlmError::Timeout(timeout_ms)
                    } else {
                        LlmError::from(e)
                    };
                    warn!("LLM request failed: {}", err);
                    last_error = err.to_string();
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.generate_inner(request).await
    }

    fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// JSON body for a `generateContent` call.
#[must_use]
pub fn generative_body(request: &GenerationRequest) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": request.combined_prompt() }] }],
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        },
        "safetySettings": request.safety,
    })
}

/// JSON body for a chat-completions call.
#[must_use]
pub fn chat_body(model: &str, request: &GenerationRequest) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

fn text_at(json: &Value, pointer: &str) -> Result<String, LlmError> {
    json.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LlmError::Malformed(format!("no text at {pointer}")))
}

/// Reply text at `candidates[0].content.parts[0].text`.
///
/// # Errors
/// `Malformed` if the field is missing, not a string, or blank.
pub fn extract_generative_text(json: &Value) -> Result<String, LlmError> {
    text_at(json, "/candidates/0/content/parts/0/text")
}

/// Reply text at `choices[0].message.content`.
///
/// # Errors
/// `Malformed` if the field is missing, not a string, or blank.
pub fn extract_chat_text(json: &Value) -> Result<String, LlmError> {
    text_at(json, "/choices/0/message/content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generative_body_shape() {
        let req = GenerationRequest::new("sys", "user").with_max_tokens(120);
        let body = generative_body(&req);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "sys\n\nuser");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 120);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
    }

    #[test]
    fn chat_body_shape() {
        let req = GenerationRequest::new("sys", "user");
        let body = chat_body("gpt-4o-mini", &req);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn extracts_generative_text() {
        let json = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  Happy to help!  " }] } }]
        });
        assert_eq!(extract_generative_text(&json).expect("text"), "Happy to help!");
    }

    #[test]
    fn missing_or_non_string_is_malformed() {
        let missing = json!({ "candidates": [] });
        let number = json!({ "candidates": [{ "content": { "parts": [{ "text": 42 }] } }] });
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "   " }] } }] });
        for json in [missing, number, blank] {
            assert!(matches!(extract_generative_text(&json), Err(LlmError::Malformed(_))));
        }
    }

    #[test]
    fn extracts_chat_text() {
        let json = json!({ "choices": [{ "message": { "content": "Sure." } }] });
        assert_eq!(extract_chat_text(&json).expect("text"), "Sure.");
        assert!(extract_chat_text(&json!({})).is_err());
    }

    #[tokio::test]
    async fn none_provider_is_unavailable() {
        let client = LlmClient::none();
        assert!(!client.is_available());
        let err = client
            .generate(&GenerationRequest::new("s", "u"))
            .await
            .expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_fast() {
        let client = LlmClient::new(
            LlmProvider::GenerativeLanguage {
                base_url: "http://127.0.0.1:9".into(),
                model: "test".into(),
                api_key: "secret-key".into(),
            },
            0,
        );
        let err = client
            .generate(&GenerationRequest::new("s", "u").with_timeout(500))
            .await
            .expect_err("nothing listens on the discard port");
        match &err {
            LlmError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(*attempts, 1);
                assert!(last_error.contains("unavailable"), "{last_error}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.to_string().contains("secret-key"));
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
