//! LLM error types.

use thiserror::Error;

/// Errors that can occur during remote generation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed or returned a non-success status.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// Response body was not valid JSON.
    #[error("Failed to parse LLM response as JSON: {0}")]
    ParseError(String),

    /// Response JSON lacked the expected text field, or the text was empty.
    #[error("Malformed LLM response: {0}")]
    Malformed(String),

    /// Request exceeded its per-call timeout (ms).
    #[error("LLM request timed out after {0}ms")]
    Timeout(u64),

    /// No backend configured, or the backend is unreachable.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("All LLM retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },
}

/// Transport failures. Timeouts are reported by the caller, which knows
/// the configured limit.
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_the_limit() {
        assert_eq!(LlmError::Timeout(8000).to_string(), "LLM request timed out after 8000ms");
    }
}
