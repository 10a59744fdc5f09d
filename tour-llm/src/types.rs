//! Core types for generation requests and responses.

use serde::{Deserialize, Serialize};

/// Harm categories blocked at medium probability and above.
pub const DEFAULT_SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// One content-filter rule sent with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Harm category identifier.
    pub category: String,
    /// Blocking threshold identifier.
    pub threshold: String,
}

impl SafetySetting {
    /// Block `category` at medium probability and above.
    #[must_use]
    pub fn block_medium_and_above(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".into(),
        }
    }
}

/// The default filter set: every category in [`DEFAULT_SAFETY_CATEGORIES`].
#[must_use]
pub fn default_safety_settings() -> Vec<SafetySetting> {
    DEFAULT_SAFETY_CATEGORIES
        .iter()
        .map(|c| SafetySetting::block_medium_and_above(*c))
        .collect()
}

/// A request to the remote generator.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Persona and rules.
    pub system: String,
    /// The visitor's question, framed.
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Content filters.
    pub safety: Vec<SafetySetting>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl GenerationRequest {
    /// A short-answer request with default sampling and safety settings.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 150,
            temperature: 0.7,
            safety: default_safety_settings(),
            timeout_ms: 8000,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the temperature, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Set the output length cap (at least one token).
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens.max(1);
        self
    }

    /// System and user parts joined, for backends with a single prompt slot.
    #[must_use]
    pub fn combined_prompt(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// A response from the remote generator.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// The generated text, trimmed and non-empty.
    pub text: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model answered.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps() {
        let r = GenerationRequest::new("s", "u")
            .with_temperature(3.0)
            .with_max_tokens(0)
            .with_timeout(100);
        assert_eq!(r.temperature, 1.0);
        assert_eq!(r.max_tokens, 1);
        assert_eq!(r.timeout_ms, 100);
        assert_eq!(r.safety.len(), 4);
    }

    #[test]
    fn combined_prompt_keeps_both_parts() {
        let r = GenerationRequest::new("You are Ms. Han.", "What is your role?");
        assert_eq!(r.combined_prompt(), "You are Ms. Han.\n\nWhat is your role?");
    }
}
