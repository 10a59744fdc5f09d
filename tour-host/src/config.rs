//! Host configuration layered from the environment.
//!
//! | Variable              | Effect                                              |
//! |-----------------------|-----------------------------------------------------|
//! | `TOUR_CONFIG`         | Path to a `tour.toml`; defaults apply when unset     |
//! | `TOUR_GENAI_API_KEY`¹ | Remote credential; absence selects fallback-only     |
//! | `TOUR_LOG_JSON`       | `1`/`true` switches log output to JSON               |
//!
//! ¹ The variable name itself comes from `llm.api_key_env`.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tour_core::TourConfig;
use tour_core::config::LlmProviderKind;
use tour_llm::{LlmClient, LlmProvider};

/// Variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "TOUR_CONFIG";
/// Variable switching on JSON logs.
pub const LOG_JSON_ENV: &str = "TOUR_LOG_JSON";

// ---------------------------------------------------------------------------
// Reply mode
// ---------------------------------------------------------------------------

/// How character replies are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Canned keyword-matched replies only.
    FallbackOnly,
    /// Remote generation, canned replies on any failure.
    RemoteWithFallback,
}

impl ReplyMode {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::FallbackOnly => "Fallback-only: keyword-matched canned replies",
            Self::RemoteWithFallback => "Remote-first: generated replies, canned on failure",
        }
    }

    /// Whether remote calls are attempted.
    #[must_use]
    pub fn has_remote(self) -> bool {
        matches!(self, Self::RemoteWithFallback)
    }
}

// ---------------------------------------------------------------------------
// Host configuration
// ---------------------------------------------------------------------------

/// Tour configuration plus the secrets and switches only the host knows.
#[derive(Clone)]
pub struct HostConfig {
    /// Simulation and LLM settings.
    pub tour: TourConfig,
    /// Emit JSON logs.
    pub log_json: bool,
    api_key: Option<String>,
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("tour", &self.tour)
            .field("log_json", &self.log_json)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HostConfig {
    /// Build from parts. A blank key counts as no key.
    #[must_use]
    pub fn new(tour: TourConfig, api_key: Option<String>) -> Self {
        Self {
            tour,
            log_json: false,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Fails only if `TOUR_CONFIG` names a file that cannot be read or parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Fails only if the config path is set but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let tour = match lookup(CONFIG_PATH_ENV) {
            Some(path) => TourConfig::from_file(Path::new(&path))
                .with_context(|| format!("loading tour config from {path}"))?,
            None => TourConfig::default(),
        };
        let api_key = lookup(&tour.llm.api_key_env);
        let log_json = lookup(LOG_JSON_ENV)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        let mut config = Self::new(tour, api_key);
        config.log_json = log_json;
        Ok(config)
    }

    /// Derived reply mode.
    #[must_use]
    pub fn reply_mode(&self) -> ReplyMode {
        if self.api_key.is_some() {
            ReplyMode::RemoteWithFallback
        } else {
            ReplyMode::FallbackOnly
        }
    }

    /// The credential, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// An HTTP client for the configured backend, or `None` in
    /// fallback-only mode.
    #[must_use]
    pub fn llm_client(&self) -> Option<LlmClient> {
        let api_key = self.api_key.clone()?;
        let llm = &self.tour.llm;
        let provider = match llm.provider {
            LlmProviderKind::GenerativeLanguage => LlmProvider::GenerativeLanguage {
                base_url: llm.base_url.clone(),
                model: llm.model.clone(),
                api_key,
            },
            LlmProviderKind::OpenAiCompatible => LlmProvider::OpenAiCompatible {
                base_url: llm.base_url.clone(),
                model: llm.model.clone(),
                api_key,
            },
        };
        Some(LlmClient::new(provider, llm.max_retries))
    }

    /// Longest a caller should wait for one reply: every attempt timing out,
    /// plus a second of slack. Saturates instead of overflowing.
    #[must_use]
    pub fn reply_wait_limit(&self) -> Duration {
        let llm = &self.tour.llm;
        let attempts = u64::from(llm.max_retries.saturating_add(1));
        Duration::from_millis(llm.timeout_ms.saturating_mul(attempts).saturating_add(1_000))
    }
}
