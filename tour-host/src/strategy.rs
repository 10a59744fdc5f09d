//! Reply strategy: remote generation first, keyword fallback on any failure.
//!
//! | Tier | Source                      | Latency     | Availability        |
//! |------|-----------------------------|-------------|---------------------|
//! | 1    | Remote model via `tour-llm` | 0.3–8 s     | Credential present  |
//! | 0    | Canned keyword-matched book | < 0.1 ms    | Always              |
//!
//! The visitor never sees an error: every failure on tier 1 drops to tier 0
//! and is only logged.

use std::sync::Arc;

use rand::Rng;
use tour_core::config::LlmConfig;
use tour_core::dialogue::ReplyRequest;
use tour_core::replies;
use tour_llm::prompt::{self, PersonaVars};
use tour_llm::{GenerationRequest, TextGenerator};
use tracing::{debug, info, warn};

use crate::config::ReplyMode;

/// Why a reply came from the canned book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential or no backend configured.
    NoBackend,
    /// The remote call failed; carries the logged error.
    RemoteFailed(String),
}

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    /// Generated remotely.
    Remote {
        /// Round-trip time.
        latency_ms: u64,
    },
    /// Canned keyword-matched line.
    Fallback(FallbackReason),
}

/// A reply ready for the dialogue.
#[derive(Debug, Clone)]
pub struct StrategyReply {
    /// Text to show; never empty.
    pub text: String,
    /// Provenance.
    pub source: ReplySource,
}

impl StrategyReply {
    /// Whether the canned book answered.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ReplySource::Fallback(_))
    }
}

/// Remote-first reply producer.
pub struct ResponseStrategy<G> {
    generator: Option<Arc<G>>,
    llm: LlmConfig,
}

impl<G> Clone for ResponseStrategy<G> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            llm: self.llm.clone(),
        }
    }
}

impl<G> std::fmt::Debug for ResponseStrategy<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStrategy")
            .field("remote", &self.generator.is_some())
            .field("model", &self.llm.model)
            .finish()
    }
}

impl<G: TextGenerator> ResponseStrategy<G> {
    /// Strategy that tries `generator` first.
    #[must_use]
    pub fn new(generator: G, llm: LlmConfig) -> Self {
        Self {
            generator: Some(Arc::new(generator)),
            llm,
        }
    }

    /// Strategy that only ever uses the canned book.
    #[must_use]
    pub fn fallback_only(llm: LlmConfig) -> Self {
        Self { generator: None, llm }
    }

    /// Strategy built from an optional generator.
    #[must_use]
    pub fn from_optional(generator: Option<G>, llm: LlmConfig) -> Self {
        match generator {
            Some(g) => Self::new(g, llm),
            None => Self::fallback_only(llm),
        }
    }

    /// Effective mode.
    #[must_use]
    pub fn mode(&self) -> ReplyMode {
        match &self.generator {
            Some(g) if g.is_available() => ReplyMode::RemoteWithFallback,
            _ => ReplyMode::FallbackOnly,
        }
    }

    /// The prompt sent for `request`, with sampling from the config.
    #[must_use]
    pub fn build_request(&self, request: &ReplyRequest) -> GenerationRequest {
        let traits = &request.traits;
        prompt::persona_request(&PersonaVars {
            name: &traits.name,
            role: &traits.role,
            personality: &traits.personality,
            quirk: &traits.quirk,
            question: &request.question,
        })
        .with_temperature(self.llm.temperature)
        .with_max_tokens(self.llm.max_output_tokens)
        .with_timeout(self.llm.timeout_ms)
    }

    /// Produce a reply for `request`. Never fails.
    pub async fn respond<R: Rng + Send>(&self, request: &ReplyRequest, rng: &mut R) -> StrategyReply {
        let reason = match &self.generator {
            Some(generator) if generator.is_available() => {
                match generator.generate(&self.build_request(request)).await {
                    Ok(response) => {
                        info!(
                            character = %request.traits.name,
                            latency_ms = response.latency_ms,
                            model = %response.model,
                            "remote reply"
                        );
                        return StrategyReply {
                            text: response.text,
                            source: ReplySource::Remote {
                                latency_ms: response.latency_ms,
                            },
                        };
                    }
                    Err(e) => {
                        warn!(character = %request.traits.name, error = %e, "remote reply failed, using fallback");
                        FallbackReason::RemoteFailed(e.to_string())
                    }
                }
            }
            _ => FallbackReason::NoBackend,
        };

        let text = replies::fallback_reply(&request.book, &request.question, rng);
        debug!(character = %request.traits.name, topic = ?replies::classify(&request.question), "fallback reply");
        StrategyReply {
            text,
            source: ReplySource::Fallback(reason),
        }
    }
}
