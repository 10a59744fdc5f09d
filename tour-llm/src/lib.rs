//! # tour-llm: Remote Text Generation for Tour Characters
//!
//! One job: turn a persona prompt into two or three sentences of in-character
//! text, or fail quickly so the caller can fall back to canned replies.
//!
//! Backends:
//!   - **Generative Language** (`…/models/{model}:generateContent`, key as a
//!     query parameter), the default
//!   - **OpenAI-compatible** chat completions (bearer token)
//!
//! ```text
//! persona vars ─► prompt::render_persona ─► GenerationRequest
//!                                                │
//!                                  TextGenerator::generate (async)
//!                                                │
//!                               Ok(text) ◄───────┴───────► Err(LlmError) → caller falls back
//! ```
//!
//! Nothing here knows about the tour's world or dialogue state.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider, TextGenerator};
pub use error::LlmError;
pub use types::{GenerationRequest, GenerationResponse, SafetySetting};
