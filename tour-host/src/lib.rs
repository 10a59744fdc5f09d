//! # tour-host: Campus Tour Integration Layer
//!
//! Wires the synchronous `tour-core` simulation to the outside world:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 TourHost                     │
//! │  frame(dt) ─► drain replies ─► tick ─► view  │
//! │      │                          │            │
//! │      ▼                          ▼            │
//! │ ReplyDispatcher ◄── requests ── SimulationContext
//! │      │ (tokio tasks keyed by ReplyTicket)    │
//! │      ▼                                       │
//! │ ResponseStrategy: remote first, fallback     │
//! │      │                                       │
//! │      ▼                                       │
//! │   tour-llm                                   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: environment configuration and reply mode
//! - `strategy`: remote-first reply generation with silent fallback
//! - `dispatcher`: async reply tasks, result channel, cancellation
//! - `overlay`: presentation model for prompt and dialogue panel
//! - `host`: mount / frame / unmount lifecycle
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatcher;
pub mod host;
pub mod overlay;
pub mod strategy;
pub mod telemetry;

pub use config::{HostConfig, ReplyMode};
pub use host::TourHost;
pub use strategy::ResponseStrategy;
