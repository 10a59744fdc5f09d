//! # tour-core: Campus Tour Simulation Core
//!
//! Everything the virtual tour needs to stay frame-coherent, with no I/O:
//!
//! - **World**: static geometry and the character roster
//! - **Scene**: an owned arena of pickable boxes with an explicit `dispose`
//! - **Input**: key state, pointer capture, edge-triggered interact/escape
//! - **Picking**: ray vs. box hit testing and planar proximity scans
//! - **Dialogue**: the per-conversation state machine
//! - **Replies**: keyword-matched fallback answers, pure and seedable
//! - **Sim**: the cooperative per-frame driver tying it all together
//!
//! ## Frame Contract
//!
//! ```text
//! input snapshot ─► move/look ─► camera ─► characters ─► nearby ─► hover ─► feedback ─► render
//!                         ▲                                                          │
//!                         └──── dialogue open suppresses movement & look ◄───────────┘
//! ```
//!
//! The only asynchronous work (remote reply generation) lives outside this
//! crate; the dialogue engine hands out a [`dialogue::ReplyRequest`] and later
//! accepts the matching resolution.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod camera;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod input;
pub mod picking;
pub mod replies;
pub mod roster;
pub mod scene;
pub mod sim;
pub mod types;
pub mod world;

pub use config::TourConfig;
pub use error::TourError;
pub use sim::SimulationContext;
pub use types::*;
