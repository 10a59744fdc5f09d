//! Tour host lifecycle: mount, per-frame driving, UI actions, unmount.
//!
//! ```text
//!  mount ──► frame(dt) ──► frame(dt) ──► … ──► unmount (or drop)
//!               │
//!               ├─ apply finished replies (stale ones are dropped)
//!               ├─ SimulationContext::tick  (input → world → render)
//!               ├─ dispatch new reply requests
//!               ├─ abort work of closed sessions
//!               └─ build the overlay view
//! ```

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;
use tour_core::dialogue::Resolution;
use tour_core::input::{HostEvent, InputController};
use tour_core::sim::{FrameBudget, Renderer, SimulationContext};
use tour_core::{SessionId, TourError};
use tour_llm::{LlmClient, TextGenerator};
use tracing::{debug, info, warn};

use crate::config::{HostConfig, ReplyMode};
use crate::dispatcher::ReplyDispatcher;
use crate::overlay::{OverlayState, OverlayView, UiAction};
use crate::strategy::ResponseStrategy;

/// What one frame produced for the embedding page.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Overlay to draw.
    pub overlay: OverlayView,
    /// Pointer-lock and cursor requests.
    pub host_events: Vec<HostEvent>,
    /// Replies applied at the start of this frame.
    pub replies_applied: usize,
    /// Timing of the simulation step.
    pub budget: FrameBudget,
}

/// Owns the simulation, the renderer and the reply dispatcher.
pub struct TourHost<G, Rd> {
    sim: SimulationContext,
    renderer: Rd,
    dispatcher: ReplyDispatcher<G>,
    overlay: OverlayState,
    rng: StdRng,
    mode: ReplyMode,
}

impl<Rd: Renderer> TourHost<LlmClient, Rd> {
    /// Build the campus tour from host configuration.
    ///
    /// # Errors
    /// Fails if the configured arena cannot hold the campus roster.
    pub fn from_config(config: &HostConfig, renderer: Rd, viewport: Vec2, runtime: Handle) -> Result<Self, TourError> {
        let sim = SimulationContext::campus(config.tour.clone(), viewport)?;
        let strategy = ResponseStrategy::from_optional(config.llm_client(), config.tour.llm.clone());
        Ok(Self::new(sim, strategy, renderer, runtime))
    }
}

impl<G: TextGenerator + 'static, Rd: Renderer> TourHost<G, Rd> {
    /// Assemble a host. Nothing runs until [`mount`](Self::mount).
    #[must_use]
    pub fn new(sim: SimulationContext, strategy: ResponseStrategy<G>, renderer: Rd, runtime: Handle) -> Self {
        let mode = strategy.mode();
        Self {
            sim,
            renderer,
            dispatcher: ReplyDispatcher::new(strategy, runtime),
            overlay: OverlayState::default(),
            rng: StdRng::from_entropy(),
            mode,
        }
    }

    /// Replace the host RNG, for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Attach input and start the frame driver.
    pub fn mount(&mut self) {
        self.sim.mount();
        info!(mode = self.mode.description(), "tour host mounted");
    }

    /// Drive one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        if !self.sim.is_running() {
            return FrameReport::default();
        }

        let mut replies_applied = 0;
        for outcome in self.dispatcher.drain() {
            match self.sim.apply_reply(outcome.ticket, &outcome.reply.text, &mut self.rng) {
                Resolution::Applied => replies_applied += 1,
                Resolution::Stale => debug!(session = %outcome.ticket.session, "stale reply dropped"),
            }
        }

        let out = self.sim.tick(dt, &mut self.rng, &mut self.renderer);
        for request in out.requests {
            self.dispatcher.dispatch(request);
        }
        for session in &out.closed {
            self.dispatcher.cancel_session(*session);
        }
        if !out.budget.within_budget() {
            warn!(total_us = out.budget.total_us(), "frame over budget");
        }

        let captured = self.sim.input().is_captured();
        FrameReport {
            overlay: self.overlay.view(&self.sim, captured),
            host_events: out.host_events,
            replies_applied,
            budget: out.budget,
        }
    }

    /// Apply an overlay action. Reply requests go out immediately.
    ///
    /// # Errors
    /// `NoSession`, `ReplyPending`, `OptionOutOfRange` or `EmptyQuestion`
    /// from the dialogue engine; the dialogue is left unchanged.
    pub fn ui(&mut self, action: UiAction) -> Result<(), TourError> {
        match action {
            UiAction::SelectOption(index) => {
                self.sim.select_option(index)?;
            }
            UiAction::EditInput(text) => self.sim.set_input_text(text),
            UiAction::Submit => {
                self.sim.submit_question()?;
            }
            UiAction::Close => {
                if let Some(session) = self.sim.close_dialogue() {
                    self.dispatcher.cancel_session(session);
                }
            }
        }
        for request in self.sim.drain_requests() {
            self.dispatcher.dispatch(request);
        }
        Ok(())
    }

    /// Wait for outstanding replies; they are applied by the next frame.
    /// Returns `false` if `limit` passed first.
    pub async fn wait_for_replies(&mut self, limit: Duration) -> bool {
        self.dispatcher.wait_idle(limit).await
    }
}

impl<G, Rd> TourHost<G, Rd> {
    /// Input passthrough for the embedding page's event handlers.
    pub fn input(&mut self) -> &mut InputController {
        self.sim.input()
    }

    /// Forward a canvas resize to the simulation.
    pub fn resize(&mut self, viewport: Vec2) {
        self.sim.resize(viewport);
    }

    /// The simulation.
    #[must_use]
    pub fn sim(&self) -> &SimulationContext {
        &self.sim
    }

    /// The simulation, mutably.
    pub fn sim_mut(&mut self) -> &mut SimulationContext {
        &mut self.sim
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &Rd {
        &self.renderer
    }

    /// How replies are produced.
    #[must_use]
    pub fn reply_mode(&self) -> ReplyMode {
        self.mode
    }

    /// Reply tasks still running.
    #[must_use]
    pub fn replies_in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Stop everything: close the dialogue, abort reply work, detach input,
    /// dispose the scene. Safe to call more than once.
    pub fn unmount(&mut self) -> Option<SessionId> {
        let open = self.sim.unmount();
        self.dispatcher.shutdown();
        open
    }
}

impl<G, Rd> Drop for TourHost<G, Rd> {
    fn drop(&mut self) {
        self.unmount();
    }
}
