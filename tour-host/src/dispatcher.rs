//! Async reply dispatch.
//!
//! Each [`ReplyRequest`] becomes a tokio task that runs the
//! [`ResponseStrategy`] and posts a [`ReplyOutcome`] on a channel. The frame
//! loop drains the channel once per frame, so the simulation itself never
//! awaits. Closing a dialogue aborts its tasks; any outcome that still slips
//! through is rejected by ticket matching in the dialogue engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tour_core::dialogue::ReplyRequest;
use tour_core::{ReplyTicket, SessionId};
use tour_llm::TextGenerator;
use tracing::debug;

use crate::strategy::{ResponseStrategy, StrategyReply};

/// A finished reply, tagged with the ticket it answers.
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    /// Ticket from the originating request.
    pub ticket: ReplyTicket,
    /// The reply.
    pub reply: StrategyReply,
}

/// Runs reply tasks and collects their results.
#[derive(Debug)]
pub struct ReplyDispatcher<G> {
    strategy: Arc<ResponseStrategy<G>>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<ReplyOutcome>,
    rx: mpsc::UnboundedReceiver<ReplyOutcome>,
    in_flight: HashMap<ReplyTicket, JoinHandle<()>>,
    ready: Vec<ReplyOutcome>,
}

impl<G: TextGenerator + 'static> ReplyDispatcher<G> {
    /// Dispatcher spawning onto `runtime`.
    #[must_use]
    pub fn new(strategy: ResponseStrategy<G>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            strategy: Arc::new(strategy),
            runtime,
            tx,
            rx,
            in_flight: HashMap::new(),
            ready: Vec::new(),
        }
    }

    /// Start producing a reply for `request`.
    pub fn dispatch(&mut self, request: ReplyRequest) {
        let ticket = request.ticket;
        let strategy = Arc::clone(&self.strategy);
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let mut rng = StdRng::from_entropy();
            let reply = strategy.respond(&request, &mut rng).await;
            if tx.send(ReplyOutcome { ticket, reply }).is_err() {
                debug!(session = %ticket.session, "reply receiver gone");
            }
        });
        if let Some(previous) = self.in_flight.insert(ticket, task) {
            previous.abort();
        }
        debug!(session = %ticket.session, character = %ticket.character, "reply dispatched");
    }

    /// Wait until every in-flight task has reported, or `limit` passes.
    ///
    /// Collected outcomes are returned by the next [`drain`](Self::drain).
    /// Returns `false` on timeout.
    pub async fn wait_idle(&mut self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            self.collect();
            self.in_flight.retain(|_, task| !task.is_finished());
            if self.in_flight.is_empty() {
                self.collect();
                return true;
            }
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(outcome)) => self.accept(outcome),
                Ok(None) => return true,
                Err(_) => return false,
            }
        }
    }
}

impl<G> ReplyDispatcher<G> {
    /// Take every outcome that has arrived so far.
    pub fn drain(&mut self) -> Vec<ReplyOutcome> {
        self.collect();
        std::mem::take(&mut self.ready)
    }

    /// Abort all work for `session`.
    pub fn cancel_session(&mut self, session: SessionId) {
        let before = self.in_flight.len();
        self.in_flight.retain(|ticket, task| {
            let keep = ticket.session != session;
            if !keep {
                task.abort();
            }
            keep
        });
        self.ready.retain(|o| o.ticket.session != session);
        let aborted = before - self.in_flight.len();
        if aborted > 0 {
            debug!(%session, aborted, "reply tasks aborted");
        }
    }

    /// Abort everything and drop pending outcomes.
    pub fn shutdown(&mut self) {
        for (_, task) in self.in_flight.drain() {
            task.abort();
        }
        self.ready.clear();
        while self.rx.try_recv().is_ok() {}
    }

    /// Tasks not yet reported.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn collect(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.accept(outcome);
        }
    }

    fn accept(&mut self, outcome: ReplyOutcome) {
        self.in_flight.remove(&outcome.ticket);
        self.ready.push(outcome);
    }
}
