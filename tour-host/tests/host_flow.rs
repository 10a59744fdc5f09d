//! Host-level flows: async replies through the dispatcher, fallback on
//! failure, cancellation on close, lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use glam::{Vec2, Vec3};
use tokio::runtime::Handle;
use tour_core::config::LlmConfig;
use tour_core::dialogue::Phase;
use tour_core::input::{HostEvent, Key};
use tour_core::replies;
use tour_core::sim::{RecordingRenderer, SimulationContext};
use tour_core::{TourConfig, TourError};
use tour_host::config::ReplyMode;
use tour_host::overlay::UiAction;
use tour_host::{ResponseStrategy, TourHost};
use tour_llm::{GenerationRequest, GenerationResponse, LlmClient, LlmError, TextGenerator};

const DT: f32 = 1.0 / 60.0;

/// Scripted backend: fixed answer or failure, optional delay, call counter.
#[derive(Clone)]
struct Scripted {
    answer: Result<&'static str, &'static str>,
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn ok(text: &'static str) -> Self {
        Self {
            answer: Ok(text),
            delay_ms: 0,
            calls: Arc::default(),
        }
    }

    fn failing() -> Self {
        Self {
            answer: Err("HTTP 503"),
            delay_ms: 0,
            calls: Arc::default(),
        }
    }

    fn slow(text: &'static str, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::ok(text)
        }
    }
}

impl TextGenerator for Scripted {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.system.contains("You are Ms. Han"));
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        match self.answer {
            Ok(text) => Ok(GenerationResponse {
                text: text.to_string(),
                latency_ms: self.delay_ms,
                model: "scripted".into(),
            }),
            Err(e) => Err(LlmError::RequestFailed(e.to_string())),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn host<G: TextGenerator + 'static>(strategy: ResponseStrategy<G>) -> TourHost<G, RecordingRenderer> {
    let sim = SimulationContext::campus(TourConfig::default(), Vec2::new(800.0, 600.0)).expect("campus");
    let mut host = TourHost::new(sim, strategy, RecordingRenderer::default(), Handle::current()).with_seed(9);
    host.mount();
    host
}

/// Walk up to Ms. Han, press interact, settle into option selection.
fn open_han<G: TextGenerator + 'static>(host: &mut TourHost<G, RecordingRenderer>) {
    host.sim_mut().player_mut().position = Vec3::new(-9.0, 1.6, -5.0);
    host.frame(DT);
    host.input().key_down(Key::Interact);
    host.frame(DT);
    host.input().key_up(Key::Interact);
    host.frame(DT);
    assert_eq!(host.sim().dialogue().phase(), Phase::AwaitingSelection);
}

fn last_line<G, Rd>(host: &TourHost<G, Rd>) -> String {
    host.sim()
        .dialogue()
        .session()
        .and_then(|s| s.transcript().last())
        .map(|l| l.text.clone())
        .expect("transcript line")
}

#[tokio::test]
async fn remote_reply_is_shown_and_logged() {
    let backend = Scripted::ok("We meet every student at least once a term.");
    let calls = Arc::clone(&backend.calls);
    let mut host = host(ResponseStrategy::new(backend, LlmConfig::default()));
    assert_eq!(host.reply_mode(), ReplyMode::RemoteWithFallback);
    open_han(&mut host);

    host.ui(UiAction::SelectOption(0)).expect("select");
    assert_eq!(host.replies_in_flight(), 1);
    assert!(host.wait_for_replies(Duration::from_secs(2)).await);

    let report = host.frame(DT);
    assert_eq!(report.replies_applied, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(last_line(&host), "We meet every student at least once a term.");
    let han = host.sim().world().find("Ms. Han").expect("han");
    assert_eq!(han.conversation().len(), 1);
}

#[tokio::test]
async fn landed_reply_is_drawn_as_shown_for_one_frame() {
    let mut host = host(ResponseStrategy::new(Scripted::ok("Happy to explain."), LlmConfig::default()));
    open_han(&mut host);
    host.ui(UiAction::SelectOption(0)).expect("select");
    assert!(host.wait_for_replies(Duration::from_secs(2)).await);

    let report = host.frame(DT);
    assert_eq!(report.replies_applied, 1);
    assert_eq!(host.renderer().last_phase, Some(Phase::ResponseShown));
    let panel = report.overlay.panel.expect("panel");
    assert!(!panel.waiting);
    assert!(panel.options.iter().all(|o| o.enabled));

    host.frame(DT);
    assert_eq!(host.renderer().last_phase, Some(Phase::AwaitingSelection));
}

#[tokio::test]
async fn failed_remote_falls_back_silently() {
    let mut host = host(ResponseStrategy::new(Scripted::failing(), LlmConfig::default()));
    open_han(&mut host);

    host.ui(UiAction::SelectOption(2)).expect("select");
    let question = host
        .sim()
        .dialogue()
        .session()
        .and_then(|s| s.last_question().map(str::to_string))
        .expect("question asked");
    assert!(host.wait_for_replies(Duration::from_secs(2)).await);
    host.frame(DT);

    let reply = last_line(&host);
    let han = host.sim().world().find("Ms. Han").expect("han");
    assert!(replies::candidates_for(&han.book, &question).contains(&reply));
    assert_eq!(host.sim().dialogue().phase(), Phase::ResponseShown);
}

#[tokio::test]
async fn no_credential_uses_fallback_only() {
    let mut host = host(ResponseStrategy::from_optional(None::<LlmClient>, LlmConfig::default()));
    assert_eq!(host.reply_mode(), ReplyMode::FallbackOnly);
    open_han(&mut host);

    host.ui(UiAction::EditInput("How do you help with exam stress?".into()))
        .expect("edit");
    host.ui(UiAction::Submit).expect("submit");
    assert!(host.wait_for_replies(Duration::from_secs(1)).await);
    let report = host.frame(DT);
    assert_eq!(report.replies_applied, 1);
    let panel = report.overlay.panel.expect("panel open");
    assert!(panel.input.is_empty());
    assert!(panel.lines.iter().any(|l| l.ends_with("How do you help with exam stress?")));
}

#[tokio::test]
async fn second_question_while_pending_is_rejected() {
    let mut host = host(ResponseStrategy::new(Scripted::slow("Eventually.", 100), LlmConfig::default()));
    open_han(&mut host);
    host.ui(UiAction::SelectOption(0)).expect("select");
    let err = host.ui(UiAction::SelectOption(1)).expect_err("pending");
    assert!(matches!(err, TourError::ReplyPending));
    assert!(host.frame(DT).overlay.panel.expect("panel").waiting);
    assert!(host.wait_for_replies(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn closing_aborts_outstanding_reply() {
    let backend = Scripted::slow("Too late to matter.", 150);
    let mut host = host(ResponseStrategy::new(backend, LlmConfig::default()));
    open_han(&mut host);

    host.ui(UiAction::SelectOption(0)).expect("select");
    host.ui(UiAction::Close).expect("close");
    assert_eq!(host.replies_in_flight(), 0);

    tokio::time::sleep(Duration::from_millis(250)).await;
    let report = host.frame(DT);
    assert_eq!(report.replies_applied, 0);
    assert!(report.overlay.panel.is_none());
    let han = host.sim().world().find("Ms. Han").expect("han");
    assert!(han.conversation().is_empty());
}

#[tokio::test]
async fn escape_during_pending_reply_cancels_it() {
    let mut host = host(ResponseStrategy::new(Scripted::slow("Never shown.", 150), LlmConfig::default()));
    open_han(&mut host);
    host.ui(UiAction::SelectOption(1)).expect("select");

    host.input().key_down(Key::Escape);
    host.frame(DT);
    host.input().key_up(Key::Escape);
    assert!(!host.sim().dialogue().is_open());
    assert_eq!(host.replies_in_flight(), 0);
}

#[tokio::test]
async fn unmount_is_idempotent_and_stops_frames() {
    let mut host = host(ResponseStrategy::new(Scripted::slow("x", 500), LlmConfig::default()));
    open_han(&mut host);
    host.ui(UiAction::SelectOption(0)).expect("select");

    assert!(host.unmount().is_some());
    assert!(host.unmount().is_none());
    assert_eq!(host.replies_in_flight(), 0);

    let frames = host.renderer().frames;
    let report = host.frame(DT);
    assert!(report.overlay.panel.is_none());
    assert_eq!(host.renderer().frames, frames);
}

#[tokio::test]
async fn resize_reaches_camera_and_pointer_mapping() {
    let mut host = host(ResponseStrategy::<Scripted>::fallback_only(LlmConfig::default()));
    host.sim_mut().player_mut().yaw = std::f32::consts::PI;
    host.frame(DT);

    host.resize(Vec2::new(1600.0, 900.0));
    assert!((host.sim().camera().aspect - 16.0 / 9.0).abs() < 1e-5);
    host.input().click(Vec2::new(800.0, 450.0));
    let report = host.frame(DT);
    assert!(report.host_events.contains(&HostEvent::PointerLockRequest(true)));
    assert!(!host.sim().dialogue().is_open());
}
