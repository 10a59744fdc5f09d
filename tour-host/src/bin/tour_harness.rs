//! Headless tour harness.
//!
//! Walks up to the counselor, opens a conversation, asks the first offered
//! question and prints the transcript. With `TOUR_GENAI_API_KEY` set the
//! reply comes from the remote model; otherwise from the canned book.
//!
//! ```text
//! RUST_LOG=debug cargo run -p tour-host --bin tour-harness
//! ```


use anyhow::{Context, bail};
use glam::{Vec2, Vec3};
use tokio::runtime::Handle;
use tour_core::input::Key;
use tour_core::sim::RecordingRenderer;
use tour_host::overlay::UiAction;
use tour_host::{HostConfig, TourHost, telemetry};

const DT: f32 = 1.0 / 60.0;
const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HostConfig::from_env()?;
    telemetry::init(config.log_json);

    let mut host = TourHost::from_config(&config, RecordingRenderer::default(), VIEWPORT, Handle::current())
        .context("building campus tour")?;
    host.mount();
    println!("{}", host.reply_mode().description());

    let han = host.sim().world().find("Ms. Han").context("Ms. Han missing from roster")?;
    let stand = han.position + Vec3::new(1.5, 0.0, 0.0);
    host.sim_mut().player_mut().position = Vec3::new(stand.x, config.tour.player.eye_height, stand.z);
    host.frame(DT);

    host.input().key_down(Key::Interact);
    host.frame(DT);
    host.input().key_up(Key::Interact);

    let Some(panel) = host.frame(DT).overlay.panel else {
        bail!("dialogue did not open");
    };
    println!("Talking to {} ({})", panel.title, panel.subtitle);

    host.ui(UiAction::SelectOption(0))?;
    let timeout = config.reply_wait_limit();
    if !host.wait_for_replies(timeout).await {
        bail!("no reply within {timeout:?}");
    }

    let report = host.frame(DT);
    if let Some(panel) = report.overlay.panel {
        for line in panel.lines {
            println!("{line}");
        }
    }

    host.ui(UiAction::Close)?;
    host.frame(DT);
    host.unmount();
    println!("{} frames rendered", host.renderer().frames);
    Ok(())
}
