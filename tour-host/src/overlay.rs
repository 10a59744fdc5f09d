//! Presentation model for the 2D overlay drawn on top of the 3D view.
//!
//! The host UI toolkit renders an [`OverlayView`] and reports clicks and
//! typing back as [`UiAction`]s. Nothing here draws.

use tour_core::SessionId;
use tour_core::dialogue::Phase;
use tour_core::sim::SimulationContext;

/// Something the visitor did in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Clicked the option button at this index.
    SelectOption(usize),
    /// Edited the free-text input.
    EditInput(String),
    /// Pressed send (or Enter) in the input.
    Submit,
    /// Pressed the close button.
    Close,
}

/// One option button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionButton {
    /// Question text.
    pub label: String,
    /// Clickable; false while a reply is pending.
    pub enabled: bool,
}

/// The dialogue panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialoguePanel {
    /// Character name.
    pub title: String,
    /// Character role.
    pub subtitle: String,
    /// Transcript lines as `speaker: text`.
    pub lines: Vec<String>,
    /// Scroll the transcript to the newest line this frame.
    pub scroll_to_end: bool,
    /// A reply is outstanding.
    pub waiting: bool,
    /// Option buttons.
    pub options: Vec<OptionButton>,
    /// Current free-text input.
    pub input: String,
    /// Send button state.
    pub send_enabled: bool,
}

/// Everything the overlay shows this frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayView {
    /// Interaction prompt near the bottom of the screen.
    pub prompt: Option<String>,
    /// Centre crosshair, shown while the pointer is captured.
    pub crosshair: bool,
    /// Open dialogue panel.
    pub panel: Option<DialoguePanel>,
}

/// Frame-to-frame overlay memory (transcript length for autoscroll).
#[derive(Debug, Default)]
pub struct OverlayState {
    session: Option<SessionId>,
    lines_seen: usize,
}

impl OverlayState {
    /// Build this frame's view.
    pub fn view(&mut self, sim: &SimulationContext, captured: bool) -> OverlayView {
        let panel = sim.dialogue().session().map(|session| {
            let character = sim.world().character(session.character());
            let lines: Vec<String> = session.transcript().iter().map(ToString::to_string).collect();

            let fresh = self.session != Some(session.id());
            let scroll_to_end = fresh || lines.len() > self.lines_seen;
            self.session = Some(session.id());
            self.lines_seen = lines.len();

            let waiting = session.phase() == Phase::ResponsePending;
            DialoguePanel {
                title: character.map(|c| c.name().to_string()).unwrap_or_default(),
                subtitle: character.map(|c| c.traits.role.clone()).unwrap_or_default(),
                lines,
                scroll_to_end,
                waiting,
                options: session
                    .options()
                    .iter()
                    .map(|label| OptionButton {
                        label: label.clone(),
                        enabled: !waiting,
                    })
                    .collect(),
                input: session.input.clone(),
                send_enabled: !waiting && !session.input.trim().is_empty(),
            }
        });
        if panel.is_none() {
            self.session = None;
            self.lines_seen = 0;
        }

        OverlayView {
            prompt: sim.prompt().map(str::to_string),
            crosshair: captured && panel.is_none(),
            panel,
        }
    }
}
