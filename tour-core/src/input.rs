//! Input aggregation: held keys, pointer capture, clicks.
//!
//! Host callbacks (key down/up, pointer move, click, capture change) write
//! into the [`InputController`]; once per frame the simulation takes an
//! [`InputFrame`] snapshot, which consumes edge events, accumulated look
//! motion and queued clicks.
//!
//! Side effects the host must perform (locking the pointer, showing the
//! cursor) are queued as [`HostEvent`]s rather than executed here.

use std::collections::HashSet;

use glam::Vec2;
use tracing::{debug, info};

/// Logical keys the tour reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Walk forward.
    Forward,
    /// Walk backward.
    Back,
    /// Strafe left.
    Left,
    /// Strafe right.
    Right,
    /// Turn left.
    LookLeft,
    /// Turn right.
    LookRight,
    /// Talk to the nearby character (edge-triggered).
    Interact,
    /// Dance while held.
    Dance,
    /// Close dialogue (edge-triggered).
    Escape,
}

impl Key {
    /// Map a DOM-style `KeyboardEvent.code` to a logical key.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "KeyW" | "ArrowUp" => Self::Forward,
            "KeyS" | "ArrowDown" => Self::Back,
            "KeyA" => Self::Left,
            "KeyD" => Self::Right,
            "ArrowLeft" => Self::LookLeft,
            "ArrowRight" => Self::LookRight,
            "KeyE" => Self::Interact,
            "KeyF" => Self::Dance,
            "Escape" => Self::Escape,
            _ => return None,
        })
    }
}

/// Requests for the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Ask the host to enter (`true`) or leave (`false`) pointer capture.
    PointerLockRequest(bool),
    /// Show (`true`) or hide (`false`) the system cursor.
    CursorVisible(bool),
}

/// Everything the simulation needs from input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    /// Movement intent: `x` strafe right, `y` forward. Not normalised.
    pub movement: Vec2,
    /// Look-key intent: `+1` turn left, `-1` turn right.
    pub look_keys: f32,
    /// Horizontal pointer motion in pixels accumulated while captured.
    pub pointer_dx: f32,
    /// Interact was pressed since the last frame.
    pub interact_pressed: bool,
    /// Escape was pressed since the last frame.
    pub escape_pressed: bool,
    /// Dance key is held.
    pub dance_held: bool,
    /// Clicks since the last frame, in NDC.
    pub clicks: Vec<Vec2>,
    /// Current pointer position in NDC, when known.
    pub hover: Option<Vec2>,
    /// Whether the pointer is captured.
    pub pointer_captured: bool,
}

/// Aggregates raw host input into per-frame snapshots.
#[derive(Debug)]
pub struct InputController {
    held: HashSet<Key>,
    interact_edge: bool,
    escape_edge: bool,
    pointer_captured: bool,
    look_suppressed: bool,
    pointer_px: Option<Vec2>,
    viewport: Vec2,
    pointer_dx: f32,
    clicks: Vec<Vec2>,
    listening: bool,
    events: Vec<HostEvent>,
}

impl InputController {
    /// Create a controller for a viewport of `width × height` pixels.
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            held: HashSet::new(),
            interact_edge: false,
            escape_edge: false,
            pointer_captured: false,
            look_suppressed: false,
            pointer_px: None,
            viewport,
            pointer_dx: 0.0,
            clicks: Vec::new(),
            listening: false,
            events: Vec::new(),
        }
    }

    /// Start accepting host input.
    pub fn attach(&mut self) {
        self.listening = true;
        debug!(target: "controls", "input listeners attached");
    }

    /// Stop accepting host input and forget all transient state.
    pub fn detach(&mut self) {
        self.listening = false;
        self.held.clear();
        self.clicks.clear();
        self.pointer_dx = 0.0;
        self.interact_edge = false;
        self.escape_edge = false;
        debug!(target: "controls", "input listeners detached");
    }

    /// Whether host input is currently accepted.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listening
    }

    /// Viewport resize.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// A key went down. Repeats of a held key do not re-arm edge events.
    pub fn key_down(&mut self, key: Key) {
        if !self.listening {
            return;
        }
        if self.held.insert(key) {
            match key {
                Key::Interact => self.interact_edge = true,
                Key::Escape => self.escape_edge = true,
                _ => {}
            }
        }
    }

    /// A key went up.
    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Whether a key is held.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Pointer moved to `position` (pixels) with relative `movement`.
    ///
    /// Relative motion only turns the view while captured and not suppressed.
    /// Vertical motion is ignored; the camera never pitches.
    pub fn pointer_moved(&mut self, position: Vec2, movement: Vec2) {
        if !self.listening {
            return;
        }
        self.pointer_px = Some(position);
        if self.pointer_captured && !self.look_suppressed {
            self.pointer_dx += movement.x;
        }
    }

    /// A primary click at `position` (pixels).
    pub fn click(&mut self, position: Vec2) {
        if !self.listening {
            return;
        }
        self.pointer_px = Some(position);
        self.clicks.push(to_ndc(position, self.viewport));
    }

    /// Suppress pointer look (while a dialogue is open).
    pub fn set_look_suppressed(&mut self, suppressed: bool) {
        self.look_suppressed = suppressed;
        if suppressed {
            self.pointer_dx = 0.0;
        }
    }

    /// Ask the host for pointer capture.
    pub fn request_capture(&mut self) {
        if !self.pointer_captured {
            info!(target: "controls", reason = "click_empty_space", "pointer capture requested");
            self.events.push(HostEvent::PointerLockRequest(true));
        }
    }

    /// Leave pointer capture immediately and ask the host to unlock.
    pub fn release_capture(&mut self) {
        if self.pointer_captured {
            info!(target: "controls", reason = "dialogue_open", "pointer capture released");
            self.events.push(HostEvent::PointerLockRequest(false));
            self.pointer_capture_changed(false);
        }
    }

    /// The host reports a capture change. Toggles cursor visibility.
    pub fn pointer_capture_changed(&mut self, captured: bool) {
        if self.pointer_captured == captured {
            return;
        }
        self.pointer_captured = captured;
        self.pointer_dx = 0.0;
        info!(target: "controls", captured, "pointer capture changed");
        self.events.push(HostEvent::CursorVisible(!captured));
    }

    /// Whether the pointer is captured.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Take this frame's snapshot, consuming edges, motion and clicks.
    pub fn snapshot(&mut self) -> InputFrame {
        let axis = |pos: Key, neg: Key| -> f32 {
            f32::from(u8::from(self.held.contains(&pos))) - f32::from(u8::from(self.held.contains(&neg)))
        };
        let frame = InputFrame {
            movement: Vec2::new(axis(Key::Right, Key::Left), axis(Key::Forward, Key::Back)),
            look_keys: axis(Key::LookLeft, Key::LookRight),
            pointer_dx: self.pointer_dx,
            interact_pressed: self.interact_edge,
            escape_pressed: self.escape_edge,
            dance_held: self.held.contains(&Key::Dance),
            clicks: std::mem::take(&mut self.clicks),
            hover: self.pointer_px.map(|p| to_ndc(p, self.viewport)),
            pointer_captured: self.pointer_captured,
        };
        self.pointer_dx = 0.0;
        self.interact_edge = false;
        self.escape_edge = false;
        frame
    }

    /// Drain queued host requests.
    pub fn drain_host_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Convert a pixel position (origin top-left) to normalised device
/// coordinates (origin centre, `y` up).
#[must_use]
pub fn to_ndc(position: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    Vec2::new(
        (position.x / size.x) * 2.0 - 1.0,
        -((position.y / size.y) * 2.0 - 1.0),
    )
}
