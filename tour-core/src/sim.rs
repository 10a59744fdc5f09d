//! The per-frame driver.
//!
//! [`SimulationContext`] owns every piece of tour state and advances it one
//! frame at a time with [`SimulationContext::tick`]:
//!
//! | Step | What                                                              |
//! |------|-------------------------------------------------------------------|
//! | 0    | settle transient dialogue phases already drawn, snapshot input    |
//! | 1    | move the player (not while dancing or talking), clamp to arena    |
//! | 2    | apply look keys and pointer motion (not while talking)            |
//! | 3    | camera follows the player                                         |
//! | -    | escape / interact / click edges open or close dialogue            |
//! | 4    | animate characters (dance, face partner, wander)                  |
//! | 5    | proximity scan → nearby character and interaction prompt          |
//! | 6    | hover pick (pointer free, no dialogue)                            |
//! | 7    | ring colour and pulse on nearby / hovered / partner               |
//! | 8    | render; the dialogue phase counts as presented                    |
//!
//! Replies produced elsewhere are handed back through
//! [`SimulationContext::apply_reply`] between frames.

use std::time::Instant;

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, info};

use crate::animation::{self, Highlight};
use crate::camera::{self, Camera};
use crate::config::TourConfig;
use crate::dialogue::{DialogueEngine, DialogueSession, Phase, ReplyRequest, Resolution};
use crate::error::{Result, TourError};
use crate::input::{HostEvent, InputController, InputFrame};
use crate::picking;
use crate::roster;
use crate::scene::SceneArena;
use crate::types::{CharacterId, ReplyTicket, SessionId};
use crate::world::{Player, World};

/// Frame budget at 60 Hz, microseconds.
pub const FRAME_BUDGET_US: u64 = 16_667;

// ---------------------------------------------------------------------------
// Renderer seam
// ---------------------------------------------------------------------------

/// Read-only view of one frame handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Camera for this frame.
    pub camera: &'a Camera,
    /// Scene nodes with up-to-date bounds.
    pub scene: &'a SceneArena,
    /// World state.
    pub world: &'a World,
    /// "Press E to talk to …" prompt, when visible.
    pub prompt: Option<&'a str>,
    /// Open dialogue, if any.
    pub dialogue: Option<&'a DialogueSession>,
}

/// Draws a frame. Implemented by the host's graphics backend.
pub trait Renderer {
    /// Present one frame.
    fn render(&mut self, frame: &FrameView<'_>);
}

/// A renderer that records what it was asked to draw. Used headless.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    /// Frames rendered so far.
    pub frames: u64,
    /// Eye position of the last frame.
    pub last_eye: Option<Vec3>,
    /// Prompt shown in the last frame.
    pub last_prompt: Option<String>,
    /// Visible selection rings in the last frame.
    pub last_rings: usize,
    /// Dialogue phase in the last frame.
    pub last_phase: Option<Phase>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;
        self.last_eye = Some(frame.camera.eye);
        self.last_prompt = frame.prompt.map(str::to_string);
        self.last_rings = frame.world.characters().iter().filter(|c| c.ring.visible).count();
        self.last_phase = frame.dialogue.map(DialogueSession::phase);
    }
}

// ---------------------------------------------------------------------------
// Tick output
// ---------------------------------------------------------------------------

/// Time spent in each part of a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBudget {
    /// Movement, look, camera, edges, animation, proximity (μs).
    pub update_us: u64,
    /// Hover picking (μs).
    pub pick_us: u64,
    /// Renderer call (μs).
    pub render_us: u64,
}

impl FrameBudget {
    /// Total time spent this frame (μs).
    #[must_use]
    pub fn total_us(&self) -> u64 {
        self.update_us + self.pick_us + self.render_us
    }

    /// Whether the frame fit a 60 Hz budget.
    #[must_use]
    pub fn within_budget(&self) -> bool {
        self.total_us() < FRAME_BUDGET_US
    }
}

/// Everything the host must act on after a tick.
#[derive(Debug, Default)]
pub struct TickOutput {
    /// Pointer-lock and cursor requests.
    pub host_events: Vec<HostEvent>,
    /// Reply requests issued since the last tick.
    pub requests: Vec<ReplyRequest>,
    /// Sessions closed since the last tick; their outstanding work is moot.
    pub closed: Vec<SessionId>,
    /// Timing breakdown.
    pub budget: FrameBudget,
}

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// Owns the player, world, scene, camera, input and dialogue.
#[derive(Debug)]
pub struct SimulationContext {
    config: TourConfig,
    world: World,
    player: Player,
    camera: Camera,
    input: InputController,
    scene: SceneArena,
    dialogue: DialogueEngine,
    nearby: Option<CharacterId>,
    hovered: Option<CharacterId>,
    prompt: Option<String>,
    clock: f32,
    running: bool,
    outbox: Vec<ReplyRequest>,
    closed: Vec<SessionId>,
}

impl SimulationContext {
    /// Build a context around an existing world. Input is not attached until
    /// [`mount`](Self::mount).
    #[must_use]
    pub fn new(config: TourConfig, world: World, viewport: Vec2) -> Self {
        let spawn = config.player.spawn;
        let player = Player::new(
            config.arena.clamp(Vec3::new(spawn[0], config.player.eye_height, spawn[2])),
            config.player.speed,
        );
        let camera = Camera::new(&config.camera, &player);
        let scene = SceneArena::build(&world);
        let dialogue = DialogueEngine::new(config.dialogue.clone());
        Self {
            world,
            player,
            camera,
            input: InputController::new(viewport),
            scene,
            dialogue,
            nearby: None,
            hovered: None,
            prompt: None,
            clock: 0.0,
            running: false,
            outbox: Vec::new(),
            closed: Vec::new(),
            config,
        }
    }

    /// Build a context with the built-in campus world.
    ///
    /// # Errors
    /// Fails if the configured arena cannot hold the campus roster.
    pub fn campus(config: TourConfig, viewport: Vec2) -> Result<Self> {
        let world = roster::campus_world(config.arena)?;
        Ok(Self::new(config, world, viewport))
    }

    /// The viewport changed size. Click and hover mapping follow the new
    /// size; the camera aspect follows it when both sides are positive.
    pub fn resize(&mut self, viewport: Vec2) {
        self.input.set_viewport(viewport);
        if viewport.x > 0.0 && viewport.y > 0.0 {
            self.camera.aspect = viewport.x / viewport.y;
        }
        debug!(width = viewport.x, height = viewport.y, "viewport resized");
    }

    /// Attach input and start accepting ticks.
    pub fn mount(&mut self) {
        self.input.attach();
        self.running = true;
        info!(characters = self.world.characters().len(), "tour mounted");
    }

    /// Stop the frame driver, detach input and dispose the scene.
    ///
    /// Returns the open session, if any, so the caller can abandon its work.
    /// Safe to call more than once.
    pub fn unmount(&mut self) -> Option<SessionId> {
        let open = self.dialogue.close();
        self.running = false;
        self.input.detach();
        if self.scene.dispose() {
            info!("tour unmounted");
        }
        open
    }

    /// Whether ticks are being processed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // -- accessors ----------------------------------------------------------

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// World state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably (teleports, tests).
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Input controller, for host callbacks.
    pub fn input(&mut self) -> &mut InputController {
        &mut self.input
    }

    /// Scene arena.
    #[must_use]
    pub fn scene(&self) -> &SceneArena {
        &self.scene
    }

    /// Dialogue engine.
    #[must_use]
    pub fn dialogue(&self) -> &DialogueEngine {
        &self.dialogue
    }

    /// Character within talking range.
    #[must_use]
    pub fn nearby(&self) -> Option<CharacterId> {
        self.nearby
    }

    /// Character under the pointer.
    #[must_use]
    pub fn hovered(&self) -> Option<CharacterId> {
        self.hovered
    }

    /// Interaction prompt, when visible.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Seconds simulated since construction.
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    // -- dialogue actions ---------------------------------------------------

    /// Open a conversation with `id`. Releases pointer capture and
    /// suppresses look.
    ///
    /// # Errors
    /// `CharacterNotFound` for an unknown id.
    pub fn open_dialogue<R: Rng + ?Sized>(&mut self, id: CharacterId, rng: &mut R) -> Result<SessionId> {
        let character = self.world.character(id).ok_or(TourError::CharacterNotFound(id))?;
        let previous = self.dialogue.session().map(DialogueSession::id);
        let session = self.dialogue.open(character, rng);
        self.closed.extend(previous);
        self.input.release_capture();
        self.input.set_look_suppressed(true);
        self.player.velocity = Vec3::ZERO;
        self.player.is_dancing = false;
        Ok(session)
    }

    /// Close the open conversation. Movement and look resume next tick.
    pub fn close_dialogue(&mut self) -> Option<SessionId> {
        let id = self.dialogue.close()?;
        self.input.set_look_suppressed(false);
        for c in self.world.characters_mut() {
            c.facing_target = None;
        }
        self.closed.push(id);
        Some(id)
    }

    /// Ask presented option `index`. The request goes out with the next tick.
    ///
    /// # Errors
    /// See [`DialogueEngine::select_option`].
    pub fn select_option(&mut self, index: usize) -> Result<ReplyTicket> {
        let request = self.dialogue.select_option(index, &self.world)?;
        Ok(self.queue(request))
    }

    /// Ask the typed question in the input buffer.
    ///
    /// # Errors
    /// See [`DialogueEngine::submit_input`].
    pub fn submit_question(&mut self) -> Result<ReplyTicket> {
        let request = self.dialogue.submit_input(&self.world)?;
        Ok(self.queue(request))
    }

    /// Edit the free-text input buffer of the open session.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        if let Some(session) = self.dialogue.session_mut() {
            session.input = text.into();
        }
    }

    /// Hand back a reply produced for `ticket`.
    pub fn apply_reply<R: Rng + ?Sized>(&mut self, ticket: ReplyTicket, reply: &str, rng: &mut R) -> Resolution {
        self.dialogue.resolve(ticket, reply, &mut self.world, rng)
    }

    /// Take queued requests without waiting for the next tick.
    pub fn drain_requests(&mut self) -> Vec<ReplyRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, request: ReplyRequest) -> ReplyTicket {
        let ticket = request.ticket;
        self.outbox.push(request);
        ticket
    }

    // -- the frame ----------------------------------------------------------

    /// Advance one frame of `dt` seconds and render it.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R, renderer: &mut dyn Renderer) -> TickOutput {
        if !self.running || self.scene.is_disposed() {
            return TickOutput::default();
        }
        let started = Instant::now();
        self.clock += dt;

        // 0. settle, snapshot
        self.dialogue.settle();
        let frame = self.input.snapshot();
        let talking = self.dialogue.is_open();
        self.player.is_dancing = frame.dance_held && !talking;

        // 1–3. move, look, camera
        self.move_player(&frame, dt, talking);
        if !talking {
            self.player.yaw += frame.look_keys * self.config.look.key_turn_rate * dt
                - frame.pointer_dx * self.config.look.pointer_sensitivity;
        }
        camera::follow_player(&self.config.camera, &mut self.camera, &self.player, self.clock);

        self.handle_edges(&frame, rng);

        // 4. characters
        let partner = self.dialogue.session().map(DialogueSession::character);
        let arena = self.world.arena();
        let player_pos = self.player.position;
        for c in self.world.characters_mut() {
            c.facing_target = (Some(c.id) == partner).then_some(player_pos);
            animation::animate(&self.config.animation, &arena, c, dt, rng);
        }
        self.scene.sync(&self.world);

        // 5. proximity
        self.update_nearby();
        let update_done = Instant::now();

        // 6. hover
        let talking = self.dialogue.is_open();
        self.hovered = match frame.hover {
            Some(ndc) if !frame.pointer_captured && !talking => {
                picking::pick(&self.scene, &self.camera.ray_through(ndc))
            }
            _ => None,
        };
        let pick_done = Instant::now();

        // 7. feedback
        for c in self.world.characters_mut() {
            let highlight = if Some(c.id) == partner {
                Highlight::Talking
            } else if Some(c.id) == self.hovered {
                Highlight::Hovered
            } else if Some(c.id) == self.nearby {
                Highlight::Nearby
            } else {
                Highlight::None
            };
            animation::apply_highlight(&self.config.animation, c, highlight);
        }
        self.scene.sync(&self.world);

        // 8. render
        renderer.render(&FrameView {
            camera: &self.camera,
            scene: &self.scene,
            world: &self.world,
            prompt: self.prompt.as_deref(),
            dialogue: self.dialogue.session(),
        });
        self.dialogue.mark_presented();
        let render_done = Instant::now();

        TickOutput {
            host_events: self.input.drain_host_events(),
            requests: std::mem::take(&mut self.outbox),
            closed: std::mem::take(&mut self.closed),
            budget: FrameBudget {
                update_us: micros(update_done - started),
                pick_us: micros(pick_done - update_done),
                render_us: micros(render_done - pick_done),
            },
        }
    }

    fn move_player(&mut self, frame: &InputFrame, dt: f32, talking: bool) {
        if talking || self.player.is_dancing {
            self.player.velocity = Vec3::ZERO;
            return;
        }
        let wish = self.player.right() * frame.movement.x + self.player.forward() * frame.movement.y;
        self.player.velocity = wish.normalize_or_zero() * self.player.speed;
        let next = self.player.position + self.player.velocity * dt;
        self.player.position = self.world.arena().clamp(next);
    }

    fn handle_edges<R: Rng + ?Sized>(&mut self, frame: &InputFrame, rng: &mut R) {
        if frame.escape_pressed && self.close_dialogue().is_some() {
            debug!(target: "dialogue", "closed by escape");
            // An explicit close wins over any open request this frame.
            return;
        }

        if frame.interact_pressed && !self.dialogue.is_open() {
            let radius = self.config.interaction.radius;
            if let Some(id) = picking::nearest_within(self.player.position, self.world.characters(), radius) {
                // Unknown ids are impossible here; the scan came from the roster.
                let _ = self.open_dialogue(id, rng);
            }
        }

        for &ndc in &frame.clicks {
            if self.dialogue.is_open() || self.input.is_captured() {
                continue;
            }
            match picking::pick(&self.scene, &self.camera.ray_through(ndc)) {
                Some(id) => {
                    let _ = self.open_dialogue(id, rng);
                }
                None => self.input.request_capture(),
            }
        }
    }

    fn update_nearby(&mut self) {
        let nearby = picking::nearest_within(
            self.player.position,
            self.world.characters(),
            self.config.interaction.radius,
        );
        if nearby != self.nearby {
            debug!(from = ?self.nearby, to = ?nearby, "nearby character changed");
            self.nearby = nearby;
        }
        self.prompt = match self.nearby.and_then(|id| self.world.character(id)) {
            Some(c) if !self.dialogue.is_open() => Some(format!(
                "Press {} to talk to {}",
                self.config.interaction.interact_key_label,
                c.name()
            )),
            _ => None,
        };
    }
}

fn micros(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn mounted() -> SimulationContext {
        let mut sim = SimulationContext::campus(TourConfig::default(), Vec2::new(800.0, 600.0)).expect("campus");
        sim.mount();
        sim
    }

    #[test]
    fn forward_moves_along_facing() {
        let mut sim = mounted();
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RecordingRenderer::default();
        let start = sim.player().position;
        sim.input().key_down(Key::Forward);
        sim.tick(0.1, &mut rng, &mut r);
        let moved = sim.player().position - start;
        assert!((moved.z + 0.5).abs() < 1e-4);
        assert!(moved.x.abs() < 1e-4);
        assert_eq!(r.frames, 1);
        assert_eq!(r.last_eye, Some(sim.player().position));
    }

    #[test]
    fn resize_updates_aspect_and_click_mapping() {
        let mut sim = mounted();
        sim.resize(Vec2::new(1000.0, 500.0));
        assert!((sim.camera().aspect - 2.0).abs() < 1e-6);
        sim.input().click(Vec2::new(500.0, 250.0));
        assert_eq!(sim.input().snapshot().clicks, vec![Vec2::ZERO]);
        // A collapsed canvas keeps the last usable aspect.
        sim.resize(Vec2::new(1000.0, 0.0));
        assert!((sim.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn diagonal_is_not_faster() {
        let mut sim = mounted();
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RecordingRenderer::default();
        let start = sim.player().position;
        sim.input().key_down(Key::Forward);
        sim.input().key_down(Key::Right);
        sim.tick(0.1, &mut rng, &mut r);
        let d = (sim.player().position - start).length();
        assert!((d - 0.5).abs() < 1e-4);
    }

    #[test]
    fn dancing_freezes_movement() {
        let mut sim = mounted();
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RecordingRenderer::default();
        let start = sim.player().position;
        sim.input().key_down(Key::Dance);
        sim.input().key_down(Key::Forward);
        sim.tick(0.1, &mut rng, &mut r);
        assert!(sim.player().is_dancing);
        assert_eq!(sim.player().position, start);
    }

    #[test]
    fn look_key_turns_left() {
        let mut sim = mounted();
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RecordingRenderer::default();
        sim.input().key_down(Key::LookLeft);
        sim.tick(0.5, &mut rng, &mut r);
        assert!(sim.player().yaw > 0.0);
        assert!(sim.player().forward().x < 0.0);
    }

    #[test]
    fn unmounted_sim_does_not_tick() {
        let mut sim = mounted();
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RecordingRenderer::default();
        sim.unmount();
        sim.unmount();
        assert!(sim.scene().is_disposed());
        sim.tick(0.1, &mut rng, &mut r);
        assert_eq!(r.frames, 0);
    }

    #[test]
    fn budget_reports_sane_totals() {
        let b = FrameBudget {
            update_us: 100,
            pick_us: 50,
            render_us: 1000,
        };
        assert_eq!(b.total_us(), 1150);
        assert!(b.within_budget());
    }
}
