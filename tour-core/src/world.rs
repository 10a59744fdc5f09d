//! The world model: static props, the player, and the character roster.
//!
//! Static geometry never changes after construction. Characters are created
//! once and only ever mutated (pose, animation flags, conversation log).

use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TourError};
use crate::replies::ReplyBook;
use crate::types::{Arena, CharacterId, Rgb};

// ---------------------------------------------------------------------------
// Static geometry
// ---------------------------------------------------------------------------

/// What a static prop is, for the renderer's benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    /// The ground slab.
    Floor,
    /// A boundary or partition wall.
    Wall,
    /// Desks, shelves, boards, plants.
    Furniture,
}

/// An axis-aligned static box in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    /// Display name ("reception desk").
    pub name: String,
    /// Kind of prop.
    pub kind: PropKind,
    /// Box centre.
    pub center: Vec3,
    /// Half extents along each axis.
    pub half_extents: Vec3,
}

impl Prop {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropKind, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            name: name.into(),
            kind,
            center,
            half_extents,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The single first-person player.
#[derive(Debug, Clone)]
pub struct Player {
    /// Eye position.
    pub position: Vec3,
    /// Velocity applied this frame (recomputed every tick).
    pub velocity: Vec3,
    /// Walking speed, units per second.
    pub speed: f32,
    /// Look angle about +Y; 0 faces -Z.
    pub yaw: f32,
    /// While true, movement is frozen and the camera bobs.
    pub is_dancing: bool,
}

impl Player {
    /// Create a player at `position` facing -Z.
    #[must_use]
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            speed,
            yaw: 0.0,
            is_dancing: false,
        }
    }

    /// Unit forward vector on the ground plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Unit right vector on the ground plane.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Immutable identity of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTraits {
    /// Display name; unique within the roster.
    pub name: String,
    /// Job title ("School Counselor").
    pub role: String,
    /// Short personality description used in prompts.
    pub personality: String,
    /// A memorable habit or trait.
    pub quirk: String,
}

/// One (prompt, response) exchange in a character's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// What the player asked.
    pub prompt: String,
    /// What the character answered.
    pub response: String,
    /// When the answer arrived.
    pub at: DateTime<Utc>,
}

/// Visibility and colour of the ring drawn at a character's feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRing {
    /// Whether the ring is drawn.
    pub visible: bool,
    /// Ring colour.
    pub color: Rgb,
}

impl Default for SelectionRing {
    fn default() -> Self {
        Self {
            visible: false,
            color: Rgb::NEARBY,
        }
    }
}

/// Per-frame animation output consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterPose {
    /// Vertical offset added to the position.
    pub bob: f32,
    /// Uniform scale (1.0 at rest).
    pub scale: f32,
    /// Arm swing angle in radians (mirrored on the other arm).
    pub arm_swing: f32,
}

impl Default for CharacterPose {
    fn default() -> Self {
        Self {
            bob: 0.0,
            scale: 1.0,
            arm_swing: 0.0,
        }
    }
}

/// Everything needed to place a character in the world.
#[derive(Debug, Clone)]
pub struct CharacterSpec {
    /// Identity.
    pub traits: CharacterTraits,
    /// Start position (feet on the floor).
    pub start: Vec3,
    /// Curated offline replies.
    pub book: ReplyBook,
    /// Whether the character starts dancing.
    pub dancing: bool,
}

/// A non-player character.
#[derive(Debug, Clone)]
pub struct Character {
    /// Roster index.
    pub id: CharacterId,
    /// Static identity.
    pub traits: CharacterTraits,
    /// Curated offline replies.
    pub book: ReplyBook,
    /// Current feet position.
    pub position: Vec3,
    /// Where the character was placed; idle wandering stays near it.
    pub initial_position: Vec3,
    /// Current idle wander target.
    pub target_position: Vec3,
    /// Seconds until a new wander target is chosen.
    pub move_timer: f32,
    /// Facing angle about +Y; 0 faces -Z.
    pub yaw: f32,
    /// Dance animation flag.
    pub is_dancing: bool,
    /// When set, the character turns to face this point instead of idling.
    pub facing_target: Option<Vec3>,
    /// Whether a click on this character opens dialogue.
    pub clickable: bool,
    /// Highlight ring.
    pub ring: SelectionRing,
    /// Animation output for this frame.
    pub pose: CharacterPose,
    /// Accumulated animation phase, seconds.
    pub anim_clock: f32,
    conversation: Vec<ConversationEntry>,
}

impl Character {
    fn from_spec(id: CharacterId, spec: CharacterSpec) -> Self {
        Self {
            id,
            traits: spec.traits,
            book: spec.book,
            position: spec.start,
            initial_position: spec.start,
            target_position: spec.start,
            move_timer: 0.0,
            yaw: 0.0,
            is_dancing: spec.dancing,
            facing_target: None,
            clickable: true,
            ring: SelectionRing::default(),
            pose: CharacterPose::default(),
            anim_clock: 0.0,
            conversation: Vec::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.traits.name
    }

    /// The session-long conversation log, oldest first.
    #[must_use]
    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    /// Append one exchange. The log is never truncated or reordered.
    pub fn record_exchange(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.conversation.push(ConversationEntry {
            prompt: prompt.into(),
            response: response.into(),
            at: Utc::now(),
        });
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Static scene plus the character roster.
#[derive(Debug, Clone)]
pub struct World {
    arena: Arena,
    props: Vec<Prop>,
    characters: Vec<Character>,
}

impl World {
    /// Build a world, validating the roster.
    ///
    /// # Errors
    /// Returns `DuplicateCharacter` if two specs share a name, or
    /// `OutsideArena` if a character would start outside the bounds.
    pub fn new(arena: Arena, props: Vec<Prop>, roster: Vec<CharacterSpec>) -> Result<Self> {
        let mut characters: Vec<Character> = Vec::with_capacity(roster.len());
        for spec in roster {
            if characters.iter().any(|c| c.traits.name == spec.traits.name) {
                return Err(TourError::DuplicateCharacter {
                    name: spec.traits.name,
                });
            }
            if !arena.contains(spec.start) {
                return Err(TourError::OutsideArena {
                    name: spec.traits.name,
                    x: spec.start.x,
                    z: spec.start.z,
                });
            }
            let id = CharacterId(characters.len());
            characters.push(Character::from_spec(id, spec));
        }
        debug!(
            characters = characters.len(),
            props = props.len(),
            "world initialised"
        );
        Ok(Self {
            arena,
            props,
            characters,
        })
    }

    /// Walkable bounds.
    #[must_use]
    pub fn arena(&self) -> Arena {
        self.arena
    }

    /// Static props.
    #[must_use]
    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    /// All characters in roster order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Mutable access to all characters (pose and flags only; the roster
    /// itself cannot grow or shrink through this slice).
    pub fn characters_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    /// Look up one character.
    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id.0)
    }

    /// Look up one character mutably.
    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id.0)
    }

    /// Find a character by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.traits.name == name)
    }
}
