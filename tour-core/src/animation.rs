//! Per-character animation state machine and highlight feedback.
//!
//! | State     | Entered when                          | Pose                                  |
//! |-----------|---------------------------------------|---------------------------------------|
//! | Dancing   | `is_dancing` is set                   | spin, bob, swinging arms              |
//! | Facing    | `facing_target` is set (dialogue)     | yaw toward the target, still          |
//! | Wandering | walking toward the wander target      | yaw along travel, light arm swing     |
//! | Idle      | standing at the wander target         | rest                                  |

use glam::Vec3;
use rand::Rng;

use crate::config::AnimationConfig;
use crate::types::{Arena, Rgb, planar_distance, yaw_towards};
use crate::world::Character;

/// Which branch of the animation state machine ran this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    /// Standing still.
    Idle,
    /// Walking toward a wander target.
    Wandering,
    /// Dancing in place.
    Dancing,
    /// Turned toward a conversation partner.
    Facing,
}

/// Visual emphasis applied on top of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// No emphasis.
    None,
    /// Within talking range.
    Nearby,
    /// Under the pointer.
    Hovered,
    /// Current dialogue partner.
    Talking,
}

/// Advance one character's animation by `dt` seconds.
pub fn animate<R: Rng + ?Sized>(
    cfg: &AnimationConfig,
    arena: &Arena,
    character: &mut Character,
    dt: f32,
    rng: &mut R,
) -> AnimState {
    character.anim_clock += dt;
    let t = character.anim_clock;

    if character.is_dancing {
        character.yaw += cfg.dance_spin_rate * dt;
        character.pose.bob = (t * 6.0).sin().abs() * 0.2;
        character.pose.arm_swing = (t * 8.0).sin() * 0.9;
        return AnimState::Dancing;
    }

    character.pose.bob = 0.0;

    if let Some(target) = character.facing_target {
        character.yaw = yaw_towards(character.position, target);
        character.pose.arm_swing = 0.0;
        return AnimState::Facing;
    }

    character.move_timer -= dt;
    if character.move_timer <= 0.0 {
        character.target_position = wander_target(cfg, arena, character.initial_position, rng);
        character.move_timer = cfg.wander_interval_secs * rng.gen_range(0.75..1.25);
    }

    let to_target = character.target_position - character.position;
    let remaining = planar_distance(character.target_position, character.position);
    if remaining < 0.05 {
        character.pose.arm_swing = 0.0;
        return AnimState::Idle;
    }
    let step = (cfg.wander_speed * dt).min(remaining);
    let dir = Vec3::new(to_target.x, 0.0, to_target.z).normalize_or_zero();
    character.position = arena.clamp(character.position + dir * step);
    character.yaw = yaw_towards(character.position, character.target_position);
    character.pose.arm_swing = (t * 5.0).sin() * 0.25;
    AnimState::Wandering
}

/// A random point within `wander_radius` of `home`, clamped to the arena.
fn wander_target<R: Rng + ?Sized>(cfg: &AnimationConfig, arena: &Arena, home: Vec3, rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let dist = rng.gen_range(0.0..=cfg.wander_radius.max(0.0));
    arena.clamp(home + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist))
}

/// Apply ring colour and scale pulse for this frame's highlight.
pub fn apply_highlight(cfg: &AnimationConfig, character: &mut Character, highlight: Highlight) {
    let t = character.anim_clock;
    match highlight {
        Highlight::None => {
            character.ring.visible = false;
            character.pose.scale = 1.0;
        }
        Highlight::Nearby => {
            character.ring.visible = true;
            character.ring.color = Rgb::NEARBY;
            character.pose.scale = 1.0 + (t * 4.0).sin() * cfg.highlight_pulse;
        }
        Highlight::Hovered => {
            character.ring.visible = true;
            character.ring.color = Rgb::HOVERED;
            character.pose.scale = 1.0 + (t * 4.0).sin() * cfg.highlight_pulse;
            if !character.is_dancing {
                character.pose.bob += (t * 3.0).sin().abs() * 0.05;
            }
        }
        Highlight::Talking => {
            character.ring.visible = true;
            character.ring.color = Rgb::TALKING;
            character.pose.scale = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replies::ReplyBook;
    use crate::world::{CharacterSpec, CharacterTraits, World};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn one(dancing: bool) -> World {
        World::new(
            Arena::default(),
            vec![],
            vec![CharacterSpec {
                traits: CharacterTraits {
                    name: "Jun".into(),
                    role: "Teacher".into(),
                    personality: "calm".into(),
                    quirk: "taps pen".into(),
                },
                start: Vec3::new(2.0, 0.0, 2.0),
                book: ReplyBook::new(),
                dancing,
            }],
        )
        .expect("valid world")
    }

    #[test]
    fn wandering_stays_near_home() {
        let cfg = AnimationConfig::default();
        let arena = Arena::default();
        let mut world = one(false);
        let mut rng = StdRng::seed_from_u64(3);
        let c = &mut world.characters_mut()[0];
        for _ in 0..2000 {
            animate(&cfg, &arena, c, 1.0 / 60.0, &mut rng);
            assert!(planar_distance(c.position, c.initial_position) <= cfg.wander_radius + 1e-3);
        }
    }

    #[test]
    fn dancing_spins_in_place() {
        let cfg = AnimationConfig::default();
        let arena = Arena::default();
        let mut world = one(true);
        let mut rng = StdRng::seed_from_u64(3);
        let c = &mut world.characters_mut()[0];
        let start = c.position;
        let yaw0 = c.yaw;
        assert_eq!(animate(&cfg, &arena, c, 0.1, &mut rng), AnimState::Dancing);
        assert_eq!(c.position, start);
        assert!(c.yaw > yaw0);
    }

    #[test]
    fn facing_target_turns_toward_player() {
        let cfg = AnimationConfig::default();
        let arena = Arena::default();
        let mut world = one(false);
        let mut rng = StdRng::seed_from_u64(3);
        let c = &mut world.characters_mut()[0];
        c.facing_target = Some(Vec3::new(2.0, 1.6, 10.0));
        assert_eq!(animate(&cfg, &arena, c, 0.016, &mut rng), AnimState::Facing);
        let facing = glam::Quat::from_rotation_y(c.yaw) * Vec3::NEG_Z;
        assert!((facing - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn highlight_sets_ring() {
        let cfg = AnimationConfig::default();
        let mut world = one(false);
        let c = &mut world.characters_mut()[0];
        apply_highlight(&cfg, c, Highlight::Hovered);
        assert!(c.ring.visible);
        assert_eq!(c.ring.color, Rgb::HOVERED);
        apply_highlight(&cfg, c, Highlight::None);
        assert!(!c.ring.visible);
        assert_eq!(c.pose.scale, 1.0);
    }
}
