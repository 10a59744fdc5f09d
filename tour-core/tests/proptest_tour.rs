//! Property-based tests for tour invariants.
//!
//! Arena clamping, the proximity rule, option draws and the fallback path
//! must hold for arbitrary inputs, not just the scripted scenarios.

use glam::{Vec2, Vec3};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use tour_core::dialogue::{self, QUESTION_POOL};
use tour_core::input::Key;
use tour_core::picking::nearest_within;
use tour_core::replies::{self, GENERIC_DEFAULTS, ReplyBook, Topic};
use tour_core::roster::campus_world;
use tour_core::sim::{RecordingRenderer, SimulationContext};
use tour_core::{Arena, TourConfig, planar_distance};

// ---------------------------------------------------------------------------
// Property: the player never leaves the arena
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn player_stays_in_arena(yaw in -10.0..10.0f32, dt in 0.01..0.5f32, strafe in any::<bool>()) {
        let mut sim = SimulationContext::campus(TourConfig::default(), Vec2::new(800.0, 600.0))
            .expect("campus");
        sim.mount();
        sim.player_mut().yaw = yaw;
        sim.input().key_down(Key::Forward);
        if strafe {
            sim.input().key_down(Key::Right);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let mut r = RecordingRenderer::default();
        for _ in 0..120 {
            sim.tick(dt, &mut rng, &mut r);
            let p = sim.player().position;
            prop_assert!(p.x.abs() <= 18.0 && p.z.abs() <= 18.0);
        }
        sim.unmount();
    }

    #[test]
    fn clamp_is_inside_and_idempotent(x in -100.0..100.0f32, y in -5.0..5.0f32, z in -100.0..100.0f32) {
        let arena = Arena::default();
        let c = arena.clamp(Vec3::new(x, y, z));
        prop_assert!(arena.contains(c));
        prop_assert_eq!(c.y, y);
        prop_assert_eq!(arena.clamp(c), c);
    }
}

// ---------------------------------------------------------------------------
// Property: nearby iff strictly within radius, and it is the closest
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn nearby_is_closest_within_radius(x in -18.0..18.0f32, z in -18.0..18.0f32) {
        let world = campus_world(Arena::default()).expect("campus");
        let origin = Vec3::new(x, 1.6, z);
        let found = nearest_within(origin, world.characters(), 3.0);
        let min = world
            .characters()
            .iter()
            .map(|c| planar_distance(origin, c.position))
            .fold(f32::INFINITY, f32::min);
        match found {
            Some(id) => {
                let d = planar_distance(origin, world.character(id).expect("id").position);
                prop_assert!(d < 3.0);
                prop_assert_eq!(d, min);
            }
            None => prop_assert!(min >= 3.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Property: option draws are distinct, from the pool, and skip the exclusion
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn option_draws_are_distinct(seed in any::<u64>(), excluded in 0..QUESTION_POOL.len()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let skip = QUESTION_POOL[excluded];
        let options = dialogue::draw_options(4, Some(skip), &mut rng);
        prop_assert_eq!(options.len(), 4);
        for (i, a) in options.iter().enumerate() {
            prop_assert!(QUESTION_POOL.contains(&a.as_str()));
            prop_assert_ne!(a.as_str(), skip);
            for b in &options[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: the fallback always answers
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn fallback_is_never_empty(question in ".{0,80}", seed in any::<u64>()) {
        let book = ReplyBook::new().with(Topic::Role, &["I run the front desk."]);
        let mut rng = StdRng::seed_from_u64(seed);
        let reply = replies::fallback_reply(&book, &question, &mut rng);
        prop_assert!(!reply.trim().is_empty());
        match replies::classify(&question) {
            Topic::Role => prop_assert_eq!(reply.as_str(), "I run the front desk."),
            _ => prop_assert!(GENERIC_DEFAULTS.contains(&reply.as_str())),
        }
    }
}
