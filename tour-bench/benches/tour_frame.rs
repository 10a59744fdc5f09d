//! Campus Tour Benchmark Suite
//!
//! Performance targets at 60 Hz (16.7 ms per frame):
//!   nearest_within_6_characters ...... < 1μs
//!   pick_centre_of_view .............. < 5μs
//!   frame_tick_idle .................. < 100μs
//!   frame_tick_walking_with_pointer .. < 150μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

use tour_core::input::Key;
use tour_core::picking::{nearest_within, pick};
use tour_core::roster::campus_world;
use tour_core::sim::{RecordingRenderer, SimulationContext};
use tour_core::{Arena, TourConfig};

const DT: f32 = 1.0 / 60.0;
const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn mounted_sim() -> SimulationContext {
    let mut sim = SimulationContext::campus(TourConfig::default(), VIEWPORT).expect("campus");
    sim.mount();
    sim
}

/// Benchmark: proximity query over the campus roster (target: < 1μs).
fn bench_nearest_within(c: &mut Criterion) {
    let world = campus_world(Arena::default()).expect("campus");
    let origin = Vec3::new(-9.0, 1.6, -5.0);
    c.bench_function("nearest_within_6_characters", |b| {
        b.iter(|| nearest_within(black_box(origin), black_box(world.characters()), black_box(3.0)));
    });
}

/// Benchmark: ray pick through the centre of the view (target: < 5μs).
fn bench_pick(c: &mut Criterion) {
    let mut sim = mounted_sim();
    let mut rng = StdRng::seed_from_u64(1);
    let mut r = RecordingRenderer::default();
    sim.player_mut().position = Vec3::new(-10.0, 1.6, 0.0);
    sim.player_mut().yaw = 0.0;
    sim.tick(DT, &mut rng, &mut r);

    let ray = sim.camera().ray_through(Vec2::ZERO);
    c.bench_function("pick_centre_of_view", |b| {
        b.iter(|| pick(black_box(sim.scene()), black_box(&ray)));
    });
}

/// Benchmark: idle frame, no input (target: < 100μs).
fn bench_tick_idle(c: &mut Criterion) {
    let mut sim = mounted_sim();
    let mut rng = StdRng::seed_from_u64(2);
    let mut r = RecordingRenderer::default();
    c.bench_function("frame_tick_idle", |b| {
        b.iter(|| {
            let out = sim.tick(black_box(DT), &mut rng, &mut r);
            black_box(out);
        });
    });
}

/// Benchmark: walking and turning with a captured pointer (target: < 150μs).
fn bench_tick_walking(c: &mut Criterion) {
    let mut sim = mounted_sim();
    let mut rng = StdRng::seed_from_u64(3);
    let mut r = RecordingRenderer::default();
    sim.input().pointer_capture_changed(true);
    sim.input().key_down(Key::Forward);
    sim.input().key_down(Key::LookLeft);
    c.bench_function("frame_tick_walking_with_pointer", |b| {
        b.iter(|| {
            sim.input().pointer_moved(VIEWPORT * 0.5, Vec2::new(3.0, 0.0));
            let out = sim.tick(black_box(DT), &mut rng, &mut r);
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_nearest_within,
    bench_pick,
    bench_tick_idle,
    bench_tick_walking,
);
criterion_main!(benches);
