//! End-to-end checks of the viewer logic that runs without a GPU: pointer
//! tilt, projection resizing and the full evolution flow.

use beanview::{
    animate::{AnimationDriver, EVOLVE_SPIN_SPEED, IdleMotion},
    camera::Projection,
    evolve::{Evolution, EvolutionState},
    input::{self, PointerMode, PointerTracker},
};
use cgmath::Deg;
use instant::{Duration, Instant};

#[test]
fn pointer_at_centre_leaves_the_model_level() {
    let mut tracker = PointerTracker::new(PointerMode::DirectTilt);
    let (nx, ny) = input::normalized(400.0, 300.0, 800, 600);
    tracker.pointer_moved(nx, ny);

    assert!(tracker.tilt().yaw.abs() < 1e-6);
    assert!(tracker.tilt().pitch.abs() < 1e-6);
}

#[test]
fn pointer_at_top_right_corner_tilts_by_the_full_gains() {
    let mut tracker = PointerTracker::new(PointerMode::DirectTilt);
    let (nx, ny) = input::normalized(800.0, 0.0, 800, 600);
    tracker.pointer_moved(nx, ny);

    // Yaw 0.5 rad toward the pointer; pitch is inverted, -0.3 rad.
    assert!((tracker.tilt().yaw - 0.5).abs() < 1e-6);
    assert!((tracker.tilt().pitch - (-0.3)).abs() < 1e-6);
}

#[test]
fn halving_the_window_keeps_the_aspect_ratio() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let before = projection.aspect;

    projection.resize(400, 300);
    assert!((projection.aspect - before).abs() < 1e-6);

    projection.resize(1000, 600);
    assert!((projection.aspect - 1000.0 / 600.0).abs() < 1e-6);
}

#[test]
fn evolution_runs_trigger_wait_swap_complete() {
    let mut evolution = Evolution::new(Duration::from_millis(3000));
    let mut driver = AnimationDriver::new(IdleMotion::Bob);
    let start = Instant::now();

    // Idle frames: no spin.
    assert_eq!(driver.advance(evolution.state()).spin_delta, 0.0);

    assert!(evolution.trigger(start));
    // Spamming the trigger during the wait does nothing.
    assert!(!evolution.trigger(start + Duration::from_millis(100)));

    // During the wait the model spins at a constant rate.
    let motion = driver.advance(evolution.state());
    assert_eq!(motion.spin_delta, EVOLVE_SPIN_SPEED);

    // The swap becomes due exactly once, after the full delay.
    assert!(!evolution.poll_swap(start + Duration::from_millis(2999)));
    assert!(evolution.poll_swap(start + Duration::from_millis(3000)));
    assert!(!evolution.poll_swap(start + Duration::from_millis(3001)));
    assert!(evolution.swap_in_flight());

    // The replacement attached: terminal state, spin decays.
    evolution.complete();
    assert_eq!(evolution.state(), EvolutionState::Evolved);
    let decayed = driver.advance(evolution.state()).spin_delta;
    assert!(decayed < EVOLVE_SPIN_SPEED);
    assert!(!evolution.can_trigger());
}

#[test]
fn failed_swap_reverts_and_accepts_a_new_trigger() {
    let mut evolution = Evolution::new(Duration::from_millis(3000));
    let start = Instant::now();

    evolution.trigger(start);
    assert!(evolution.poll_swap(start + Duration::from_millis(3000)));

    // The replacement failed to load; the machine re-arms.
    evolution.fail();
    assert_eq!(evolution.state(), EvolutionState::Idle);
    assert!(evolution.can_trigger());

    // The retry waits the full delay again.
    let retry = start + Duration::from_secs(60);
    assert!(evolution.trigger(retry));
    assert!(!evolution.poll_swap(retry + Duration::from_millis(2999)));
    assert!(evolution.poll_swap(retry + Duration::from_millis(3000)));
}

#[test]
fn bob_amplitude_matches_the_scene_default() {
    let mut driver = AnimationDriver::new(IdleMotion::Bob);
    let mut peak: f32 = 0.0;
    // A full sine period at the fixed 0.01 step is ~629 frames.
    for _ in 0..700 {
        peak = peak.max(driver.advance(EvolutionState::Idle).bob_y);
    }
    assert!((peak - 0.05).abs() < 1e-3);
}
