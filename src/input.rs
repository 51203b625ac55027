//! Pointer tracking: normalization and tilt policies.
//!
//! Raw cursor positions are normalized into device coordinates in [-1, 1]
//! on both axes, +Y up, with the viewport centre at (0, 0). The tracker
//! turns them into a yaw/pitch tilt for the tracked model, either applied
//! directly or eased toward with a fixed interpolation factor.

use cgmath::Vector3;

/// Yaw gain: full right edge of the viewport tilts the model 0.5 rad.
pub const YAW_GAIN: f32 = 0.5;
/// Pitch gain: full top edge tilts the model -0.3 rad (inverted).
pub const PITCH_GAIN: f32 = -0.3;
/// Interpolation factor per pointer event in smoothed mode.
pub const FOLLOW_FACTOR: f32 = 0.05;
/// How far (in world units) the smoothed policy lets the model drift
/// toward the pointer.
pub const FOLLOW_RANGE: Vector3<f32> = Vector3::new(0.5, 0.3, 0.0);

/// Converts viewport-relative pixel coordinates into normalized device
/// coordinates.
pub fn normalized(x: f64, y: f64, width: u32, height: u32) -> (f32, f32) {
    let nx = (x / width as f64) * 2.0 - 1.0;
    let ny = 1.0 - (y / height as f64) * 2.0;
    (nx as f32, ny as f32)
}

/// How the tracked model responds to the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerMode {
    /// The tilt follows the pointer immediately.
    DirectTilt,
    /// Tilt and position ease toward the pointer by [`FOLLOW_FACTOR`]
    /// per event.
    SmoothedFollow,
}

/// Rotation of the tracked model around Y (yaw) and X (pitch), in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tilt {
    pub yaw: f32,
    pub pitch: f32,
}

/// Per-session pointer state. Holds only the derived tilt and follow
/// offset; raw pixel coordinates are never stored.
#[derive(Debug)]
pub struct PointerTracker {
    mode: PointerMode,
    current: Tilt,
    offset: Vector3<f32>,
}

impl PointerTracker {
    pub fn new(mode: PointerMode) -> Self {
        Self {
            mode,
            current: Tilt::default(),
            offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Feeds one normalized pointer position into the tracker.
    pub fn pointer_moved(&mut self, nx: f32, ny: f32) {
        let target = Tilt {
            yaw: nx * YAW_GAIN,
            pitch: ny * PITCH_GAIN,
        };
        match self.mode {
            PointerMode::DirectTilt => {
                self.current = target;
            }
            PointerMode::SmoothedFollow => {
                self.current.yaw += (target.yaw - self.current.yaw) * FOLLOW_FACTOR;
                self.current.pitch += (target.pitch - self.current.pitch) * FOLLOW_FACTOR;
                let target_offset =
                    Vector3::new(nx * FOLLOW_RANGE.x, ny * FOLLOW_RANGE.y, FOLLOW_RANGE.z);
                self.offset += (target_offset - self.offset) * FOLLOW_FACTOR;
            }
        }
    }

    pub fn tilt(&self) -> Tilt {
        self.current
    }

    /// Translation the pointer adds to the model (zero in direct mode).
    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_maps_to_origin() {
        let (nx, ny) = normalized(400.0, 300.0, 800, 600);
        assert!(nx.abs() < 1e-6);
        assert!(ny.abs() < 1e-6);
    }

    #[test]
    fn corners_stay_within_unit_range() {
        for &(x, y) in &[(0.0, 0.0), (800.0, 0.0), (0.0, 600.0), (800.0, 600.0)] {
            let (nx, ny) = normalized(x, y, 800, 600);
            assert!((-1.0..=1.0).contains(&nx));
            assert!((-1.0..=1.0).contains(&ny));
        }
        // Top-right corner is (+1, +1): +Y is up.
        let (nx, ny) = normalized(800.0, 0.0, 800, 600);
        assert_eq!((nx, ny), (1.0, 1.0));
    }

    #[test]
    fn direct_tilt_applies_gains_immediately() {
        let mut tracker = PointerTracker::new(PointerMode::DirectTilt);
        tracker.pointer_moved(1.0, 1.0);
        assert!((tracker.tilt().yaw - 0.5).abs() < 1e-6);
        assert!((tracker.tilt().pitch + 0.3).abs() < 1e-6);
        assert_eq!(tracker.offset(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn direct_tilt_is_deterministic_per_sequence() {
        let run = |events: &[(f32, f32)]| {
            let mut tracker = PointerTracker::new(PointerMode::DirectTilt);
            events
                .iter()
                .map(|&(nx, ny)| {
                    tracker.pointer_moved(nx, ny);
                    tracker.tilt()
                })
                .collect::<Vec<_>>()
        };
        let events = [(0.2, -0.4), (1.0, 1.0), (-0.5, 0.0)];
        assert_eq!(run(&events), run(&events));
    }

    #[test]
    fn smoothed_follow_converges_toward_target() {
        let mut tracker = PointerTracker::new(PointerMode::SmoothedFollow);
        let mut previous_gap = f32::INFINITY;
        for _ in 0..100 {
            tracker.pointer_moved(1.0, 0.0);
            let gap = (YAW_GAIN - tracker.tilt().yaw).abs();
            assert!(gap < previous_gap);
            previous_gap = gap;
        }
        assert!(previous_gap < 0.01);
    }

    #[test]
    fn smoothed_follow_first_step_is_five_percent() {
        let mut tracker = PointerTracker::new(PointerMode::SmoothedFollow);
        tracker.pointer_moved(1.0, 1.0);
        assert!((tracker.tilt().yaw - YAW_GAIN * FOLLOW_FACTOR).abs() < 1e-6);
        assert!((tracker.offset().x - FOLLOW_RANGE.x * FOLLOW_FACTOR).abs() < 1e-6);
    }
}
