//! The per-frame animation driver.
//!
//! Runs once per redraw. Time advances by a fixed nominal step rather than
//! wall-clock time, so apparent speed follows the display refresh rate.
//! That inaccuracy is accepted.

use crate::evolve::EvolutionState;

/// Nominal time advance per frame.
pub const TIME_STEP: f32 = 0.01;
/// Amplitude of the idle bob.
pub const BOB_AMPLITUDE: f32 = 0.05;
/// Yaw added per frame while a swap is pending.
pub const EVOLVE_SPIN_SPEED: f32 = 0.1;
/// Residual spin multiplier per frame once evolved.
pub const SPIN_DECAY: f32 = 0.95;

/// Idle-state motion applied to every occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleMotion {
    /// Sinusoidal vertical bob.
    Bob,
    /// No idle motion.
    Still,
}

/// What one frame contributes to the slot transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMotion {
    /// Vertical offset from the idle bob.
    pub bob_y: f32,
    /// Yaw to add this frame from the evolution spin.
    pub spin_delta: f32,
}

#[derive(Debug)]
pub struct AnimationDriver {
    idle: IdleMotion,
    time: f32,
    spin_speed: f32,
}

impl AnimationDriver {
    pub fn new(idle: IdleMotion) -> Self {
        Self {
            idle,
            time: 0.0,
            spin_speed: 0.0,
        }
    }

    /// Advances the driver by one frame and returns the motion to apply.
    pub fn advance(&mut self, evolution: EvolutionState) -> FrameMotion {
        self.time += TIME_STEP;

        let bob_y = match self.idle {
            IdleMotion::Bob => self.time.sin() * BOB_AMPLITUDE,
            IdleMotion::Still => 0.0,
        };

        match evolution {
            EvolutionState::Idle => {}
            EvolutionState::Evolving => self.spin_speed = EVOLVE_SPIN_SPEED,
            EvolutionState::Evolved => self.spin_speed *= SPIN_DECAY,
        }

        FrameMotion {
            bob_y,
            spin_delta: self.spin_speed,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accumulates_in_fixed_steps() {
        let mut driver = AnimationDriver::new(IdleMotion::Still);
        for _ in 0..100 {
            driver.advance(EvolutionState::Idle);
        }
        assert!((driver.time() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let mut driver = AnimationDriver::new(IdleMotion::Bob);
        for _ in 0..10_000 {
            let motion = driver.advance(EvolutionState::Idle);
            assert!(motion.bob_y.abs() <= BOB_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn still_mode_never_bobs() {
        let mut driver = AnimationDriver::new(IdleMotion::Still);
        for _ in 0..100 {
            assert_eq!(driver.advance(EvolutionState::Idle).bob_y, 0.0);
        }
    }

    #[test]
    fn no_spin_while_idle() {
        let mut driver = AnimationDriver::new(IdleMotion::Bob);
        assert_eq!(driver.advance(EvolutionState::Idle).spin_delta, 0.0);
    }

    #[test]
    fn spin_is_constant_while_evolving_and_decays_after() {
        let mut driver = AnimationDriver::new(IdleMotion::Still);
        let spinning = driver.advance(EvolutionState::Evolving);
        assert_eq!(spinning.spin_delta, EVOLVE_SPIN_SPEED);
        assert_eq!(
            driver.advance(EvolutionState::Evolving).spin_delta,
            EVOLVE_SPIN_SPEED
        );

        let first = driver.advance(EvolutionState::Evolved).spin_delta;
        assert!((first - EVOLVE_SPIN_SPEED * SPIN_DECAY).abs() < 1e-6);
        let second = driver.advance(EvolutionState::Evolved).spin_delta;
        assert!((second - first * SPIN_DECAY).abs() < 1e-6);
    }

    #[test]
    fn decayed_spin_approaches_zero() {
        let mut driver = AnimationDriver::new(IdleMotion::Still);
        driver.advance(EvolutionState::Evolving);
        let mut last = EVOLVE_SPIN_SPEED;
        for _ in 0..500 {
            last = driver.advance(EvolutionState::Evolved).spin_delta;
        }
        assert!(last < 1e-6);
    }
}
