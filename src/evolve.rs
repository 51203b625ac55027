//! The one-shot model-swap ("evolution") state machine.
//!
//! `Idle -> Evolving` on user trigger, `Evolving -> Evolved` once the
//! replacement model attached. The swap itself becomes due a fixed delay
//! after the trigger; the machine is polled each frame rather than armed as
//! a detached timer, so it cannot outlive its session. A failed replacement
//! load reverts to `Idle` and re-enables the trigger instead of leaving the
//! machine stuck.

use instant::{Duration, Instant};

/// Default wait between trigger and swap.
pub const DEFAULT_SWAP_DELAY: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvolutionState {
    Idle,
    Evolving,
    Evolved,
}

#[derive(Debug)]
pub struct Evolution {
    state: EvolutionState,
    delay: Duration,
    triggered_at: Option<Instant>,
    swap_dispatched: bool,
}

impl Evolution {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: EvolutionState::Idle,
            delay,
            triggered_at: None,
            swap_dispatched: false,
        }
    }

    pub fn state(&self) -> EvolutionState {
        self.state
    }

    /// Whether a trigger would be accepted right now.
    pub fn can_trigger(&self) -> bool {
        self.state == EvolutionState::Idle
    }

    /// User trigger. Accepted only while idle; returns whether the machine
    /// moved to `Evolving`.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if !self.can_trigger() {
            log::debug!("evolution trigger ignored in state {:?}", self.state);
            return false;
        }
        self.state = EvolutionState::Evolving;
        self.triggered_at = Some(now);
        self.swap_dispatched = false;
        true
    }

    /// Polled once per frame. Returns true exactly once: the frame on which
    /// the configured delay has elapsed and the swap should be dispatched.
    pub fn poll_swap(&mut self, now: Instant) -> bool {
        if self.state != EvolutionState::Evolving || self.swap_dispatched {
            return false;
        }
        match self.triggered_at {
            Some(at) if now.duration_since(at) >= self.delay => {
                self.swap_dispatched = true;
                true
            }
            _ => false,
        }
    }

    /// Whether the replacement load has been dispatched and its result is
    /// still outstanding.
    pub fn swap_in_flight(&self) -> bool {
        self.state == EvolutionState::Evolving && self.swap_dispatched
    }

    /// The replacement model attached; the machine reaches its terminal
    /// state.
    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, EvolutionState::Evolving);
        self.state = EvolutionState::Evolved;
    }

    /// The replacement load failed. Revert to idle so the user can try
    /// again.
    pub fn fail(&mut self) {
        if self.state == EvolutionState::Evolving {
            self.state = EvolutionState::Idle;
            self.triggered_at = None;
            self.swap_dispatched = false;
        }
    }
}

impl Default for Evolution {
    fn default() -> Self {
        Self::new(DEFAULT_SWAP_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> (Evolution, Instant) {
        (Evolution::new(Duration::from_millis(3000)), Instant::now())
    }

    #[test]
    fn trigger_moves_idle_to_evolving_once() {
        let (mut evo, now) = machine();
        assert!(evo.can_trigger());
        assert!(evo.trigger(now));
        assert_eq!(evo.state(), EvolutionState::Evolving);

        // Re-triggering is disabled immediately.
        assert!(!evo.can_trigger());
        assert!(!evo.trigger(now));
        assert_eq!(evo.state(), EvolutionState::Evolving);
    }

    #[test]
    fn swap_becomes_due_exactly_after_delay() {
        let (mut evo, now) = machine();
        evo.trigger(now);

        assert!(!evo.poll_swap(now));
        assert!(!evo.swap_in_flight());
        assert!(!evo.poll_swap(now + Duration::from_millis(2999)));
        assert!(evo.poll_swap(now + Duration::from_millis(3000)));
        assert!(evo.swap_in_flight());
        // Only dispatched once.
        assert!(!evo.poll_swap(now + Duration::from_millis(5000)));
    }

    #[test]
    fn evolved_only_after_completion() {
        let (mut evo, now) = machine();
        evo.trigger(now);
        evo.poll_swap(now + Duration::from_millis(3000));
        assert_eq!(evo.state(), EvolutionState::Evolving);

        evo.complete();
        assert_eq!(evo.state(), EvolutionState::Evolved);
        assert!(!evo.can_trigger());
    }

    #[test]
    fn failed_swap_reverts_to_idle_and_rearms() {
        let (mut evo, now) = machine();
        evo.trigger(now);
        evo.poll_swap(now + Duration::from_millis(3000));

        evo.fail();
        assert_eq!(evo.state(), EvolutionState::Idle);
        assert!(evo.can_trigger());

        // The second attempt runs the full delay again.
        let later = now + Duration::from_millis(10_000);
        assert!(evo.trigger(later));
        assert!(!evo.poll_swap(later + Duration::from_millis(100)));
        assert!(evo.poll_swap(later + Duration::from_millis(3000)));
    }

    #[test]
    fn poll_without_trigger_never_fires() {
        let (mut evo, now) = machine();
        assert!(!evo.poll_swap(now + Duration::from_secs(60)));
        assert_eq!(evo.state(), EvolutionState::Idle);
    }
}
