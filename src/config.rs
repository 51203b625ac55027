//! Scene configuration.
//!
//! One parameterized description covers every scene variant: which models
//! to load into which slots, how the pointer drives them, whether they bob
//! while idle, and whether a slot can evolve into a replacement model.

use cgmath::Vector3;
use instant::Duration;

use crate::{
    animate::IdleMotion,
    evolve::DEFAULT_SWAP_DELAY,
    input::PointerMode,
};

/// One model slot: the asset to load and where to place it.
#[derive(Clone, Debug)]
pub struct SlotConfig {
    /// Asset file name, resolved against `assets/` (native) or
    /// `<origin>/assets/` (web).
    pub model: String,
    /// Initial world-space offset of the slot.
    pub offset: Vector3<f32>,
}

impl SlotConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn with_offset(mut self, offset: Vector3<f32>) -> Self {
        self.offset = offset;
        self
    }
}

/// The scripted one-shot model swap.
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    /// Which slot evolves.
    pub slot: usize,
    /// The asset that replaces the slot's model.
    pub replacement: String,
    /// Wait between the trigger and the swap.
    pub delay: Duration,
}

impl EvolutionConfig {
    pub fn new(slot: usize, replacement: impl Into<String>) -> Self {
        Self {
            slot,
            replacement: replacement.into(),
            delay: DEFAULT_SWAP_DELAY,
        }
    }
}

/// Everything the viewer needs to know about the scene.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub slots: Vec<SlotConfig>,
    pub pointer: PointerMode,
    pub idle: IdleMotion,
    pub evolution: Option<EvolutionConfig>,
    pub clear_colour: wgpu::Color,
}

impl SceneConfig {
    /// The near-black background the viewer ships with.
    pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
        r: 0.102,
        g: 0.102,
        b: 0.102,
        a: 1.0,
    };

    /// The classic single-bean scene: one model, direct tilt, idle bob.
    pub fn bean() -> Self {
        Self {
            slots: vec![SlotConfig::new("bean3.glb")],
            pointer: PointerMode::DirectTilt,
            idle: IdleMotion::Bob,
            evolution: None,
            clear_colour: Self::CLEAR_COLOUR,
        }
    }

    /// The evolving variant: a click swaps the bean for its evolved form
    /// after the configured delay.
    pub fn evolving_bean() -> Self {
        Self {
            evolution: Some(EvolutionConfig::new(0, "bean4.glb")),
            ..Self::bean()
        }
    }

    /// Two beans side by side, easing after the pointer. One tracker drives
    /// every slot, so the pair moves in sync.
    pub fn bean_duo() -> Self {
        Self {
            slots: vec![
                SlotConfig::new("bean3.glb").with_offset(Vector3::new(-1.5, 0.0, 0.0)),
                SlotConfig::new("bean4.glb").with_offset(Vector3::new(1.5, 0.0, 0.0)),
            ],
            pointer: PointerMode::SmoothedFollow,
            idle: IdleMotion::Bob,
            evolution: None,
            clear_colour: Self::CLEAR_COLOUR,
        }
    }

    pub fn with_pointer(mut self, pointer: PointerMode) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_idle(mut self, idle: IdleMotion) -> Self {
        self.idle = idle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolving_preset_targets_an_existing_slot() {
        let config = SceneConfig::evolving_bean();
        let evolution = config.evolution.expect("preset has an evolution");
        assert!(evolution.slot < config.slots.len());
        assert_eq!(evolution.delay, Duration::from_millis(3000));
    }

    #[test]
    fn duo_preset_fills_two_slots_with_distinct_offsets() {
        let config = SceneConfig::bean_duo();
        assert_eq!(config.slots.len(), 2);
        assert_ne!(config.slots[0].offset, config.slots[1].offset);
        assert_eq!(config.pointer, PointerMode::SmoothedFollow);
        assert!(config.evolution.is_none());
    }

    #[test]
    fn builders_override_policies() {
        let config = SceneConfig::bean()
            .with_pointer(PointerMode::SmoothedFollow)
            .with_idle(IdleMotion::Still);
        assert_eq!(config.pointer, PointerMode::SmoothedFollow);
        assert_eq!(config.idle, IdleMotion::Still);
    }
}
