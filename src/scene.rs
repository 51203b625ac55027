//! The scene session: slot state, per-frame composition and rendering.
//!
//! A [`SceneSession`] owns everything a running scene consists of (GPU
//! context, loaded models, pointer tracker, animation driver, evolution
//! machine), so dropping the session tears the whole scene down at once.
//! Async work never borrows into the session: loads are described by
//! [`Command`]s the caller dispatches, and their results come back through
//! [`SceneSession::attach`]/[`SceneSession::load_failed`] stamped with the
//! generation they were issued under.

use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use instant::Instant;

use crate::{
    animate::AnimationDriver,
    config::SceneConfig,
    context::Context,
    data_structures::{instance::Instance, node::LoadedModel},
    evolve::{Evolution, EvolutionState},
    input::{self, PointerTracker},
};

/// Asynchronous work the session wants done. The caller (the application
/// handler) owns the executor; the session only describes the work.
#[derive(Clone, Debug)]
pub enum Command {
    Load {
        slot: usize,
        path: String,
        generation: u64,
        request: u64,
    },
}

/// Bookkeeping for in-flight loads. Every dispatched load gets a request
/// id; a finished load may only touch the scene if it is the most recent
/// request for its slot and its generation is still current. This keeps a
/// slow startup load from being mistaken for the evolution replacement
/// dispatched for the same slot in the meantime. Free of GPU types so the
/// acceptance rules test headless.
#[derive(Debug)]
pub struct PendingLoads {
    generation: u64,
    next_request: u64,
    pending: Vec<Option<u64>>,
}

impl PendingLoads {
    pub fn new(slot_count: usize, generation: u64) -> Self {
        Self {
            generation,
            next_request: 0,
            pending: vec![None; slot_count],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issues the request id for a new load of `slot`, superseding any load
    /// still in flight for it.
    pub fn begin(&mut self, slot: usize) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        if let Some(pending) = self.pending.get_mut(slot) {
            *pending = Some(request);
        }
        request
    }

    /// Whether a finished load may mutate the scene. Accepts each request
    /// at most once; superseded requests and stale generations are
    /// rejected.
    pub fn accept(&mut self, slot: usize, generation: u64, request: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.pending.get_mut(slot) {
            Some(pending) if *pending == Some(request) => {
                *pending = None;
                true
            }
            _ => false,
        }
    }
}

/// One model slot at runtime.
struct Slot {
    /// World-space offset from the scene config.
    offset: Vector3<f32>,
    /// Centre of the loaded model's bounding box; subtracted from the
    /// position so the model orbits its own middle.
    center: Vector3<f32>,
    model: Option<LoadedModel>,
}

pub struct SceneSession {
    pub ctx: Context,
    config: SceneConfig,
    slots: Vec<Slot>,
    tracker: PointerTracker,
    driver: AnimationDriver,
    evolution: Option<Evolution>,
    /// Accumulated yaw from the evolution spin, kept on the session so a
    /// swapped-in model inherits the rotation of the one it replaces.
    spin_yaw: f32,
    loads: PendingLoads,
}

impl SceneSession {
    pub fn new(ctx: Context, config: SceneConfig, generation: u64) -> Self {
        let slots = config
            .slots
            .iter()
            .map(|slot| Slot {
                offset: slot.offset,
                center: Vector3::new(0.0, 0.0, 0.0),
                model: None,
            })
            .collect();
        let tracker = PointerTracker::new(config.pointer);
        let driver = AnimationDriver::new(config.idle);
        let evolution = config
            .evolution
            .as_ref()
            .map(|evolution| Evolution::new(evolution.delay));
        let loads = PendingLoads::new(config.slots.len(), generation);

        Self {
            ctx,
            config,
            slots,
            tracker,
            driver,
            evolution,
            spin_yaw: 0.0,
            loads,
        }
    }

    pub fn generation(&self) -> u64 {
        self.loads.generation()
    }

    /// The initial loads for every configured slot.
    pub fn startup_commands(&mut self) -> Vec<Command> {
        let generation = self.loads.generation();
        (0..self.config.slots.len())
            .map(|slot| Command::Load {
                slot,
                path: self.config.slots[slot].model.clone(),
                generation,
                request: self.loads.begin(slot),
            })
            .collect()
    }

    /// Feeds a raw cursor position (in surface pixels) into the tracker.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let (nx, ny) = input::normalized(x, y, self.ctx.config.width, self.ctx.config.height);
        self.tracker.pointer_moved(nx, ny);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// User trigger for the one-shot swap. A no-op when the scene has no
    /// evolution or it already ran.
    pub fn trigger_evolution(&mut self, now: Instant) {
        if let Some(evolution) = &mut self.evolution {
            if evolution.trigger(now) {
                log::info!("evolution triggered");
            }
        }
    }

    /// A model finished loading. Results from a previous session (stale
    /// generation) or superseded by a newer load of the same slot are
    /// dropped.
    pub fn attach(&mut self, slot: usize, generation: u64, request: u64, model: LoadedModel) {
        if !self.loads.accept(slot, generation, request) {
            log::debug!("dropping stale model for slot {}", slot);
            return;
        }
        let Some(target) = self.slots.get_mut(slot) else {
            log::warn!("model loaded for unknown slot {}", slot);
            return;
        };

        target.center = model.bounds.center();
        target.model = Some(model);

        if let Some(evolution) = &mut self.evolution {
            if self.config.evolution.as_ref().map(|e| e.slot) == Some(slot)
                && evolution.swap_in_flight()
            {
                evolution.complete();
                log::info!("evolution complete");
            }
        }
    }

    /// A model load failed. The slot stays (or becomes) empty; a failed
    /// evolution swap reverts the machine so the trigger works again.
    pub fn load_failed(&mut self, slot: usize, generation: u64, request: u64, error: &anyhow::Error) {
        if !self.loads.accept(slot, generation, request) {
            return;
        }
        log::error!("failed to load model for slot {}: {:#}", slot, error);

        if let Some(evolution) = &mut self.evolution {
            if self.config.evolution.as_ref().map(|e| e.slot) == Some(slot)
                && evolution.swap_in_flight()
            {
                evolution.fail();
                log::warn!("evolution reverted, trigger re-enabled");
            }
        }
    }

    /// Advances one frame: animation, evolution polling and the slot
    /// transforms. Returns the loads to dispatch this frame.
    pub fn frame(&mut self, now: Instant) -> Vec<Command> {
        let state = self
            .evolution
            .as_ref()
            .map_or(EvolutionState::Idle, |evolution| evolution.state());
        let motion = self.driver.advance(state);
        self.spin_yaw += motion.spin_delta;

        let mut commands = Vec::new();
        if let (Some(evolution), Some(config)) = (&mut self.evolution, &self.config.evolution) {
            if evolution.poll_swap(now) {
                // The old model leaves the scene while the replacement
                // loads; the slot transform carries over.
                if let Some(slot) = self.slots.get_mut(config.slot) {
                    slot.model = None;
                }
                commands.push(Command::Load {
                    slot: config.slot,
                    path: config.replacement.clone(),
                    generation: self.loads.generation(),
                    request: self.loads.begin(config.slot),
                });
            }
        }

        let tilt = self.tracker.tilt();
        let rotation = Quaternion::from_angle_y(Rad(tilt.yaw + self.spin_yaw))
            * Quaternion::from_angle_x(Rad(tilt.pitch));
        for slot in &mut self.slots {
            if let Some(model) = &mut slot.model {
                let base = Instance {
                    position: slot.offset - slot.center
                        + Vector3::unit_y() * motion.bob_y
                        + self.tracker.offset(),
                    rotation,
                    scale: Vector3::new(1.0, 1.0, 1.0),
                };
                model.root.update_world(&base);
                model.root.write_to_buffers(&self.ctx.queue);
            }
        }

        commands
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();
        if !self.ctx.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.ctx.pipeline);
            for slot in &self.slots {
                if let Some(model) = &slot.model {
                    model.root.draw(
                        &model.materials,
                        &self.ctx.camera.bind_group,
                        &self.ctx.light.bind_group,
                        &mut render_pass,
                    );
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant::Duration;

    #[test]
    fn stale_generation_is_rejected() {
        let mut loads = PendingLoads::new(1, 1);
        let request = loads.begin(0);

        // A completion stamped with the previous session's generation must
        // not touch anything.
        assert!(!loads.accept(0, 0, request));
        // The current generation still gets through.
        assert!(loads.accept(0, 1, request));
    }

    #[test]
    fn each_request_is_accepted_at_most_once() {
        let mut loads = PendingLoads::new(2, 0);
        let request = loads.begin(1);
        assert!(loads.accept(1, 0, request));
        assert!(!loads.accept(1, 0, request));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let mut loads = PendingLoads::new(1, 0);
        assert!(!loads.accept(5, 0, 0));
    }

    #[test]
    fn slow_startup_load_cannot_stand_in_for_the_replacement() {
        // The startup load of a slot is still in flight when the evolution
        // swap dispatches a replacement for the same slot. Whichever order
        // the two arrive in, only the replacement may attach and finish the
        // machine.
        let mut loads = PendingLoads::new(1, 0);
        let mut evolution = Evolution::new(Duration::from_millis(3000));
        let start = Instant::now();

        let startup = loads.begin(0);
        evolution.trigger(start);
        assert!(evolution.poll_swap(start + Duration::from_millis(3000)));
        let replacement = loads.begin(0);

        // The startup model arrives late: superseded, machine untouched.
        assert!(!loads.accept(0, 0, startup));
        assert!(evolution.swap_in_flight());
        assert_eq!(evolution.state(), EvolutionState::Evolving);

        // The replacement arrives: accepted, terminal state reached.
        assert!(loads.accept(0, 0, replacement));
        evolution.complete();
        assert_eq!(evolution.state(), EvolutionState::Evolved);

        // And nothing left in flight that could attach afterwards.
        assert!(!loads.accept(0, 0, startup));
    }

    #[test]
    fn startup_arriving_after_the_evolved_model_is_dropped() {
        let mut loads = PendingLoads::new(1, 0);
        let startup = loads.begin(0);
        let replacement = loads.begin(0);

        assert!(loads.accept(0, 0, replacement));
        // The pre-swap model must not clobber the evolved one.
        assert!(!loads.accept(0, 0, startup));
    }
}
