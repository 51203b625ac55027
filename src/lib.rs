//! beanview
//!
//! A small cross-platform viewer for glTF binary models. One scene, one
//! camera, a couple of lights: models are loaded asynchronously into slots,
//! tilt toward the cursor, bob while idle and can be swapped out once by a
//! scripted "evolution" after a user click. The same code runs natively and
//! on the web (WASM, canvas-mounted surface).
//!
//! High-level modules
//! - `app`: the winit event loop and async load dispatch
//! - `animate`: the per-frame animation driver (bob, spin, decay)
//! - `camera`: camera, projection and view/projection uniform
//! - `config`: [`config::SceneConfig`], the one parameterized scene description
//! - `context`: central GPU and window context owning device/queue/pipeline
//! - `data_structures`: meshes, materials, instances, bounding boxes
//! - `evolve`: the idle/evolving/evolved model-swap state machine
//! - `input`: pointer normalization and tilt policies
//! - `pipelines`: render pipeline and light resources
//! - `resources`: glTF and texture loading for native and web
//! - `scene`: the scene session owning all loaded nodes
//!

pub mod animate;
pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod evolve;
pub mod input;
pub mod pipelines;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;
