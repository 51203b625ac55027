//! Scene data structures: meshes, materials, transforms, bounds.
//!
//! - `model` contains mesh and material definitions plus the draw trait
//! - `node` is the loaded model hierarchy with per-node instance buffers
//! - `instance` holds the per-node transform and its GPU layout
//! - `bounds` is the axis-aligned bounding box used for recentering
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod bounds;
pub mod instance;
pub mod model;
pub mod node;
pub mod texture;
