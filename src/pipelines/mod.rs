//! Render pipeline definitions and light resources.

pub mod basic;
pub mod light;
