//! Core math types: Transform, Camera, glam re-exports.

pub use glam::{Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod transform;
