//! Geometry kernel for axis-aligned mesh splitting. Contains the [`mesh::Mesh`]
//! struct, the half-space clip primitive, and a BVH for nearest-surface queries.

use nalgebra::Vector3;

pub mod bounds;
pub mod builder;
pub mod bvh;
pub mod clip;
pub mod error;
pub mod mesh;
pub mod plane;
pub mod triangle;

pub type Pos = Vector3<f32>;
