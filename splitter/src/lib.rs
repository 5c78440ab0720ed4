//! Splits sets of meshes into contiguous fragments by cutting them with
//! axis-aligned planes positioned to divide their shared bounding box into
//! evenly spaced slabs, pruning the empty pieces, and optionally restoring
//! each fragment's original shading normals.

pub mod bounds;
pub mod error;
pub mod normals;
pub mod partition;
pub mod planes;
pub mod session;

pub use mesh_kernel::Pos;
