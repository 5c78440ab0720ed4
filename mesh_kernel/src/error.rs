use thiserror::Error;

/// Failures of the geometry primitives. These abort the operation that hit
/// them; callers are expected to propagate rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("mesh has {normals} normals for {vertices} vertices")]
    NormalCountMismatch { normals: usize, vertices: usize },
}
