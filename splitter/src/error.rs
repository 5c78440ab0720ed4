use mesh_kernel::error::GeometryError;
use thiserror::Error;

/// Failures of a slicing session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceError {
    /// No input meshes, or none of them contributed any vertices. Raised
    /// before any work is done.
    #[error("no input meshes with vertices to slice")]
    EmptyInput,

    /// A geometry primitive failed. The session is aborted as a whole and no
    /// partial fragment set is returned.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
