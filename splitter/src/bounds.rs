use mesh_kernel::{bounds::BoundingBox, mesh::Mesh};

use crate::error::SliceError;

/// Combined world-space bounding box of a set of meshes: the component-wise
/// min and max over every transformed vertex of every mesh.
pub fn bounding_box(meshes: &[Mesh]) -> Result<BoundingBox, SliceError> {
    let mut bounds = BoundingBox::new();
    for mesh in meshes {
        bounds.expand_box(&mesh.bounds());
    }

    if bounds.is_empty() {
        return Err(SliceError::EmptyInput);
    }

    Ok(bounds)
}
