use mesh_kernel::{bvh::Bvh, mesh::Mesh};

/// Distance below which a fragment vertex is considered to lie on the
/// original surface and has its shading normal restored.
pub const COINCIDENCE_EPSILON: f32 = 1e-4;

/// Frozen snapshot of an input mesh's surface, captured before any cutting.
/// Used to transfer the original shading normals back onto the fragments the
/// mesh was cut into; fragments from other inputs must use their own source.
pub struct NormalSource {
    surface: Bvh,
}

impl NormalSource {
    pub fn capture(mesh: &Mesh) -> Self {
        Self {
            surface: Bvh::from_mesh(mesh),
        }
    }

    /// Reassigns the shading normal of every fragment vertex that lies on the
    /// captured surface to the normal interpolated at its nearest surface
    /// point. Vertices synthesized away from the original surface (cut caps)
    /// keep their clip-time normals.
    pub fn restore(&self, fragment: &Mesh) -> Mesh {
        if self.surface.is_empty() || fragment.is_empty() {
            return fragment.clone();
        }

        let baked = fragment.bake_transform();
        let normals = baked
            .vertices()
            .iter()
            .zip(baked.normals())
            .map(|(vertex, normal)| match self.surface.nearest(*vertex) {
                Some(hit) if hit.distance <= COINCIDENCE_EPSILON => hit.normal,
                _ => *normal,
            })
            .collect::<Vec<_>>();

        Mesh::new(baked.vertices().to_vec(), normals, baked.faces().to_vec())
    }
}
