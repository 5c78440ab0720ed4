use mesh_kernel::{
    clip::clip,
    error::GeometryError,
    mesh::Mesh,
    plane::{CutPlane, Side},
};
use rayon::prelude::*;
use tracing::debug;

/// A mesh piece descended from one input mesh through zero or more cuts.
/// Always in world space; the input's transform is baked in when seeding.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub mesh: Mesh,
    /// Index of the input mesh this fragment descends from, used to pick the
    /// right normal source after partitioning.
    pub source: usize,
}

/// The initial pool: one world-space fragment per input mesh.
pub fn seed(inputs: &[Mesh]) -> Vec<Fragment> {
    inputs
        .iter()
        .enumerate()
        .map(|(source, mesh)| Fragment {
            mesh: mesh.bake_transform(),
            source,
        })
        .collect()
}

/// Applies one plane to the whole pool. Fragments straddling the plane are
/// replaced by their two halves; anything collapsed to nothing is dropped, so
/// the pool only ever holds physically distinct pieces.
///
/// Fragments are clipped in parallel, but the pool order (and therefore the
/// final fragment order) stays deterministic.
pub fn apply_plane(pool: Vec<Fragment>, plane: &CutPlane) -> Result<Vec<Fragment>, GeometryError> {
    let split = pool
        .into_par_iter()
        .map(|fragment| {
            // A plane outside a fragment's own extent cannot split it. This
            // also skips the coincident case, where the whole fragment counts
            // as being on the positive side.
            let (min, max) = fragment.mesh.bounds().range(plane.axis);
            if plane.position <= min || plane.position >= max {
                return Ok(vec![fragment]);
            }

            let positive = clip(&fragment.mesh, plane, Side::Positive)?;
            let negative = clip(&fragment.mesh, plane, Side::Negative)?;

            Ok([positive, negative]
                .into_iter()
                .filter(|mesh| !mesh.is_empty())
                .map(|mesh| Fragment {
                    mesh,
                    source: fragment.source,
                })
                .collect())
        })
        .collect::<Result<Vec<Vec<Fragment>>, GeometryError>>()?;

    Ok(split.into_iter().flatten().collect())
}

/// Folds [`apply_plane`] over the full plane sequence, seeding the pool with
/// one fragment per input mesh.
pub fn partition(inputs: &[Mesh], planes: &[CutPlane]) -> Result<Vec<Fragment>, GeometryError> {
    let mut pool = seed(inputs);
    for plane in planes {
        pool = apply_plane(pool, plane)?;
        debug!("applied {plane}, pool holds {} fragments", pool.len());
    }
    Ok(pool)
}
