use mesh_kernel::mesh::Mesh;
use tracing::info;

use crate::{
    bounds::bounding_box,
    error::SliceError,
    normals::NormalSource,
    partition::partition,
    planes::{cut_planes, CutCounts},
};

/// One slicing run over a set of input meshes: bounding box, plane
/// generation, partitioning, and normal restoration, in that order.
pub struct SliceSession {
    meshes: Vec<Mesh>,
    cuts: CutCounts,
    preserve_normals: bool,
}

impl SliceSession {
    pub fn new(meshes: Vec<Mesh>, cuts: CutCounts, preserve_normals: bool) -> Self {
        Self {
            meshes,
            cuts,
            preserve_normals,
        }
    }

    /// Runs the pipeline, returning the final fragment pool in world space,
    /// grouped by input mesh in input order.
    ///
    /// Fails with [`SliceError::EmptyInput`] before doing any work when there
    /// is nothing to slice. A geometry failure aborts the whole session; no
    /// partial fragment set is ever returned.
    pub fn run(&self) -> Result<Vec<Mesh>, SliceError> {
        if self.meshes.is_empty() {
            return Err(SliceError::EmptyInput);
        }

        // Reject malformed inputs before any work, keeping failures atomic.
        for mesh in &self.meshes {
            mesh.validate()?;
        }

        // Snapshot every input surface before anything is cut.
        let sources = self.preserve_normals.then(|| {
            self.meshes
                .iter()
                .map(NormalSource::capture)
                .collect::<Vec<_>>()
        });

        let bounds = bounding_box(&self.meshes)?;

        if self.cuts.total() == 0 {
            info!("no cuts requested, returning the {} inputs unchanged", self.meshes.len());
            return Ok(self.meshes.clone());
        }

        let planes = cut_planes(&bounds, self.cuts);

        info!(
            "slicing {} meshes through {} planes ({}x, {}y, {}z)",
            self.meshes.len(),
            planes.len(),
            self.cuts.x,
            self.cuts.y,
            self.cuts.z
        );

        let fragments = partition(&self.meshes, &planes)?;
        info!("partition produced {} fragments", fragments.len());

        let fragments = match &sources {
            Some(sources) => fragments
                .iter()
                .map(|fragment| sources[fragment.source].restore(&fragment.mesh))
                .collect(),
            None => fragments.into_iter().map(|fragment| fragment.mesh).collect(),
        };

        Ok(fragments)
    }
}
