use ordered_float::OrderedFloat;

use crate::{
    bounds::BoundingBox,
    mesh::Mesh,
    triangle::{barycentric, closest_point},
    Pos,
};

/// Bounding-volume hierarchy over the world-space triangles of a mesh. The
/// source geometry is snapshotted at build time, so later changes to the mesh
/// (or clips derived from it) never affect query results.
pub struct Bvh {
    points: Vec<Pos>,
    normals: Vec<Pos>,
    faces: Vec<[u32; 3]>,
    root: Option<BvhNode>,
}

pub enum BvhNode {
    Leaf {
        face_idx: usize,
        bounds: BoundingBox,
    },
    Node {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: BoundingBox,
    },
}

/// Result of a nearest-point-on-surface query.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub position: Pos,
    pub normal: Pos,
    pub distance: f32,
}

impl Bvh {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        // Caching transformed points makes queries faster and keeps every
        // distance computation in world space.
        let points = mesh
            .vertices()
            .iter()
            .map(|x| mesh.transform(x))
            .collect::<Vec<_>>();
        let normals = mesh
            .normals()
            .iter()
            .map(|x| mesh.transform_normal(x))
            .collect::<Vec<_>>();
        let faces = mesh.faces().to_vec();

        if faces.is_empty() {
            return Self {
                points,
                normals,
                faces,
                root: None,
            };
        }

        let face_indices = (0..faces.len()).collect::<Vec<_>>();
        let root = build_bvh_node(&points, &faces, face_indices);

        Self {
            points,
            normals,
            faces,
            root: Some(root),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Finds the point on the surface closest to `point`, along with the
    /// shading normal interpolated at that point and the distance to it.
    pub fn nearest(&self, point: Pos) -> Option<SurfaceHit> {
        let root = self.root.as_ref()?;

        let mut best: Option<(f32, usize, Pos)> = None;
        root.nearest(self, point, &mut best);

        best.map(|(distance_squared, face_idx, position)| {
            let face = self.faces[face_idx];
            let [v0, v1, v2] = face.map(|i| self.points[i as usize]);
            let [u, v, w] = barycentric(v0, v1, v2, position);

            let normal = u * self.normals[face[0] as usize]
                + v * self.normals[face[1] as usize]
                + w * self.normals[face[2] as usize];
            // Fall back to the flat normal if the shading normals cancel out.
            let normal = normal
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| (v1 - v0).cross(&(v2 - v0)).normalize());

            SurfaceHit {
                position,
                normal,
                distance: distance_squared.sqrt(),
            }
        })
    }

    fn face_points(&self, face_idx: usize) -> [Pos; 3] {
        self.faces[face_idx].map(|i| self.points[i as usize])
    }
}

fn build_bvh_node(points: &[Pos], faces: &[[u32; 3]], mut face_indices: Vec<usize>) -> BvhNode {
    let mut bounds = BoundingBox::new();
    for &face in face_indices.iter() {
        for index in faces[face] {
            bounds.expand_point(points[index as usize]);
        }
    }

    if face_indices.len() == 1 {
        return BvhNode::Leaf {
            face_idx: face_indices[0],
            bounds,
        };
    }

    let longest_axis = bounds.longest_axis();
    face_indices.sort_by_cached_key(|&face| {
        let mut bounds = BoundingBox::new();
        for index in faces[face] {
            bounds.expand_point(points[index as usize]);
        }
        OrderedFloat(bounds.center()[longest_axis])
    });

    let (left_indices, right_indices) = face_indices.split_at(face_indices.len() / 2);

    let left = build_bvh_node(points, faces, left_indices.to_vec());
    let right = build_bvh_node(points, faces, right_indices.to_vec());

    BvhNode::Node {
        left: Box::new(left),
        right: Box::new(right),
        bounds,
    }
}

impl BvhNode {
    fn bounds(&self) -> &BoundingBox {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Node { bounds, .. } => bounds,
        }
    }

    fn nearest(&self, bvh: &Bvh, point: Pos, best: &mut Option<(f32, usize, Pos)>) {
        if let Some((best_distance, _, _)) = best {
            if self.bounds().distance_squared(point) >= *best_distance {
                return;
            }
        }

        match self {
            BvhNode::Leaf { face_idx, .. } => {
                let [v0, v1, v2] = bvh.face_points(*face_idx);
                let candidate = closest_point(v0, v1, v2, point);
                let distance = (candidate - point).norm_squared();

                if best.map(|(d, _, _)| distance < d).unwrap_or(true) {
                    *best = Some((distance, *face_idx, candidate));
                }
            }
            BvhNode::Node { left, right, .. } => {
                // Descend into the closer child first so the other one can
                // often be pruned entirely.
                let (near, far) = if left.bounds().distance_squared(point)
                    <= right.bounds().distance_squared(point)
                {
                    (left, right)
                } else {
                    (right, left)
                };

                near.nearest(bvh, point, best);
                far.nearest(bvh, point, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::Bvh;
    use crate::{builder::MeshBuilder, mesh::Mesh};

    /// Two triangles forming the unit square in the z = 0 plane, normals +z.
    fn quad_sheet() -> Mesh {
        let mut builder = MeshBuilder::new();
        let quad = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
        .map(|corner| builder.add_vertex(corner, Vector3::z()));
        builder.add_quad(quad);
        builder.build()
    }

    #[test]
    fn nearest_on_surface_has_zero_distance() {
        let bvh = Bvh::from_mesh(&quad_sheet());

        let hit = bvh.nearest(Vector3::new(0.25, 0.25, 0.0)).unwrap();
        assert!(hit.distance < 1e-6);
        assert!((hit.normal - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn nearest_projects_onto_surface() {
        let bvh = Bvh::from_mesh(&quad_sheet());

        let hit = bvh.nearest(Vector3::new(0.5, 0.5, 2.0)).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert!((hit.position - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn nearest_clamps_outside_the_sheet() {
        let bvh = Bvh::from_mesh(&quad_sheet());

        let hit = bvh.nearest(Vector3::new(2.0, 0.5, 0.0)).unwrap();
        assert!((hit.position - Vector3::new(1.0, 0.5, 0.0)).norm() < 1e-6);
        assert!((hit.distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transforms_are_baked_at_build_time() {
        let mut mesh = quad_sheet();
        mesh.set_position(Vector3::new(0.0, 0.0, 5.0));
        let bvh = Bvh::from_mesh(&mesh);

        let hit = bvh.nearest(Vector3::new(0.5, 0.5, 5.0)).unwrap();
        assert!(hit.distance < 1e-6);
    }

    #[test]
    fn empty_mesh_has_no_surface() {
        let bvh = Bvh::from_mesh(&Mesh::default());
        assert!(bvh.is_empty());
        assert!(bvh.nearest(Vector3::zeros()).is_none());
    }
}
