use std::sync::Arc;

use nalgebra::Matrix4;

use crate::{bounds::BoundingBox, error::GeometryError, Pos};

/// A triangle mesh with a shading normal per vertex. It can be scaled,
/// translated, and rotated; vertices are stored in model space and transformed
/// through the cached transformation matrix.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,

    transformation_matrix: Matrix4<f32>,
    // Inverse transpose of the linear part, so shading normals stay
    // perpendicular under non-uniform scale.
    normal_matrix: Matrix4<f32>,

    position: Pos,
    scale: Pos,
    rotation: Pos,
}

#[derive(Debug)]
struct MeshInner {
    vertices: Box<[Pos]>,
    normals: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
}

impl Mesh {
    /// Creates a new mesh from the given vertices, per-vertex normals, and
    /// faces. The transformations are all identity by default.
    pub fn new(vertices: Vec<Pos>, normals: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        debug_assert_eq!(vertices.len(), normals.len());
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                normals: normals.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
            }),
            ..Default::default()
        }
    }

    /// Creates a new mesh, deriving each vertex normal from the area-weighted
    /// average of the normals of the faces it appears in.
    pub fn with_computed_normals(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        let mut normals = vec![Pos::zeros(); vertices.len()];
        for face in faces.iter() {
            let [v0, v1, v2] = face.map(|i| vertices[i as usize]);
            // Unnormalized cross product, so larger faces contribute more.
            let normal = (v1 - v0).cross(&(v2 - v0));
            for &index in face {
                normals[index as usize] += normal;
            }
        }

        for normal in normals.iter_mut() {
            *normal = normal.try_normalize(f32::EPSILON).unwrap_or(Pos::zeros());
        }

        Self::new(vertices, normals, faces)
    }

    pub fn vertices(&self) -> &[Pos] {
        self.inner.vertices.as_ref()
    }

    pub fn normals(&self) -> &[Pos] {
        self.inner.normals.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.inner.faces.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    /// A mesh with no vertices is a terminal state, the output of a clip that
    /// did not intersect its input.
    pub fn is_empty(&self) -> bool {
        self.vertices().is_empty()
    }

    /// The world-space corners of the three vertices of a face.
    pub fn face_verts(&self, index: usize) -> [Pos; 3] {
        self.faces()[index].map(|i| self.transform(&self.vertices()[i as usize]))
    }

    /// The geometric (flat) normal of a face, in world space.
    pub fn face_normal(&self, index: usize) -> Pos {
        let [v0, v1, v2] = self.face_verts(index);
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }

    /// Checks that every face index refers to an existing vertex and that
    /// there is one normal per vertex.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertex_count = self.vertex_count();
        if self.normals().len() != vertex_count {
            return Err(GeometryError::NormalCountMismatch {
                normals: self.normals().len(),
                vertices: vertex_count,
            });
        }

        for (face, indices) in self.faces().iter().enumerate() {
            for &index in indices {
                if index as usize >= vertex_count {
                    return Err(GeometryError::FaceIndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }

        Ok(())
    }

    /// Updates the internal transformation matrix. This is called
    /// automatically by [`Mesh::set_position`], [`Mesh::set_scale`], and
    /// [`Mesh::set_rotation`].
    pub fn update_transformation_matrix(&mut self) {
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        let rotation =
            Matrix4::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z);
        let translation = Matrix4::new_translation(&self.position);

        self.transformation_matrix = translation * scale * rotation;

        // (S R)^-T = S^-1 R, since the rotation is orthogonal.
        let inverse_scale = Matrix4::new_nonuniform_scaling(&self.scale.map(|s| 1.0 / s));
        self.normal_matrix = inverse_scale * rotation;
    }

    /// Transforms a point according to the models translation, scale, and rotation.
    pub fn transform(&self, pos: &Pos) -> Pos {
        (self.transformation_matrix * pos.push(1.0)).xyz()
    }

    /// Transforms a shading normal into world space, returning a unit vector.
    /// Uses the inverse transpose of the linear part, so the result stays
    /// perpendicular to the surface under non-uniform scale.
    pub fn transform_normal(&self, normal: &Pos) -> Pos {
        (self.normal_matrix * normal.to_homogeneous())
            .xyz()
            .try_normalize(f32::EPSILON)
            .unwrap_or(Pos::zeros())
    }

    /// The world-space axis-aligned bounding box of the mesh.
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        for vertex in self.vertices() {
            bounds.expand_point(self.transform(vertex));
        }
        bounds
    }

    /// Applies the current transform to every vertex and normal, returning a
    /// world-space copy with an identity transform.
    pub fn bake_transform(&self) -> Mesh {
        let vertices = self
            .vertices()
            .iter()
            .map(|v| self.transform(v))
            .collect::<Vec<_>>();
        let normals = self
            .normals()
            .iter()
            .map(|n| self.transform_normal(n))
            .collect::<Vec<_>>();

        Mesh::new(vertices, normals, self.faces().to_vec())
    }

    /// Signed volume of the mesh in world space, computed as the sum of the
    /// signed volumes of the tetrahedra spanned by each face and the origin.
    /// Only meaningful for closed surfaces with outward-facing windings.
    pub fn volume(&self) -> f32 {
        (0..self.face_count())
            .map(|face| {
                let [v0, v1, v2] = self.face_verts(face);
                v0.dot(&v1.cross(&v2)) / 6.0
            })
            .sum()
    }
}

impl Mesh {
    /// Changes the position of the model, automatically updating the internal
    /// transformation matrix.
    pub fn set_position(&mut self, pos: Pos) {
        self.position = pos;
        self.update_transformation_matrix();
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    /// Changes the current scale of the model, automatically updating the
    /// internal transformation matrix.
    pub fn set_scale(&mut self, scale: Pos) {
        self.scale = scale;
        self.update_transformation_matrix();
    }

    pub fn scale(&self) -> Pos {
        self.scale
    }

    /// Changes the current rotation of the model, using [Euler
    /// angles](https://en.wikipedia.org/wiki/Euler_angles). The internal
    /// transformation matrix is automatically updated.
    pub fn set_rotation(&mut self, rotation: Pos) {
        self.rotation = rotation;
        self.update_transformation_matrix();
    }

    pub fn rotation(&self) -> Pos {
        self.rotation
    }

    /// Gets the current transformation matrix of the model.
    pub fn transformation_matrix(&self) -> &Matrix4<f32> {
        &self.transformation_matrix
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            inner: Arc::new(MeshInner {
                vertices: Box::new([]),
                normals: Box::new([]),
                faces: Box::new([]),
            }),

            transformation_matrix: Matrix4::identity(),
            normal_matrix: Matrix4::identity(),

            position: Pos::repeat(0.0),
            scale: Pos::repeat(1.0),
            rotation: Pos::repeat(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::builder::MeshBuilder;
    use crate::error::GeometryError;
    use crate::mesh::Mesh;

    #[test]
    fn unit_cube_volume() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Vector3::zeros(), Vector3::repeat(1.0));
        let mesh = builder.build();

        assert!((mesh.volume() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scaled_cube_volume_and_bounds() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Vector3::zeros(), Vector3::repeat(1.0));
        let mut mesh = builder.build();
        mesh.set_scale(Vector3::new(2.0, 1.0, 3.0));
        mesh.set_position(Vector3::new(1.0, 0.0, 0.0));

        assert!((mesh.volume() - 6.0).abs() < 1e-4);

        let bounds = mesh.bounds();
        assert!((bounds.min - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((bounds.max - Vector3::new(3.0, 1.0, 3.0)).norm() < 1e-6);
    }

    #[test]
    fn validate_rejects_out_of_range_face() {
        let vertices = vec![Vector3::zeros(), Vector3::x(), Vector3::y()];
        let normals = vec![Vector3::z(); 3];
        let mesh = Mesh::new(vertices, normals, vec![[0, 1, 7]]);

        assert_eq!(
            mesh.validate(),
            Err(GeometryError::FaceIndexOutOfRange {
                face: 0,
                index: 7,
                vertex_count: 3,
            })
        );
    }

    #[test]
    fn normals_stay_perpendicular_under_nonuniform_scale() {
        // A tilted triangle whose shading normal matches its flat normal.
        // After scaling, the transformed shading normal must still agree with
        // the geometric normal of the scaled face.
        let vertices = vec![
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let normal = Vector3::new(1.0, 0.0, 1.0).normalize();
        let mut mesh = Mesh::new(vertices, vec![normal; 3], vec![[0, 1, 2]]);
        assert!((mesh.face_normal(0) - normal).norm() < 1e-6);

        mesh.set_scale(Vector3::new(2.0, 1.0, 1.0));

        let transformed = mesh.transform_normal(&normal);
        assert!((transformed.norm() - 1.0).abs() < 1e-6);
        assert!((transformed - mesh.face_normal(0)).norm() < 1e-6);
    }

    #[test]
    fn computed_normals_point_outward() {
        let mut builder = MeshBuilder::new();
        builder.add_box(Vector3::zeros(), Vector3::repeat(1.0));
        let flat = builder.build();

        let smooth =
            Mesh::with_computed_normals(flat.vertices().to_vec(), flat.faces().to_vec());
        for (vertex, normal) in smooth.vertices().iter().zip(smooth.normals()) {
            // Every normal of a box centered at (0.5, 0.5, 0.5) should point
            // away from the center.
            let outward = vertex - Vector3::repeat(0.5);
            assert!(normal.dot(&outward) > 0.0);
        }
    }
}
