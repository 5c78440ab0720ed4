use std::collections::HashMap;

use ordered_float::OrderedFloat;
use tracing::warn;

use crate::{
    builder::MeshBuilder,
    error::GeometryError,
    mesh::Mesh,
    plane::{CutPlane, Side},
    Pos,
};

/// Vertices closer to the plane than this are treated as lying on it.
pub const PLANE_EPSILON: f32 = 1e-6;

/// Clips a mesh against an axis-aligned plane, keeping the geometry on one
/// side and capping the cut cross-section so a closed input stays closed.
///
/// Faces that straddle the plane are split, with new vertices (and
/// interpolated shading normals) synthesized along the crossing edges. Faces
/// that lie exactly in the plane always go to the positive side, making the
/// two complementary clips of one mesh disjoint and deterministic. The output
/// is in world space with an identity transform.
///
/// Cap cross-sections are fan-triangulated, which is exact for convex
/// outlines; a cut outline that does not close (non-manifold input) is left
/// uncapped with a warning.
pub fn clip(mesh: &Mesh, plane: &CutPlane, side: Side) -> Result<Mesh, GeometryError> {
    mesh.validate()?;
    if mesh.is_empty() {
        return Ok(Mesh::default());
    }

    let points = mesh
        .vertices()
        .iter()
        .map(|v| mesh.transform(v))
        .collect::<Vec<_>>();
    let normals = mesh
        .normals()
        .iter()
        .map(|n| mesh.transform_normal(n))
        .collect::<Vec<_>>();

    // Distances toward the kept half-space, positive meaning "keep".
    let sign = side.sign();
    let distances = points
        .iter()
        .map(|p| sign * plane.signed_distance(p))
        .collect::<Vec<_>>();
    let classes = distances.iter().map(|&d| classify(d)).collect::<Vec<_>>();

    let mut output = ClipBuilder::new(&points, &normals);
    let mut coplanar_faces = 0_usize;

    for face in mesh.faces() {
        let cls = face.map(|i| classes[i as usize]);

        // Ties go to the positive side, never to both.
        if cls.iter().all(|&c| c == 0) {
            coplanar_faces += 1;
            if side == Side::Positive {
                output.keep_face(*face, cls);
            }
            continue;
        }

        if cls.iter().all(|&c| c >= 0) {
            output.keep_face(*face, cls);
        } else if cls.iter().all(|&c| c <= 0) {
            // Entirely on the discarded side.
        } else {
            output.split_face(*face, cls, &distances);
        }
    }

    if coplanar_faces > 0 {
        warn!("{coplanar_faces} faces lie exactly in the plane {plane}; kept on the positive side");
    }

    output.cap(plane, side);
    Ok(output.build())
}

fn classify(distance: f32) -> i8 {
    if distance > PLANE_EPSILON {
        1
    } else if distance < -PLANE_EPSILON {
        -1
    } else {
        0
    }
}

/// Accumulates the kept side of a clip: surviving faces, split faces, and the
/// cut outline that gets capped at the end.
struct ClipBuilder<'a> {
    points: &'a [Pos],
    normals: &'a [Pos],

    builder: MeshBuilder,
    // Maps input vertex index -> output vertex index.
    vertex_map: HashMap<u32, u32>,

    // Cut outline points, welded by position so segments from neighboring
    // faces connect into loops.
    weld_map: HashMap<[OrderedFloat<f32>; 3], u32>,
    weld_points: Vec<Pos>,
    segments: Vec<(u32, u32)>,
}

impl<'a> ClipBuilder<'a> {
    fn new(points: &'a [Pos], normals: &'a [Pos]) -> Self {
        Self {
            points,
            normals,
            builder: MeshBuilder::new(),
            vertex_map: HashMap::new(),
            weld_map: HashMap::new(),
            weld_points: Vec::new(),
            segments: Vec::new(),
        }
    }

    fn map_vertex(&mut self, original: u32) -> u32 {
        if let Some(&index) = self.vertex_map.get(&original) {
            return index;
        }

        let index = self.builder.add_vertex(
            self.points[original as usize],
            self.normals[original as usize],
        );
        self.vertex_map.insert(original, index);
        index
    }

    fn weld(&mut self, point: Pos) -> u32 {
        let key = [
            OrderedFloat(point.x),
            OrderedFloat(point.y),
            OrderedFloat(point.z),
        ];
        if let Some(&id) = self.weld_map.get(&key) {
            return id;
        }

        let id = self.weld_points.len() as u32;
        self.weld_points.push(point);
        self.weld_map.insert(key, id);
        id
    }

    fn push_segment(&mut self, a: u32, b: u32) {
        if a != b {
            self.segments.push((a, b));
        }
    }

    /// Copies a face that survives the clip whole. A face touching the plane
    /// along an edge still contributes that edge to the cut outline, and a
    /// face lying in the plane contributes all three, so that the outline
    /// around kept in-plane geometry cancels instead of growing a cap.
    fn keep_face(&mut self, face: [u32; 3], classes: [i8; 3]) {
        let mapped = face.map(|i| self.map_vertex(i));
        self.builder.add_face(mapped);

        let on_plane = (0..3).filter(|&i| classes[i] == 0).collect::<Vec<_>>();
        match on_plane[..] {
            [i, j] => {
                let a = self.weld(self.points[face[i] as usize]);
                let b = self.weld(self.points[face[j] as usize]);
                self.push_segment(a, b);
            }
            [_, _, _] => {
                for i in 0..3 {
                    let a = self.weld(self.points[face[i] as usize]);
                    let b = self.weld(self.points[face[(i + 1) % 3] as usize]);
                    self.push_segment(a, b);
                }
            }
            _ => {}
        }
    }

    /// Splits a straddling face, keeping the sub-polygon on the positive
    /// (kept) side and recording the chord across the face for the cap.
    fn split_face(&mut self, face: [u32; 3], classes: [i8; 3], distances: &[f32]) {
        let mut polygon = Vec::with_capacity(4);
        let mut outline = Vec::with_capacity(2);

        for i in 0..3 {
            let j = (i + 1) % 3;
            let (vi, vj) = (face[i], face[j]);
            let (ci, cj) = (classes[i], classes[j]);

            if ci >= 0 {
                polygon.push(self.map_vertex(vi));
                if ci == 0 {
                    outline.push(self.weld(self.points[vi as usize]));
                }
            }

            if (ci > 0 && cj < 0) || (ci < 0 && cj > 0) {
                let (di, dj) = (distances[vi as usize], distances[vj as usize]);
                let t = di / (di - dj);

                let (p0, p1) = (self.points[vi as usize], self.points[vj as usize]);
                let (n0, n1) = (self.normals[vi as usize], self.normals[vj as usize]);
                let position = p0 + t * (p1 - p0);
                let normal = (n0 + t * (n1 - n0))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or(n0);

                polygon.push(self.builder.add_vertex(position, normal));
                outline.push(self.weld(position));
            }
        }

        // Walking the edges in winding order keeps the sub-polygon's winding.
        for i in 1..polygon.len().saturating_sub(1) {
            let tri = [polygon[0], polygon[i], polygon[i + 1]];
            if tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0] {
                self.builder.add_face(tri);
            }
        }

        if let [a, b] = outline[..] {
            self.push_segment(a, b);
        }
    }

    /// Closes the cut cross-section: chains the recorded segments into loops
    /// and fan-triangulates each one, facing away from the kept half-space.
    fn cap(&mut self, plane: &CutPlane, side: Side) {
        if self.segments.is_empty() {
            return;
        }

        // Edges interior to the kept surface (shared by two kept faces, or
        // covered by a face lying in the plane) show up more than once. Only
        // edges seen exactly once bound an open cross-section.
        let mut edge_counts = HashMap::new();
        for &(a, b) in self.segments.iter() {
            *edge_counts.entry((a.min(b), a.max(b))).or_insert(0u32) += 1;
        }
        let segments = self
            .segments
            .iter()
            .copied()
            .filter(|&(a, b)| edge_counts[&(a.min(b), a.max(b))] == 1)
            .collect::<Vec<_>>();
        if segments.is_empty() {
            return;
        }

        let mut adjacency = vec![Vec::new(); self.weld_points.len()];
        for &(a, b) in segments.iter() {
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }

        let mut visited = vec![false; self.weld_points.len()];
        for start in 0..self.weld_points.len() {
            if visited[start] || adjacency[start].is_empty() {
                continue;
            }

            // A cross-section of a closed surface gives every outline point
            // exactly two neighbors; anything else means the outline is open.
            if adjacency[start].len() != 2 {
                visited[start] = true;
                warn!("cut outline does not close at {plane}; cross-section left uncapped");
                continue;
            }

            let mut loop_ids = vec![start as u32];
            visited[start] = true;

            let mut prev = start as u32;
            let mut current = adjacency[start][0];
            let mut closed = true;

            while current != start as u32 {
                let neighbors = &adjacency[current as usize];
                if visited[current as usize] || neighbors.len() != 2 {
                    closed = false;
                    break;
                }

                visited[current as usize] = true;
                loop_ids.push(current);

                let next = if neighbors[0] == prev {
                    neighbors[1]
                } else {
                    neighbors[0]
                };
                prev = current;
                current = next;
            }

            if !closed || loop_ids.len() < 3 {
                warn!("cut outline does not close at {plane}; cross-section left uncapped");
                continue;
            }

            self.add_cap_loop(&loop_ids, plane, side);
        }
    }

    fn add_cap_loop(&mut self, loop_ids: &[u32], plane: &CutPlane, side: Side) {
        let cap_normal = -plane.axis.unit() * side.sign();

        let mut outline = loop_ids
            .iter()
            .map(|&id| self.weld_points[id as usize])
            .collect::<Vec<_>>();

        // Orient the loop so the fan faces out of the kept half-space.
        let mut area = Pos::zeros();
        for i in 0..outline.len() {
            area += outline[i].cross(&outline[(i + 1) % outline.len()]);
        }
        if area.dot(&cap_normal) < 0.0 {
            outline.reverse();
        }

        let indices = outline
            .into_iter()
            .map(|point| self.builder.add_vertex(point, cap_normal))
            .collect::<Vec<_>>();
        for i in 1..indices.len() - 1 {
            self.builder.add_face([indices[0], indices[i], indices[i + 1]]);
        }
    }

    fn build(self) -> Mesh {
        // Stray vertices without faces still count as geometry, so a clip that
        // kept nothing must collapse to the canonical empty mesh.
        if self.builder.face_count() == 0 {
            return Mesh::default();
        }

        self.builder.build()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::clip;
    use crate::{
        builder::MeshBuilder,
        error::GeometryError,
        mesh::Mesh,
        plane::{Axis, CutPlane, Side},
    };

    fn unit_cube() -> Mesh {
        let mut builder = MeshBuilder::new();
        builder.add_box(Vector3::zeros(), Vector3::repeat(1.0));
        builder.build()
    }

    #[test]
    fn halves_have_half_the_volume() {
        let cube = unit_cube();
        let plane = CutPlane::new(Axis::X, 0.5);

        let positive = clip(&cube, &plane, Side::Positive).unwrap();
        let negative = clip(&cube, &plane, Side::Negative).unwrap();

        assert!((positive.volume() - 0.5).abs() < 1e-5);
        assert!((negative.volume() - 0.5).abs() < 1e-5);

        let positive_bounds = positive.bounds();
        assert!((positive_bounds.min.x - 0.5).abs() < 1e-6);
        assert!((positive_bounds.max.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn capped_halves_stay_closed() {
        // A closed surface has zero net (area-weighted) face normal. If the
        // cap were missing, the open ring would break that.
        let cube = unit_cube();
        let plane = CutPlane::new(Axis::Z, 0.25);

        for side in [Side::Positive, Side::Negative] {
            let half = clip(&cube, &plane, side).unwrap();
            let mut net = Vector3::zeros();
            for face in 0..half.face_count() {
                let [v0, v1, v2] = half.face_verts(face);
                net += (v1 - v0).cross(&(v2 - v0));
            }
            assert!(net.norm() < 1e-5, "open surface, net normal {net:?}");
        }
    }

    #[test]
    fn miss_keeps_everything_on_one_side() {
        let cube = unit_cube();
        let plane = CutPlane::new(Axis::Y, 5.0);

        let negative = clip(&cube, &plane, Side::Negative).unwrap();
        assert_eq!(negative.vertex_count(), 24);
        assert!((negative.volume() - 1.0).abs() < 1e-6);

        let positive = clip(&cube, &plane, Side::Positive).unwrap();
        assert!(positive.is_empty());
    }

    #[test]
    fn coincident_faces_go_to_the_positive_side() {
        let cube = unit_cube();
        // Exactly on the x = 0 wall.
        let plane = CutPlane::new(Axis::X, 0.0);

        let positive = clip(&cube, &plane, Side::Positive).unwrap();
        let negative = clip(&cube, &plane, Side::Negative).unwrap();

        assert!((positive.volume() - 1.0).abs() < 1e-5);
        assert!(negative.is_empty());
    }

    #[test]
    fn shared_wall_between_boxes_gets_no_extra_cap() {
        // Two unit boxes sharing the x = 1 wall, cut exactly at it. The kept
        // in-plane walls already close both halves, so no cap may be added on
        // top of them.
        let mut builder = MeshBuilder::new();
        builder.add_box(Vector3::zeros(), Vector3::repeat(1.0));
        builder.add_box(Vector3::new(1.0, 0.0, 0.0), Vector3::repeat(1.0));
        let mesh = builder.build();

        let plane = CutPlane::new(Axis::X, 1.0);

        // Right box (12 faces) plus the left box's in-plane +x wall (2).
        let positive = clip(&mesh, &plane, Side::Positive).unwrap();
        assert_eq!(positive.face_count(), 14);
        assert!((positive.volume() - 1.0).abs() < 1e-5);

        // Left box minus its +x wall, closed again by a single cap (2 faces).
        let negative = clip(&mesh, &plane, Side::Negative).unwrap();
        assert_eq!(negative.face_count(), 12);
        assert!((negative.volume() - 1.0).abs() < 1e-5);

        let mut net = Vector3::zeros();
        for face in 0..negative.face_count() {
            let [v0, v1, v2] = negative.face_verts(face);
            net += (v1 - v0).cross(&(v2 - v0));
        }
        assert!(net.norm() < 1e-5, "open surface, net normal {net:?}");
    }

    #[test]
    fn cut_edge_normals_are_interpolated() {
        let cube = unit_cube();
        let plane = CutPlane::new(Axis::X, 0.5);
        let half = clip(&cube, &plane, Side::Negative).unwrap();

        // Vertices on the y = 0 wall (excluding the cap ring duplicates) must
        // keep that wall's flat normal even when newly synthesized.
        let wall_normal = -Vector3::y();
        let mut checked = 0;
        for (vertex, normal) in half.vertices().iter().zip(half.normals()) {
            if vertex.y.abs() < 1e-6 && (normal - wall_normal).norm() < 1e-6 {
                checked += 1;
            }
        }
        assert!(checked >= 4);
    }

    #[test]
    fn malformed_faces_are_rejected() {
        let mesh = Mesh::new(
            vec![Vector3::zeros(), Vector3::x(), Vector3::y()],
            vec![Vector3::z(); 3],
            vec![[0, 1, 9]],
        );
        let plane = CutPlane::new(Axis::X, 0.0);

        let result = clip(&mesh, &plane, Side::Positive);
        assert!(matches!(
            result,
            Err(GeometryError::FaceIndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn clip_applies_mesh_transforms() {
        let mut cube = unit_cube();
        cube.set_position(Vector3::new(10.0, 0.0, 0.0));
        let plane = CutPlane::new(Axis::X, 10.5);

        let half = clip(&cube, &plane, Side::Positive).unwrap();
        assert!((half.volume() - 0.5).abs() < 1e-4);

        let bounds = half.bounds();
        assert!((bounds.min.x - 10.5).abs() < 1e-5);
        assert!((bounds.max.x - 11.0).abs() < 1e-5);
    }
}
