use crate::{mesh::Mesh, Pos};

/// Incrementally assembles a [`Mesh`] from vertices and faces.
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    normals: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Pos, normal: Pos) -> u32 {
        self.vertices.push(vertex);
        self.normals.push(normal);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    pub fn add_quad(&mut self, quad: [u32; 4]) {
        self.add_face([quad[0], quad[1], quad[2]]);
        self.add_face([quad[0], quad[2], quad[3]]);
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn build(self) -> Mesh {
        Mesh::new(self.vertices, self.normals, self.faces)
    }
}

impl MeshBuilder {
    /// Adds an axis-aligned box with flat shading. Each wall gets its own four
    /// vertices so the normals stay per-face.
    pub fn add_box(&mut self, min: Pos, size: Pos) {
        let max = min + size;

        // Walls as (normal, four corners counter-clockwise seen from outside).
        let walls = [
            (
                -Pos::x(),
                [
                    Pos::new(min.x, min.y, min.z),
                    Pos::new(min.x, min.y, max.z),
                    Pos::new(min.x, max.y, max.z),
                    Pos::new(min.x, max.y, min.z),
                ],
            ),
            (
                Pos::x(),
                [
                    Pos::new(max.x, min.y, min.z),
                    Pos::new(max.x, max.y, min.z),
                    Pos::new(max.x, max.y, max.z),
                    Pos::new(max.x, min.y, max.z),
                ],
            ),
            (
                -Pos::y(),
                [
                    Pos::new(min.x, min.y, min.z),
                    Pos::new(max.x, min.y, min.z),
                    Pos::new(max.x, min.y, max.z),
                    Pos::new(min.x, min.y, max.z),
                ],
            ),
            (
                Pos::y(),
                [
                    Pos::new(min.x, max.y, min.z),
                    Pos::new(min.x, max.y, max.z),
                    Pos::new(max.x, max.y, max.z),
                    Pos::new(max.x, max.y, min.z),
                ],
            ),
            (
                -Pos::z(),
                [
                    Pos::new(min.x, min.y, min.z),
                    Pos::new(min.x, max.y, min.z),
                    Pos::new(max.x, max.y, min.z),
                    Pos::new(max.x, min.y, min.z),
                ],
            ),
            (
                Pos::z(),
                [
                    Pos::new(min.x, min.y, max.z),
                    Pos::new(max.x, min.y, max.z),
                    Pos::new(max.x, max.y, max.z),
                    Pos::new(min.x, max.y, max.z),
                ],
            ),
        ];

        for (normal, corners) in walls {
            let quad = corners.map(|corner| self.add_vertex(corner, normal));
            self.add_quad(quad);
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}
