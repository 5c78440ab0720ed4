use mesh_kernel::{
    bounds::BoundingBox,
    plane::{Axis, CutPlane},
};

/// Per-axis cut counts. N cuts along an axis divide the bounding box into
/// N + 1 evenly spaced slabs on that axis; 0 cuts leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutCounts {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CutCounts {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn for_axis(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn total(&self) -> u32 {
        self.x + self.y + self.z
    }
}

/// The `count` interior positions dividing [a, b] into count + 1 equal
/// segments, in strictly increasing order.
pub fn cut_positions(a: f32, b: f32, count: u32) -> Vec<f32> {
    (1..=count)
        .map(|k| a + (b - a) * k as f32 / (count + 1) as f32)
        .collect()
}

/// Every cut plane for a bounding box, in application order: all X planes,
/// then all Y, then all Z, at increasing positions within each axis.
pub fn cut_planes(bounds: &BoundingBox, cuts: CutCounts) -> Vec<CutPlane> {
    Axis::ALL
        .iter()
        .flat_map(|&axis| {
            let (min, max) = bounds.range(axis);
            cut_positions(min, max, cuts.for_axis(axis))
                .into_iter()
                .map(move |position| CutPlane::new(axis, position))
        })
        .collect()
}
