use crate::{plane::Axis, Pos};

/// Axis-aligned bounding box, stored as its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Pos,
    pub max: Pos,
}

impl BoundingBox {
    /// Creates an empty bounding box. Expanding it by any point makes that
    /// point both corners.
    pub fn new() -> Self {
        Self {
            min: Pos::repeat(f32::INFINITY),
            max: Pos::repeat(f32::NEG_INFINITY),
        }
    }

    /// A box that has not been expanded by any point.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn expand_point(&mut self, point: Pos) {
        self.min = Pos::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Pos::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    pub fn expand_box(&mut self, other: &BoundingBox) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) / 2.0
    }

    pub fn longest_axis(&self) -> usize {
        let lengths = (self.max - self.min).abs();

        if lengths.x > lengths.y && lengths.x > lengths.z {
            return 0;
        }

        if lengths.y > lengths.z {
            return 1;
        }

        2
    }

    /// The extent of the box along one axis.
    pub fn range(&self, axis: Axis) -> (f32, f32) {
        (self.min[axis.index()], self.max[axis.index()])
    }

    /// Squared distance from a point to the box, zero if the point is inside.
    pub fn distance_squared(&self, point: Pos) -> f32 {
        let clamped = Pos::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        );
        (point - clamped).norm_squared()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::BoundingBox;
    use crate::plane::Axis;

    #[test]
    fn expand_and_range() {
        let mut bounds = BoundingBox::new();
        assert!(bounds.is_empty());

        bounds.expand_point(Vector3::new(1.0, -2.0, 3.0));
        bounds.expand_point(Vector3::new(-1.0, 4.0, 0.0));

        assert!(!bounds.is_empty());
        assert_eq!(bounds.range(Axis::X), (-1.0, 1.0));
        assert_eq!(bounds.range(Axis::Y), (-2.0, 4.0));
        assert_eq!(bounds.range(Axis::Z), (0.0, 3.0));
        assert_eq!(bounds.center(), Vector3::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn distance_to_box() {
        let mut bounds = BoundingBox::new();
        bounds.expand_point(Vector3::zeros());
        bounds.expand_point(Vector3::repeat(1.0));

        assert_eq!(bounds.distance_squared(Vector3::repeat(0.5)), 0.0);
        assert_eq!(bounds.distance_squared(Vector3::new(2.0, 0.5, 0.5)), 1.0);
    }
}
