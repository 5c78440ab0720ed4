use std::fmt::{self, Display};

use crate::Pos;

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which half-space of a cut plane to keep when clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Positive,
    Negative,
}

/// An axis-aligned cut plane. Its normal points along the positive axis
/// direction; position on the other two axes is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPlane {
    pub axis: Axis,
    pub position: f32,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(&self) -> Pos {
        match self {
            Axis::X => Pos::x(),
            Axis::Y => Pos::y(),
            Axis::Z => Pos::z(),
        }
    }
}

impl Side {
    pub fn sign(&self) -> f32 {
        match self {
            Side::Positive => 1.0,
            Side::Negative => -1.0,
        }
    }
}

impl CutPlane {
    pub fn new(axis: Axis, position: f32) -> Self {
        Self { axis, position }
    }

    /// Signed distance from a point to the plane, positive along the axis.
    pub fn signed_distance(&self, point: &Pos) -> f32 {
        point[self.axis.index()] - self.position
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl Display for CutPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.axis, self.position)
    }
}
