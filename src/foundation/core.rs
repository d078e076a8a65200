use serde::{Deserialize, Serialize};

/// Absolute frame index in schedule timeline space.
///
/// Frames are non-negative for a sorted event stream. A backward jump in
/// event time (a caller precondition violation) maps through the same floor
/// formula and may come out negative; values are passed through untouched.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Frame(pub i64);

impl Frame {
    /// The frame immediately before this one.
    pub fn prev(self) -> Frame {
        Frame(self.0 - 1)
    }

    /// The frame `delta` frames after this one.
    pub fn offset(self, delta: i64) -> Frame {
        Frame(self.0 + delta)
    }
}

/// A location in 3D stage space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Create a point from its coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance to `other`.
    pub fn distance_sq(self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}
