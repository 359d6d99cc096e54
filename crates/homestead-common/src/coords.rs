//! Grid coordinates for farm plots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid address of a single farm plot.
///
/// This is a logical address, not a rendering position: the presentation
/// layer decides where (and how) a coordinate is drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct PlotCoord {
    /// X axis (column direction)
    pub x: i32,
    /// Y axis (height, constant across a grid)
    pub y: i32,
    /// Z axis (row direction)
    pub z: i32,
}

impl PlotCoord {
    /// Creates a new plot coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for PlotCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
