//! Straight line segment.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A two-endpoint line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// A zero-length line anchored at `point`.
    pub fn degenerate(point: Point) -> Self {
        Self::new(point, point)
    }
}
