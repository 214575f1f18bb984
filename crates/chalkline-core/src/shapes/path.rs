//! Freehand polyline and its simplification pass.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default Ramer-Douglas-Peucker tolerance, in surface units.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 2.5;

/// A freehand stroke (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Points in drawing order.
    pub points: Vec<Point>,
}

impl Polyline {
    /// Start a stroke anchored at `start`.
    pub fn starting_at(start: Point) -> Self {
        Self {
            points: vec![start],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Append a point to the stroke.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop points that do not contribute to the shape of the stroke.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }
        self.points = simplify_points(&self.points, tolerance);
    }
}

/// Ramer-Douglas-Peucker line simplification.
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify_points(&points[..=max_index], tolerance);
        let right = simplify_points(&points[max_index..], tolerance);
        // The split point ends `left` and starts `right`.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return point.distance(line_start);
    }

    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_drops_collinear_points() {
        let mut path = Polyline::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.1),
            Point::new(10.0, 0.0),
            Point::new(15.0, -0.1),
            Point::new(20.0, 0.0),
        ]);
        path.simplify(DEFAULT_SIMPLIFY_TOLERANCE);
        assert_eq!(path.points, vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)]);
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let corner = vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(30.0, 10.0),
        ];
        let mut path = Polyline::from_points(corner.clone());
        path.simplify(DEFAULT_SIMPLIFY_TOLERANCE);
        assert_eq!(path.points, corner);
    }

    #[test]
    fn test_short_paths_untouched() {
        let mut path = Polyline::starting_at(Point::new(1.0, 1.0));
        path.simplify(DEFAULT_SIMPLIFY_TOLERANCE);
        assert_eq!(path.len(), 1);
    }
}
