//! Drawing-library boundary.
//!
//! Tools never render anything themselves: they create and mutate primitive
//! shapes through a [`VectorSurface`]. [`Scene`] is an in-memory surface that
//! keeps every live primitive, for headless replay and tests.

use crate::shapes::{
    Circle, DEFAULT_SIMPLIFY_TOLERANCE, Geometry, Line, Polyline, StrokeColor, StrokeStyle,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque reference to a primitive living on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(u64);

impl ShapeHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Minimal capability set a drawing library must offer.
///
/// Calls on a handle that no longer exists are ignored by implementations.
pub trait VectorSurface {
    /// Create a circle outline.
    fn create_circle(&mut self, center: Point, radius: f64) -> ShapeHandle;

    /// Change the radius of a circle.
    fn set_circle_radius(&mut self, shape: ShapeHandle, radius: f64);

    /// Create a straight segment.
    fn create_line(&mut self, from: Point, to: Point) -> ShapeHandle;

    /// Move the second endpoint of a segment.
    fn set_line_end(&mut self, shape: ShapeHandle, to: Point);

    /// Create an open path starting at `start`.
    fn create_path(&mut self, start: Point) -> ShapeHandle;

    /// Extend a path with a straight segment to `point`.
    fn append_point(&mut self, path: ShapeHandle, point: Point);

    /// Run the library's smoothing/simplification pass on a path.
    fn simplify(&mut self, path: ShapeHandle);

    fn set_stroke_color(&mut self, shape: ShapeHandle, color: &StrokeColor);

    fn set_stroke_width(&mut self, shape: ShapeHandle, width: f64);

    /// Remove a primitive from the surface.
    fn remove(&mut self, shape: ShapeHandle);
}

/// A primitive held by a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub geometry: Geometry,
    pub style: StrokeStyle,
}

/// In-memory vector surface.
#[derive(Debug, Clone)]
pub struct Scene {
    items: HashMap<ShapeHandle, SceneItem>,
    /// Paint order (back to front).
    z_order: Vec<ShapeHandle>,
    next_handle: u64,
    simplify_tolerance: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_SIMPLIFY_TOLERANCE)
    }

    /// Create a scene whose `simplify` uses the given tolerance.
    pub fn with_tolerance(simplify_tolerance: f64) -> Self {
        Self {
            items: HashMap::new(),
            z_order: Vec::new(),
            next_handle: 1,
            simplify_tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    pub fn get(&self, handle: ShapeHandle) -> Option<&SceneItem> {
        self.items.get(&handle)
    }

    pub fn contains(&self, handle: ShapeHandle) -> bool {
        self.items.contains_key(&handle)
    }

    /// Live primitives in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeHandle, &SceneItem)> {
        self.z_order
            .iter()
            .filter_map(|h| self.items.get(h).map(|item| (*h, item)))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.z_order.clear();
    }

    fn insert(&mut self, geometry: Geometry) -> ShapeHandle {
        let handle = ShapeHandle(self.next_handle);
        self.next_handle += 1;
        self.items.insert(
            handle,
            SceneItem {
                geometry,
                style: StrokeStyle::default(),
            },
        );
        self.z_order.push(handle);
        handle
    }

    fn geometry_mut(&mut self, handle: ShapeHandle) -> Option<&mut Geometry> {
        self.items.get_mut(&handle).map(|item| &mut item.geometry)
    }
}

impl VectorSurface for Scene {
    fn create_circle(&mut self, center: Point, radius: f64) -> ShapeHandle {
        self.insert(Circle::new(center, radius).into())
    }

    fn set_circle_radius(&mut self, shape: ShapeHandle, radius: f64) {
        if let Some(Geometry::Circle(circle)) = self.geometry_mut(shape) {
            circle.radius = radius;
        }
    }

    fn create_line(&mut self, from: Point, to: Point) -> ShapeHandle {
        self.insert(Line::new(from, to).into())
    }

    fn set_line_end(&mut self, shape: ShapeHandle, to: Point) {
        if let Some(Geometry::Line(line)) = self.geometry_mut(shape) {
            line.end = to;
        }
    }

    fn create_path(&mut self, start: Point) -> ShapeHandle {
        self.insert(Polyline::starting_at(start).into())
    }

    fn append_point(&mut self, path: ShapeHandle, point: Point) {
        if let Some(Geometry::Path(polyline)) = self.geometry_mut(path) {
            polyline.push(point);
        }
    }

    fn simplify(&mut self, path: ShapeHandle) {
        let tolerance = self.simplify_tolerance;
        if let Some(Geometry::Path(polyline)) = self.geometry_mut(path) {
            polyline.simplify(tolerance);
        }
    }

    fn set_stroke_color(&mut self, shape: ShapeHandle, color: &StrokeColor) {
        if let Some(item) = self.items.get_mut(&shape) {
            item.style.color = color.clone();
        }
    }

    fn set_stroke_width(&mut self, shape: ShapeHandle, width: f64) {
        if let Some(item) = self.items.get_mut(&shape) {
            item.style.width = width;
        }
    }

    fn remove(&mut self, shape: ShapeHandle) {
        if self.items.remove(&shape).is_some() {
            self.z_order.retain(|h| *h != shape);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let mut scene = Scene::new();
        let a = scene.create_circle(Point::new(0.0, 0.0), 1.0);
        let b = scene.create_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        scene.remove(a);
        assert_eq!(scene.len(), 1);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_mutators_ignore_mismatched_kinds() {
        let mut scene = Scene::new();
        let circle = scene.create_circle(Point::new(0.0, 0.0), 1.0);
        scene.set_line_end(circle, Point::new(9.0, 9.0));
        scene.append_point(circle, Point::new(9.0, 9.0));
        assert_eq!(
            scene.get(circle).unwrap().geometry,
            Geometry::Circle(Circle::new(Point::new(0.0, 0.0), 1.0))
        );
    }

    #[test]
    fn test_paint_order_survives_removal() {
        let mut scene = Scene::new();
        let a = scene.create_path(Point::new(0.0, 0.0));
        let b = scene.create_path(Point::new(1.0, 0.0));
        let c = scene.create_path(Point::new(2.0, 0.0));
        scene.remove(b);
        let order: Vec<_> = scene.iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_stroke_style() {
        let mut scene = Scene::new();
        let line = scene.create_line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        scene.set_stroke_color(line, &StrokeColor::new("#ff0000"));
        scene.set_stroke_width(line, 4.0);
        let item = scene.get(line).unwrap();
        assert_eq!(item.style.color.as_str(), "#ff0000");
        assert_eq!(item.style.width, 4.0);
    }
}
