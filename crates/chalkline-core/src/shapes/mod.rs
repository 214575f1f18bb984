//! Finished canvas elements and their stroke styling.

mod circle;
mod line;
mod path;

pub use circle::Circle;
pub use line::Line;
pub use path::{DEFAULT_SIMPLIFY_TOLERANCE, Polyline, simplify_points};

use crate::surface::ShapeHandle;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for canvas elements.
pub type ShapeId = Uuid;

/// Stroke color as it travels on the wire.
///
/// Kept verbatim (`"white"`, `"#ffffff"`, ...) so the drawing library on each
/// client resolves it the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeColor(String);

impl StrokeColor {
    pub fn new(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::new("white")
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrokeColor {
    fn from(color: &str) -> Self {
        Self::new(color)
    }
}

impl From<String> for StrokeColor {
    fn from(color: String) -> Self {
        Self(color)
    }
}

/// Stroke applied to an element when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: StrokeColor,
    /// Stroke width.
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: StrokeColor::default(),
            width: 1.0,
        }
    }
}

/// Geometry of a canvas element, one variant per tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Circle(Circle),
    Line(Line),
    Path(Polyline),
}

impl Geometry {
    /// The tool that produces this kind of geometry.
    pub fn kind(&self) -> ToolKind {
        match self {
            Geometry::Circle(_) => ToolKind::Circle,
            Geometry::Line(_) => ToolKind::Line,
            Geometry::Path(_) => ToolKind::Path,
        }
    }
}

impl From<Circle> for Geometry {
    fn from(circle: Circle) -> Self {
        Geometry::Circle(circle)
    }
}

impl From<Line> for Geometry {
    fn from(line: Line) -> Self {
        Geometry::Line(line)
    }
}

impl From<Polyline> for Geometry {
    fn from(path: Polyline) -> Self {
        Geometry::Path(path)
    }
}

/// A completed shape owned by the history stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasElement {
    pub(crate) id: ShapeId,
    /// Surface object realizing this element.
    pub handle: ShapeHandle,
    pub geometry: Geometry,
    pub style: StrokeStyle,
}

impl CanvasElement {
    pub(crate) fn new(handle: ShapeHandle, geometry: Geometry, style: StrokeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            geometry,
            style,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ToolKind {
        self.geometry.kind()
    }

    /// Whether two elements describe the same drawing, ignoring identity.
    pub fn same_drawing(&self, other: &CanvasElement) -> bool {
        self.geometry == other.geometry && self.style == other.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_geometry_kind() {
        let circle: Geometry = Circle::new(Point::ZERO, 1.0).into();
        let line: Geometry = Line::new(Point::ZERO, Point::new(1.0, 0.0)).into();
        let path: Geometry = Polyline::starting_at(Point::ZERO).into();
        assert_eq!(circle.kind(), ToolKind::Circle);
        assert_eq!(line.kind(), ToolKind::Line);
        assert_eq!(path.kind(), ToolKind::Path);
    }

    #[test]
    fn test_same_drawing_ignores_identity() {
        let geometry: Geometry = Circle::new(Point::new(5.0, 5.0), 3.0).into();
        let a = CanvasElement::new(ShapeHandle::new(1), geometry.clone(), StrokeStyle::default());
        let b = CanvasElement::new(ShapeHandle::new(7), geometry, StrokeStyle::default());
        assert_ne!(a.id(), b.id());
        assert!(a.same_drawing(&b));
    }

    #[test]
    fn test_stroke_color_is_transparent_on_the_wire() {
        let json = serde_json::to_string(&StrokeColor::new("#ffffff")).unwrap();
        assert_eq!(json, "\"#ffffff\"");
    }
}
