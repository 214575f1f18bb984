//! Tool system for the whiteboard.
//!
//! Each tool is a small state machine (`Idle → Drawing → Idle`) that turns
//! `press`/`drag`/`release` transitions into one growing shape on the
//! [`VectorSurface`]. The set of tools is closed: [`ToolKind`] selects one,
//! and [`Toolbox::get_mut`] matches on it exhaustively.

mod circle;
mod line;
mod path;

pub use circle::CircleTool;
pub use line::LineTool;
pub use path::PathTool;

use crate::protocol::PointerData;
use crate::shapes::{CanvasElement, DEFAULT_SIMPLIFY_TOLERANCE, Geometry, StrokeColor, StrokeStyle};
use crate::surface::{ShapeHandle, VectorSurface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tool errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("A {0} stroke is already in progress")]
    StrokeInProgress(ToolKind),
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Circle,
    Line,
    #[default]
    Path,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Circle, ToolKind::Line, ToolKind::Path];

    /// Wire name of the tool.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Path => "path",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ();

    fn from_str(s: &str) -> Result<ToolKind, ()> {
        match s {
            "circle" => Ok(ToolKind::Circle),
            "line" => Ok(ToolKind::Line),
            "path" => Ok(ToolKind::Path),
            _ => Err(()),
        }
    }
}

/// Style state shared by every tool.
///
/// Read once when a stroke starts; later changes never restyle existing
/// elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingContext {
    pub color: StrokeColor,
    /// Stroke width.
    pub radius: f64,
}

impl Default for DrawingContext {
    fn default() -> Self {
        Self {
            color: StrokeColor::default(),
            radius: 1.0,
        }
    }
}

impl DrawingContext {
    pub fn stroke(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.color.clone(),
            width: self.radius,
        }
    }
}

/// A drawing mode.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Whether a stroke is between `press` and `release`.
    fn is_drawing(&self) -> bool;

    /// Start a stroke at `event.down_point`, styled from `ctx`.
    fn press(
        &mut self,
        event: &PointerData,
        ctx: &DrawingContext,
        surface: &mut dyn VectorSurface,
    ) -> Result<(), ToolError>;

    /// Grow the current stroke. Returns false when there is none.
    fn drag(&mut self, event: &PointerData, surface: &mut dyn VectorSurface) -> bool;

    /// Finish the current stroke, if any.
    fn release(
        &mut self,
        event: &PointerData,
        surface: &mut dyn VectorSurface,
    ) -> Option<CanvasElement>;

    /// Drop the current stroke without finishing it. The primitive stays on
    /// the surface; its handle is returned.
    fn abandon(&mut self) -> Option<ShapeHandle>;
}

/// A shape under construction.
#[derive(Debug, Clone)]
pub(crate) struct Stroke<G> {
    pub handle: ShapeHandle,
    pub geometry: G,
    pub style: StrokeStyle,
}

impl<G: Into<Geometry>> Stroke<G> {
    /// Apply the frozen style to the new primitive.
    pub fn begin(
        handle: ShapeHandle,
        geometry: G,
        ctx: &DrawingContext,
        surface: &mut dyn VectorSurface,
    ) -> Self {
        let style = ctx.stroke();
        surface.set_stroke_color(handle, &style.color);
        surface.set_stroke_width(handle, style.width);
        Self {
            handle,
            geometry,
            style,
        }
    }

    pub fn finish(self) -> CanvasElement {
        CanvasElement::new(self.handle, self.geometry.into(), self.style)
    }
}

/// One instance of every tool, created with the session and never destroyed.
#[derive(Debug, Clone)]
pub struct Toolbox {
    circle: CircleTool,
    line: LineTool,
    path: PathTool,
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new(DEFAULT_SIMPLIFY_TOLERANCE)
    }
}

impl Toolbox {
    pub fn new(simplify_tolerance: f64) -> Self {
        Self {
            circle: CircleTool::new(),
            line: LineTool::new(),
            path: PathTool::new(simplify_tolerance),
        }
    }

    pub fn get(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::Circle => &self.circle,
            ToolKind::Line => &self.line,
            ToolKind::Path => &self.path,
        }
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> &mut dyn Tool {
        match kind {
            ToolKind::Circle => &mut self.circle,
            ToolKind::Line => &mut self.line,
            ToolKind::Path => &mut self.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Scene;
    use kurbo::Point;

    fn at(x: f64, y: f64) -> PointerData {
        PointerData::new(Point::new(x, y), Point::new(x, y))
    }

    #[test]
    fn test_tool_names_roundtrip() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>(), Ok(kind));
        }
        assert!("laser".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_default_tool_is_path() {
        assert_eq!(ToolKind::default(), ToolKind::Path);
    }

    #[test]
    fn test_press_freezes_style() {
        let mut scene = Scene::new();
        let mut toolbox = Toolbox::default();
        let ctx = DrawingContext {
            color: StrokeColor::new("#00ff00"),
            radius: 3.0,
        };
        toolbox
            .get_mut(ToolKind::Line)
            .press(&at(1.0, 1.0), &ctx, &mut scene)
            .unwrap();
        let element = toolbox
            .get_mut(ToolKind::Line)
            .release(&at(1.0, 1.0), &mut scene)
            .unwrap();
        assert_eq!(element.style, ctx.stroke());
        assert_eq!(scene.get(element.handle).unwrap().style, ctx.stroke());
    }

    #[test]
    fn test_second_press_is_rejected() {
        let mut scene = Scene::new();
        let mut toolbox = Toolbox::default();
        let ctx = DrawingContext::default();
        let tool = toolbox.get_mut(ToolKind::Circle);
        tool.press(&at(0.0, 0.0), &ctx, &mut scene).unwrap();
        assert_eq!(
            tool.press(&at(5.0, 5.0), &ctx, &mut scene),
            Err(ToolError::StrokeInProgress(ToolKind::Circle))
        );
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_idle_transitions_are_noops() {
        let mut scene = Scene::new();
        let mut toolbox = Toolbox::default();
        for kind in ToolKind::ALL {
            let tool = toolbox.get_mut(kind);
            assert!(!tool.drag(&at(3.0, 3.0), &mut scene));
            assert!(tool.release(&at(3.0, 3.0), &mut scene).is_none());
            assert!(tool.abandon().is_none());
        }
        assert!(scene.is_empty());
    }

    #[test]
    fn test_abandon_leaves_primitive_on_surface() {
        let mut scene = Scene::new();
        let mut toolbox = Toolbox::default();
        let tool = toolbox.get_mut(ToolKind::Path);
        tool.press(&at(0.0, 0.0), &DrawingContext::default(), &mut scene)
            .unwrap();
        let handle = tool.abandon().unwrap();
        assert!(!tool.is_drawing());
        assert!(scene.contains(handle));
    }
}
