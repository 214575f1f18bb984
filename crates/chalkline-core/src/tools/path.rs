//! Freehand tool: every drag appends a point, release simplifies the stroke.

use super::{DrawingContext, Stroke, Tool, ToolError, ToolKind};
use crate::protocol::PointerData;
use crate::shapes::{CanvasElement, Polyline};
use crate::surface::{ShapeHandle, VectorSurface};

#[derive(Debug, Clone)]
pub struct PathTool {
    current: Option<Stroke<Polyline>>,
    /// Tolerance applied to the recorded geometry on release.
    simplify_tolerance: f64,
}

impl PathTool {
    pub fn new(simplify_tolerance: f64) -> Self {
        Self {
            current: None,
            simplify_tolerance,
        }
    }
}

impl Tool for PathTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Path
    }

    fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    fn press(
        &mut self,
        event: &PointerData,
        ctx: &DrawingContext,
        surface: &mut dyn VectorSurface,
    ) -> Result<(), ToolError> {
        if self.current.is_some() {
            return Err(ToolError::StrokeInProgress(self.kind()));
        }
        let handle = surface.create_path(event.down_point);
        let path = Polyline::starting_at(event.down_point);
        self.current = Some(Stroke::begin(handle, path, ctx, surface));
        Ok(())
    }

    fn drag(&mut self, event: &PointerData, surface: &mut dyn VectorSurface) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        stroke.geometry.push(event.point);
        surface.append_point(stroke.handle, event.point);
        true
    }

    fn release(
        &mut self,
        _event: &PointerData,
        surface: &mut dyn VectorSurface,
    ) -> Option<CanvasElement> {
        let mut stroke = self.current.take()?;
        surface.simplify(stroke.handle);
        stroke.geometry.simplify(self.simplify_tolerance);
        Some(stroke.finish())
    }

    fn abandon(&mut self) -> Option<ShapeHandle> {
        self.current.take().map(|stroke| stroke.handle)
    }
}
