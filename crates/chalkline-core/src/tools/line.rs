//! Line tool: press anchors both endpoints, dragging moves the second one.

use super::{DrawingContext, Stroke, Tool, ToolError, ToolKind};
use crate::protocol::PointerData;
use crate::shapes::{CanvasElement, Line};
use crate::surface::{ShapeHandle, VectorSurface};

#[derive(Debug, Clone, Default)]
pub struct LineTool {
    current: Option<Stroke<Line>>,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for LineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
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
        let line = Line::degenerate(event.down_point);
        let handle = surface.create_line(line.start, line.end);
        self.current = Some(Stroke::begin(handle, line, ctx, surface));
        Ok(())
    }

    fn drag(&mut self, event: &PointerData, surface: &mut dyn VectorSurface) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        stroke.geometry.end = event.point;
        surface.set_line_end(stroke.handle, event.point);
        true
    }

    fn release(
        &mut self,
        _event: &PointerData,
        _surface: &mut dyn VectorSurface,
    ) -> Option<CanvasElement> {
        self.current.take().map(Stroke::finish)
    }

    fn abandon(&mut self) -> Option<ShapeHandle> {
        self.current.take().map(|stroke| stroke.handle)
    }
}
