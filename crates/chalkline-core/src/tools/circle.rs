//! Circle tool: press sets the center, dragging sets the radius.

use super::{DrawingContext, Stroke, Tool, ToolError, ToolKind};
use crate::protocol::PointerData;
use crate::shapes::{CanvasElement, Circle};
use crate::surface::{ShapeHandle, VectorSurface};

#[derive(Debug, Clone, Default)]
pub struct CircleTool {
    current: Option<Stroke<Circle>>,
}

impl CircleTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for CircleTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Circle
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
        let circle = Circle::new(event.down_point, 0.0);
        let handle = surface.create_circle(circle.center, circle.radius);
        self.current = Some(Stroke::begin(handle, circle, ctx, surface));
        Ok(())
    }

    fn drag(&mut self, event: &PointerData, surface: &mut dyn VectorSurface) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        // Measured from the anchor carried by the event, not the stored center.
        stroke.geometry.radius = event.down_point.distance(event.point);
        surface.set_circle_radius(stroke.handle, stroke.geometry.radius);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Geometry;
    use crate::surface::Scene;
    use kurbo::Point;

    #[test]
    fn test_radius_follows_pointer() {
        let mut scene = Scene::new();
        let mut tool = CircleTool::new();
        let anchor = Point::new(50.0, 50.0);
        tool.press(
            &PointerData::new(anchor, anchor),
            &DrawingContext::default(),
            &mut scene,
        )
        .unwrap();
        assert!(tool.drag(&PointerData::new(Point::new(70.0, 50.0), anchor), &mut scene));

        let element = tool
            .release(&PointerData::new(Point::new(70.0, 50.0), anchor), &mut scene)
            .unwrap();
        let Geometry::Circle(circle) = element.geometry else {
            panic!("expected a circle");
        };
        assert_eq!(circle.center, anchor);
        assert!((circle.radius - 20.0).abs() < 1e-9);
        assert_eq!(scene.get(element.handle).unwrap().geometry, Geometry::Circle(circle));
    }

    #[test]
    fn test_release_without_drag_is_zero_radius() {
        let mut scene = Scene::new();
        let mut tool = CircleTool::new();
        let p = PointerData::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        tool.press(&p, &DrawingContext::default(), &mut scene).unwrap();
        let element = tool.release(&p, &mut scene).unwrap();
        assert_eq!(element.geometry, Geometry::Circle(Circle::new(Point::new(5.0, 5.0), 0.0)));
    }
}
