//! Per-client drawing state and local capture.
//!
//! Local input and remote replay share one code path, [`ToolSession::apply`].
//! Local input goes through [`ToolSession::capture`], which additionally
//! publishes the action when the client's [`Role`] shares its drawing.

use crate::channel::{CANVAS_TOPIC, RoomChannel};
use crate::config::EngineConfig;
use crate::history::HistoryStack;
use crate::protocol::{Action, PointerData, PointerKind};
use crate::shapes::StrokeColor;
use crate::surface::VectorSurface;
use crate::tools::{DrawingContext, ToolKind, Toolbox};
use serde::{Deserialize, Serialize};

/// Which side of the classroom this client is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Teacher-facing client: every local change is published.
    #[default]
    Presenter,
    /// Student-facing client: draws locally, publishes nothing.
    Viewer,
}

impl Role {
    pub fn publishes(self) -> bool {
        matches!(self, Role::Presenter)
    }
}

/// Outcome of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Session or surface state changed.
    Changed,
    /// Nothing happened.
    Ignored(IgnoreReason),
}

impl Applied {
    pub fn is_changed(self) -> bool {
        matches!(self, Applied::Changed)
    }
}

/// Why an action was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Tool name not in the toolbox.
    UnknownTool,
    /// `mouseMove`/`mouseUp` without a preceding `mouseDown`.
    NoStroke,
    /// `mouseDown` while a stroke is still open.
    StrokeInProgress,
    /// Undo with nothing in history.
    EmptyHistory,
}

/// The whole local drawing state of one client in one room.
#[derive(Debug, Clone)]
pub struct ToolSession {
    role: Role,
    active: ToolKind,
    context: DrawingContext,
    toolbox: Toolbox,
    history: HistoryStack,
}

impl Default for ToolSession {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ToolSession {
    pub fn new(role: Role) -> Self {
        Self::from_config(&EngineConfig {
            role,
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            role: config.role,
            active: config.tool,
            context: DrawingContext {
                color: config.color.clone(),
                radius: config.radius,
            },
            toolbox: Toolbox::new(config.simplify_tolerance),
            history: HistoryStack::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active
    }

    pub fn context(&self) -> &DrawingContext {
        &self.context
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Whether the active tool has a stroke open.
    pub fn is_drawing(&self) -> bool {
        self.toolbox.get(self.active).is_drawing()
    }

    /// Perform the state transition for `action`. Never publishes.
    pub fn apply(&mut self, action: &Action, surface: &mut dyn VectorSurface) -> Applied {
        let applied = match action {
            Action::Tool { data } => self.select_tool(&data.tool),
            Action::Radius { data } => {
                self.set_radius(data.radius);
                Applied::Changed
            }
            Action::Color { data } => {
                self.set_color(data.color.clone());
                Applied::Changed
            }
            Action::Event { kind, data } => self.pointer(*kind, data, surface),
            Action::Undo => self.undo(surface),
        };
        log::debug!("{} action -> {:?}", action.name(), applied);
        applied
    }

    /// Apply a locally produced action and share it with the room.
    ///
    /// A tool change naming an unknown tool is not published.
    pub fn capture(
        &mut self,
        action: Action,
        surface: &mut dyn VectorSurface,
        channel: &mut dyn RoomChannel,
    ) -> Applied {
        let applied = self.apply(&action, surface);
        if self.role.publishes() && applied != Applied::Ignored(IgnoreReason::UnknownTool) {
            channel.publish(CANVAS_TOPIC, &action);
        }
        applied
    }

    /// Activate the tool called `name`; unknown names are ignored.
    pub fn select_tool(&mut self, name: &str) -> Applied {
        match name.parse::<ToolKind>() {
            Ok(kind) => {
                self.switch_tool(kind);
                Applied::Changed
            }
            Err(()) => {
                log::debug!("Ignoring unknown tool {:?}", name);
                Applied::Ignored(IgnoreReason::UnknownTool)
            }
        }
    }

    /// Activate `kind`. Switching away from a tool mid-stroke abandons the
    /// stroke: it stays on the surface but never enters history.
    pub fn switch_tool(&mut self, kind: ToolKind) {
        if kind == self.active {
            return;
        }
        if let Some(orphan) = self.toolbox.get_mut(self.active).abandon() {
            log::debug!(
                "Abandoned {} stroke {:?} on switch to {}",
                self.active,
                orphan,
                kind
            );
        }
        self.active = kind;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.context.radius = radius;
    }

    pub fn set_color(&mut self, color: StrokeColor) {
        self.context.color = color;
    }

    /// Route a pointer transition to the active tool.
    pub fn pointer(
        &mut self,
        kind: PointerKind,
        data: &PointerData,
        surface: &mut dyn VectorSurface,
    ) -> Applied {
        let tool = self.toolbox.get_mut(self.active);
        match kind {
            PointerKind::MouseDown => match tool.press(data, &self.context, surface) {
                Ok(()) => Applied::Changed,
                Err(e) => {
                    log::warn!("{}; ignoring mouseDown", e);
                    Applied::Ignored(IgnoreReason::StrokeInProgress)
                }
            },
            PointerKind::MouseMove => {
                if tool.drag(data, surface) {
                    Applied::Changed
                } else {
                    Applied::Ignored(IgnoreReason::NoStroke)
                }
            }
            PointerKind::MouseUp => match tool.release(data, surface) {
                Some(element) => {
                    self.history.push(element);
                    Applied::Changed
                }
                None => Applied::Ignored(IgnoreReason::NoStroke),
            },
        }
    }

    /// Remove the newest element from history and from the surface.
    pub fn undo(&mut self, surface: &mut dyn VectorSurface) -> Applied {
        match self.history.pop() {
            Some(element) => {
                surface.remove(element.handle);
                Applied::Changed
            }
            None => {
                log::info!("History is empty, nothing to undo");
                Applied::Ignored(IgnoreReason::EmptyHistory)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Outbox;
    use crate::shapes::Geometry;
    use crate::surface::Scene;
    use kurbo::Point;

    fn stroke(session: &mut ToolSession, scene: &mut Scene, from: Point, to: Point) {
        session.apply(&Action::mouse_down(from), scene);
        session.apply(&Action::mouse_move(to, from), scene);
        session.apply(&Action::mouse_up(to, from), scene);
    }

    #[test]
    fn test_unknown_tool_leaves_active_tool() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        session.apply(&Action::tool(ToolKind::Line), &mut scene);
        let applied = session.apply(&Action::tool_named("laser"), &mut scene);
        assert_eq!(applied, Applied::Ignored(IgnoreReason::UnknownTool));
        assert_eq!(session.active_tool(), ToolKind::Line);
    }

    #[test]
    fn test_completed_stroke_enters_history() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        session.apply(&Action::tool(ToolKind::Circle), &mut scene);
        stroke(&mut session, &mut scene, Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_drawing());
    }

    #[test]
    fn test_tool_switch_abandons_stroke() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        let anchor = Point::new(1.0, 1.0);
        session.apply(&Action::tool(ToolKind::Circle), &mut scene);
        session.apply(&Action::mouse_down(anchor), &mut scene);
        session.apply(&Action::mouse_move(Point::new(4.0, 5.0), anchor), &mut scene);
        assert!(session.is_drawing());

        session.apply(&Action::tool(ToolKind::Line), &mut scene);
        assert!(!session.is_drawing());

        // The orphan stays visible; the release now reaches the line tool.
        let applied = session.apply(&Action::mouse_up(Point::new(4.0, 5.0), anchor), &mut scene);
        assert_eq!(applied, Applied::Ignored(IgnoreReason::NoStroke));
        assert!(session.history().is_empty());
        assert_eq!(scene.len(), 1);

        // Switching back does not resurrect it.
        session.apply(&Action::tool(ToolKind::Circle), &mut scene);
        assert!(!session.is_drawing());
    }

    #[test]
    fn test_reselecting_same_tool_keeps_stroke() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        session.apply(&Action::mouse_down(Point::new(0.0, 0.0)), &mut scene);
        session.apply(&Action::tool(ToolKind::Path), &mut scene);
        assert!(session.is_drawing());
    }

    #[test]
    fn test_second_down_is_ignored() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        session.apply(&Action::mouse_down(Point::new(0.0, 0.0)), &mut scene);
        let applied = session.apply(&Action::mouse_down(Point::new(9.0, 9.0)), &mut scene);
        assert_eq!(applied, Applied::Ignored(IgnoreReason::StrokeInProgress));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_style_applies_to_future_elements_only() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        session.apply(&Action::tool(ToolKind::Line), &mut scene);
        stroke(&mut session, &mut scene, Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        session.apply(&Action::color("#ff0000"), &mut scene);
        session.apply(&Action::radius(6.0), &mut scene);
        stroke(&mut session, &mut scene, Point::new(0.0, 1.0), Point::new(1.0, 1.0));

        let styles: Vec<_> = session
            .history()
            .iter()
            .map(|e| (e.style.color.as_str().to_string(), e.style.width))
            .collect();
        assert_eq!(
            styles,
            vec![("white".to_string(), 1.0), ("#ff0000".to_string(), 6.0)]
        );
    }

    #[test]
    fn test_style_change_mid_stroke_keeps_frozen_style() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        let anchor = Point::new(0.0, 0.0);
        session.apply(&Action::mouse_down(anchor), &mut scene);
        session.apply(&Action::color("#123456"), &mut scene);
        session.apply(&Action::mouse_up(anchor, anchor), &mut scene);
        assert_eq!(session.history().last().unwrap().style.color.as_str(), "white");
    }

    #[test]
    fn test_undo_removes_from_surface() {
        let mut session = ToolSession::default();
        let mut scene = Scene::new();
        stroke(&mut session, &mut scene, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(scene.len(), 1);
        assert!(session.undo(&mut scene).is_changed());
        assert!(scene.is_empty());
        assert_eq!(
            session.undo(&mut scene),
            Applied::Ignored(IgnoreReason::EmptyHistory)
        );
    }

    #[test]
    fn test_presenter_publishes_captured_actions() {
        let mut session = ToolSession::new(Role::Presenter);
        let mut scene = Scene::new();
        let mut outbox = Outbox::new();
        let p = Point::new(2.0, 2.0);
        session.capture(Action::tool(ToolKind::Circle), &mut scene, &mut outbox);
        session.capture(Action::mouse_down(p), &mut scene, &mut outbox);
        session.capture(Action::mouse_up(p, p), &mut scene, &mut outbox);
        session.capture(Action::undo(), &mut scene, &mut outbox);

        let sent: Vec<_> = outbox.take().into_iter().map(|e| e.action).collect();
        assert_eq!(
            sent,
            vec![
                Action::tool(ToolKind::Circle),
                Action::mouse_down(p),
                Action::mouse_up(p, p),
                Action::Undo,
            ]
        );
    }

    #[test]
    fn test_unknown_tool_is_not_published() {
        let mut session = ToolSession::new(Role::Presenter);
        let mut scene = Scene::new();
        let mut outbox = Outbox::new();
        session.capture(Action::tool_named("laser"), &mut scene, &mut outbox);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_viewer_draws_locally_only() {
        let mut session = ToolSession::new(Role::Viewer);
        let mut scene = Scene::new();
        let mut outbox = Outbox::new();
        let p = Point::new(2.0, 2.0);
        session.capture(Action::mouse_down(p), &mut scene, &mut outbox);
        session.capture(Action::mouse_up(p, p), &mut scene, &mut outbox);
        assert!(outbox.is_empty());
        assert_eq!(session.history().len(), 1);
        assert!(matches!(
            session.history().last().unwrap().geometry,
            Geometry::Path(_)
        ));
    }
}
