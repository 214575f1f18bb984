//! One participant's whiteboard: session, surface and room channel together.

use crate::channel::RoomChannel;
use crate::config::EngineConfig;
use crate::protocol::{Action, PointerKind};
use crate::replay::{ReplayDispatcher, ReplayReport};
use crate::session::{Applied, ToolSession};
use crate::shapes::StrokeColor;
use crate::snapshot::Snapshot;
use crate::surface::{Scene, VectorSurface};
use crate::sync::SyncEvent;
use kurbo::Point;

/// A whiteboard bound to a drawing surface and a room.
///
/// Local input is applied and published; actions from the room are applied
/// through the replay path and never published again.
pub struct Whiteboard<S: VectorSurface, C: RoomChannel> {
    session: ToolSession,
    surface: S,
    channel: C,
    dispatcher: ReplayDispatcher,
}

impl<S: VectorSurface, C: RoomChannel> Whiteboard<S, C> {
    pub fn new(session: ToolSession, surface: S, channel: C) -> Self {
        Self {
            session,
            surface,
            channel,
            dispatcher: ReplayDispatcher::new(),
        }
    }

    /// The surface keeps its own simplification settings; it should use
    /// `config.simplify_tolerance` too, or finished paths on the surface and
    /// in history will differ.
    pub fn from_config(config: &EngineConfig, surface: S, channel: C) -> Self {
        Self::new(ToolSession::from_config(config), surface, channel)
    }

    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Totals for everything received from the room.
    pub fn received(&self) -> ReplayReport {
        self.dispatcher.totals()
    }

    fn capture(&mut self, action: Action) -> Applied {
        self.session.capture(action, &mut self.surface, &mut self.channel)
    }

    // --- Local input ---

    pub fn pointer_down(&mut self, point: Point) -> Applied {
        self.capture(Action::mouse_down(point))
    }

    pub fn pointer_move(&mut self, point: Point, down_point: Point) -> Applied {
        self.capture(Action::pointer(PointerKind::MouseMove, point, down_point))
    }

    pub fn pointer_up(&mut self, point: Point, down_point: Point) -> Applied {
        self.capture(Action::pointer(PointerKind::MouseUp, point, down_point))
    }

    pub fn select_tool(&mut self, name: &str) -> Applied {
        self.capture(Action::tool_named(name))
    }

    pub fn set_color(&mut self, color: impl Into<StrokeColor>) -> Applied {
        self.capture(Action::color(color))
    }

    pub fn set_radius(&mut self, radius: f64) -> Applied {
        self.capture(Action::radius(radius))
    }

    pub fn undo(&mut self) -> Applied {
        self.capture(Action::undo())
    }

    // --- Inbound ---

    /// Apply an action published by another participant.
    pub fn receive(&mut self, action: &Action) -> Applied {
        self.dispatcher.dispatch(&mut self.session, &mut self.surface, action)
    }

    /// Decode and apply a raw canvas envelope; malformed input is dropped.
    pub fn receive_message(&mut self, json: &str) -> Option<Applied> {
        self.dispatcher.dispatch_message(&mut self.session, &mut self.surface, json)
    }

    /// Catch up with a room that was already drawing. Meant for a fresh board.
    pub fn attach(&mut self, snapshot: &Snapshot) -> ReplayReport {
        snapshot.apply(&mut self.dispatcher, &mut self.session, &mut self.surface)
    }

    /// Feed one relay event; returns what it did to the drawing.
    pub fn handle_event(&mut self, event: &SyncEvent) -> ReplayReport {
        match event {
            SyncEvent::Joined {
                room,
                snapshot: Some(snapshot),
                ..
            } => {
                log::info!("Joined room {} with drawing in progress", room);
                self.attach(snapshot)
            }
            SyncEvent::Action { action, .. } => self.dispatcher.replay(
                &mut self.session,
                &mut self.surface,
                std::iter::once(action),
            ),
            _ => ReplayReport::default(),
        }
    }
}

impl<C: RoomChannel> Whiteboard<Scene, C> {
    /// A board on an in-memory [`Scene`] simplifying paths like the session.
    pub fn headless(config: &EngineConfig, channel: C) -> Self {
        Self::from_config(config, Scene::with_tolerance(config.simplify_tolerance), channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{CANVAS_TOPIC, Muted, Outbox};
    use crate::session::{IgnoreReason, Role};
    use crate::shapes::{Circle, Geometry};
    use crate::snapshot::SnapshotRecorder;
    use crate::tools::ToolKind;

    fn presenter() -> Whiteboard<Scene, Outbox> {
        Whiteboard::new(ToolSession::new(Role::Presenter), Scene::new(), Outbox::new())
    }

    fn viewer() -> Whiteboard<Scene, Muted> {
        Whiteboard::new(ToolSession::new(Role::Viewer), Scene::new(), Muted)
    }

    fn forward(from: &mut Whiteboard<Scene, Outbox>, to: &mut Whiteboard<Scene, Muted>) {
        for envelope in from.channel_mut().take() {
            assert_eq!(envelope.topic, CANVAS_TOPIC);
            to.receive(&envelope.action);
        }
    }

    #[test]
    fn test_presenter_publishes_every_local_action() {
        let mut board = presenter();
        let origin = Point::new(0.0, 0.0);
        board.select_tool("line");
        board.set_color("#ff8800");
        board.set_radius(4.0);
        board.pointer_down(origin);
        board.pointer_move(Point::new(5.0, 5.0), origin);
        board.pointer_up(Point::new(5.0, 5.0), origin);
        board.undo();

        let names: Vec<_> = board
            .channel()
            .pending()
            .iter()
            .map(|e| e.action.name())
            .collect();
        assert_eq!(
            names,
            vec!["tool", "color", "radius", "event", "event", "event", "undo"]
        );
    }

    #[test]
    fn test_unknown_tool_is_not_published() {
        let mut board = presenter();
        assert_eq!(
            board.select_tool("laser"),
            Applied::Ignored(IgnoreReason::UnknownTool)
        );
        assert!(board.channel().is_empty());
    }

    #[test]
    fn test_viewer_draws_without_publishing() {
        let mut board =
            Whiteboard::new(ToolSession::new(Role::Viewer), Scene::new(), Outbox::new());
        let p = Point::new(1.0, 1.0);
        board.pointer_down(p);
        board.pointer_up(p, p);
        assert_eq!(board.session().history().len(), 1);
        assert!(board.channel().is_empty());
    }

    #[test]
    fn test_remote_board_mirrors_presenter() {
        let mut teacher = presenter();
        let mut student = viewer();
        let center = Point::new(50.0, 50.0);

        teacher.select_tool("circle");
        teacher.set_color("#00ff00");
        teacher.pointer_down(center);
        teacher.pointer_move(Point::new(60.0, 50.0), center);
        teacher.pointer_move(Point::new(70.0, 50.0), center);
        teacher.pointer_up(Point::new(70.0, 50.0), center);
        forward(&mut teacher, &mut student);

        let element = student.session().history().last().unwrap();
        assert_eq!(element.geometry, Geometry::Circle(Circle::new(center, 20.0)));
        assert_eq!(element.style.color.as_str(), "#00ff00");
        assert!(student
            .session()
            .history()
            .same_drawing(teacher.session().history()));
        assert_eq!(student.received().changed, 6);

        teacher.undo();
        forward(&mut teacher, &mut student);
        assert!(student.session().history().is_empty());
        assert!(student.surface().is_empty());
    }

    #[test]
    fn test_receive_never_publishes() {
        let mut board = presenter();
        board.receive(&Action::tool(ToolKind::Line));
        assert!(board.receive_message(r#"{"action":"radius"}"#).is_none());
        assert!(board.channel().is_empty());
        assert_eq!(board.session().active_tool(), ToolKind::Line);
        assert_eq!(board.received().dropped, 1);
    }

    #[test]
    fn test_handle_join_with_snapshot() {
        let mut recorder = SnapshotRecorder::default();
        let origin = Point::new(0.0, 0.0);
        for action in [
            Action::tool(ToolKind::Line),
            Action::mouse_down(origin),
            Action::mouse_up(Point::new(3.0, 4.0), origin),
        ] {
            recorder.record(&action);
        }

        let mut board = viewer();
        let report = board.handle_event(&SyncEvent::Joined {
            room: "physics".to_string(),
            peer_count: 2,
            snapshot: Some(recorder.snapshot()),
        });
        assert_eq!(report.dropped, 0);
        assert_eq!(board.session().history().len(), 1);
        assert_eq!(board.surface().len(), 1);
        assert_eq!(board.session().active_tool(), ToolKind::Line);

        let report = board.handle_event(&SyncEvent::PeerLeft {
            peer_id: "p1".to_string(),
        });
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_handle_action_event() {
        let mut board = viewer();
        let report = board.handle_event(&SyncEvent::Action {
            from: "p1".to_string(),
            action: Action::undo(),
        });
        assert_eq!(report.ignored, 1);
    }

    #[test]
    fn test_headless_board_simplifies_like_history() {
        let config = EngineConfig {
            simplify_tolerance: 50.0,
            ..EngineConfig::default()
        };
        let mut board = Whiteboard::headless(&config, Muted);
        let anchor = Point::new(0.0, 0.0);
        board.pointer_down(anchor);
        board.pointer_move(Point::new(50.0, 10.0), anchor);
        board.pointer_move(Point::new(100.0, 0.0), anchor);
        board.pointer_up(Point::new(100.0, 0.0), anchor);

        let element = board.session().history().last().unwrap();
        let Geometry::Path(ref path) = element.geometry else {
            panic!("expected a path");
        };
        assert_eq!(path.len(), 2);
        assert_eq!(
            board.surface().get(element.handle).unwrap().geometry,
            element.geometry
        );
    }
}
