//! Bulk state for participants who join after drawing has started.
//!
//! A snapshot is the room's whole action log plus the current tool and
//! style. Attaching re-executes every action, so the cost grows with the
//! number of actions ever taken, not with the number of shapes on screen.
//!
//! The tool/style header is applied both before and after the log: before,
//! so a log that assumes the room's tool replays on it; after, so the
//! room's current state wins. Recorded logs begin with the room's initial
//! tool and style and therefore never depend on the first pass.

use crate::config::EngineConfig;
use crate::protocol::{Action, ProtocolError};
use crate::replay::{ReplayDispatcher, ReplayReport};
use crate::session::ToolSession;
use crate::shapes::StrokeColor;
use crate::surface::VectorSurface;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// `{ tool, color, radius, actions[] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tool: String,
    pub color: StrokeColor,
    pub radius: f64,
    pub actions: Vec<Action>,
}

impl Default for Snapshot {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            tool: config.tool.as_str().to_string(),
            color: config.color,
            radius: config.radius,
            actions: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn decode(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Decode)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    fn header(&self) -> [Action; 3] {
        [
            Action::tool_named(self.tool.clone()),
            Action::color(self.color.clone()),
            Action::radius(self.radius),
        ]
    }

    /// Replay the log into `session` and leave it on the current tool and
    /// style.
    pub fn apply(
        &self,
        dispatcher: &mut ReplayDispatcher,
        session: &mut ToolSession,
        surface: &mut dyn VectorSurface,
    ) -> ReplayReport {
        let header = self.header();
        let report = dispatcher.replay(
            session,
            surface,
            header.iter().chain(&self.actions).chain(&header),
        );
        log::info!(
            "Attached snapshot: {} actions replayed, {} elements in history",
            self.actions.len(),
            session.history().len()
        );
        report
    }
}

/// Builds a [`Snapshot`] by watching a room's action stream.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    /// Initial tool and style of the room.
    preamble: [Action; 3],
    tool: ToolKind,
    color: StrokeColor,
    radius: f64,
    actions: Vec<Action>,
}

impl Default for SnapshotRecorder {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl SnapshotRecorder {
    /// Start from the state a fresh board is in.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            preamble: [
                Action::tool(config.tool),
                Action::color(config.color.clone()),
                Action::radius(config.radius),
            ],
            tool: config.tool,
            color: config.color.clone(),
            radius: config.radius,
            actions: Vec::new(),
        }
    }

    /// Append an action in arrival order.
    pub fn record(&mut self, action: &Action) {
        match action {
            Action::Tool { data } => {
                if let Ok(kind) = data.tool.parse() {
                    self.tool = kind;
                }
            }
            Action::Radius { data } => self.radius = data.radius,
            Action::Color { data } => self.color = data.color.clone(),
            Action::Event { .. } | Action::Undo => {}
        }
        self.actions.push(action.clone());
    }

    /// Number of recorded actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tool: self.tool.as_str().to_string(),
            color: self.color.clone(),
            radius: self.radius,
            actions: self.preamble.iter().chain(&self.actions).cloned().collect(),
        }
    }
}
