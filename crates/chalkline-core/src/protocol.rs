//! Whiteboard action protocol.
//!
//! Every message is a JSON envelope tagged by `action`:
//!
//! ```json
//! { "action": "tool",   "data": { "tool": "circle" } }
//! { "action": "radius", "data": { "radius": 4 } }
//! { "action": "color",  "data": { "color": "#ffffff" } }
//! { "action": "event",  "type": "mouseDown", "data": { "point": {"x": 10, "y": 10}, "downPoint": {"x": 10, "y": 10} } }
//! { "action": "undo" }
//! ```
//!
//! The protocol is not versioned and carries no sequence number, timestamp or
//! sender identity.

use crate::shapes::StrokeColor;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed action envelope: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Failed to encode action: {0}")]
    Encode(#[source] serde_json::Error),
}

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Select the drawing tool.
    Tool { data: ToolData },
    /// Set the stroke width for future elements.
    Radius { data: RadiusData },
    /// Set the stroke color for future elements.
    Color { data: ColorData },
    /// A pointer transition for the active tool.
    Event {
        #[serde(rename = "type")]
        kind: PointerKind,
        data: PointerData,
    },
    /// Remove the most recent element from history.
    Undo,
}

/// Payload of [`Action::Tool`].
///
/// The name stays a string so an unknown tool still parses and is then ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolData {
    pub tool: String,
}

/// Payload of [`Action::Radius`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusData {
    pub radius: f64,
}

/// Payload of [`Action::Color`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorData {
    pub color: StrokeColor,
}

/// Pointer transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    MouseDown,
    MouseMove,
    MouseUp,
}

/// Pointer position plus the anchor of the current stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerData {
    #[serde(with = "wire_point")]
    pub point: Point,
    #[serde(with = "wire_point")]
    pub down_point: Point,
}

impl PointerData {
    pub fn new(point: Point, down_point: Point) -> Self {
        Self { point, down_point }
    }
}

impl Action {
    pub fn tool(kind: ToolKind) -> Self {
        Self::tool_named(kind.as_str())
    }

    pub fn tool_named(name: impl Into<String>) -> Self {
        Action::Tool {
            data: ToolData { tool: name.into() },
        }
    }

    pub fn radius(radius: f64) -> Self {
        Action::Radius {
            data: RadiusData { radius },
        }
    }

    pub fn color(color: impl Into<StrokeColor>) -> Self {
        Action::Color {
            data: ColorData {
                color: color.into(),
            },
        }
    }

    pub fn pointer(kind: PointerKind, point: Point, down_point: Point) -> Self {
        Action::Event {
            kind,
            data: PointerData::new(point, down_point),
        }
    }

    pub fn mouse_down(point: Point) -> Self {
        Self::pointer(PointerKind::MouseDown, point, point)
    }

    pub fn mouse_move(point: Point, down_point: Point) -> Self {
        Self::pointer(PointerKind::MouseMove, point, down_point)
    }

    pub fn mouse_up(point: Point, down_point: Point) -> Self {
        Self::pointer(PointerKind::MouseUp, point, down_point)
    }

    pub fn undo() -> Self {
        Action::Undo
    }

    /// Wire name of this action's kind.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Tool { .. } => "tool",
            Action::Radius { .. } => "radius",
            Action::Color { .. } => "color",
            Action::Event { .. } => "event",
            Action::Undo => "undo",
        }
    }

    /// Parse an envelope from its JSON text.
    pub fn decode(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Decode)
    }

    /// Serialize this action to its JSON text.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse an envelope already embedded in another JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        serde_json::from_value(value).map_err(ProtocolError::Decode)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, ProtocolError> {
        serde_json::to_value(self).map_err(ProtocolError::Encode)
    }
}

/// Points are written as `{x, y}`. On input the drawing library's own
/// serialization, `["Point", x, y]`, is accepted too.
mod wire_point {
    use kurbo::Point;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct XY {
        x: f64,
        y: f64,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyPoint {
        Object(XY),
        Tagged(String, f64, f64),
    }

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        XY {
            x: point.x,
            y: point.y,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        match AnyPoint::deserialize(deserializer)? {
            AnyPoint::Object(XY { x, y }) => Ok(Point::new(x, y)),
            AnyPoint::Tagged(tag, x, y) if tag == "Point" => Ok(Point::new(x, y)),
            AnyPoint::Tagged(tag, _, _) => {
                Err(D::Error::custom(format!("unexpected point tag {tag:?}")))
            }
        }
    }
}
