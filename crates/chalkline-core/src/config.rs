//! Engine configuration.
//!
//! New keys _must_ fall back to a default so older config files keep loading.

use crate::session::Role;
use crate::shapes::{DEFAULT_SIMPLIFY_TOLERANCE, StrokeColor};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Initial state of a whiteboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether local changes are published to the room.
    pub role: Role,
    /// Tool selected when the session starts.
    pub tool: ToolKind,
    pub color: StrokeColor,
    /// Stroke width.
    pub radius: f64,
    /// Ramer-Douglas-Peucker tolerance for finished freehand strokes.
    pub simplify_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role: Role::default(),
            tool: ToolKind::default(),
            color: StrokeColor::default(),
            radius: 1.0,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
