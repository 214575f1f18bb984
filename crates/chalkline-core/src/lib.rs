//! Chalkline Core Library
//!
//! Whiteboard action replication for the Chalkline classroom: drawing tools,
//! the action wire format, replay of remote actions and late-join snapshots.

pub mod board;
pub mod channel;
pub mod config;
pub mod history;
pub mod protocol;
pub mod replay;
pub mod session;
pub mod shapes;
pub mod snapshot;
pub mod surface;
pub mod sync;
pub mod tools;

pub use board::Whiteboard;
pub use channel::{CANVAS_TOPIC, Envelope, Muted, Outbox, RoomChannel};
pub use config::{ConfigError, EngineConfig};
pub use history::HistoryStack;
pub use protocol::{Action, PointerData, PointerKind, ProtocolError};
pub use replay::{ReplayDispatcher, ReplayReport};
pub use session::{Applied, IgnoreReason, Role, ToolSession};
pub use shapes::{CanvasElement, Geometry, StrokeColor, StrokeStyle};
pub use snapshot::{Snapshot, SnapshotRecorder};
pub use surface::{Scene, ShapeHandle, VectorSurface};
pub use sync::{ClientMessage, ConnectionState, ServerMessage, SyncError, SyncEvent};
#[cfg(not(target_arch = "wasm32"))]
pub use sync::RelayClient;
pub use tools::{DrawingContext, Tool, ToolError, ToolKind, Toolbox};
