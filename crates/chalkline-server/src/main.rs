//! Chalkline WebSocket Relay Server
//!
//! Relays whiteboard actions between the clients of a room and keeps each
//! room's action log so late joiners can catch up.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "join", "room": "room-id" }
//! { "type": "publish", "topic": "canvas", "payload": { "action": "undo" } }
//! { "type": "leave" }
//! ```

mod config;
mod rooms;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use chalkline_core::{ClientMessage, ServerMessage};
use config::ServerConfig;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use rooms::{AppState, Peer, Relayed};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

type Sender = SplitSink<WebSocket, Message>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chalkline_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config.channel_capacity));

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("Chalkline relay server listening on {}", config.addr);
    info!("WebSocket endpoint: ws://{}/ws", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Index page
async fn index() -> &'static str {
    "Chalkline Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send; `false` once the socket is gone.
async fn send(sender: &mut Sender, msg: &ServerMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to encode server message: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}

/// Parse one client frame and apply it.
fn handle_text(state: &AppState, peer: &mut Peer, text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => peer.handle(state, msg),
        Err(e) => {
            warn!("Invalid message from {}: {}", peer.id, e);
            Some(ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            })
        }
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut peer = Peer::new(Uuid::new_v4().to_string());
    info!("New connection: {}", peer.id);

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let reply = match msg {
                    Some(Ok(Message::Text(text))) => handle_text(&state, &mut peer, text.as_str()),
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => handle_text(&state, &mut peer, text),
                        Err(e) => Some(ServerMessage::Error {
                            message: format!("Binary frame is not UTF-8: {}", e),
                        }),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer.id, e);
                        break;
                    }
                };
                if let Some(reply) = reply {
                    if !send(&mut sender, &reply).await {
                        break;
                    }
                }
            }

            msg = async {
                match peer.receiver() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending::<Result<Relayed, RecvError>>().await,
                }
            } => {
                match msg {
                    Ok((from, server_msg)) => {
                        // No echo: the sender already applied its own action.
                        if from != peer.id && !send(&mut sender, &server_msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Peer {} lagged, {} messages skipped", peer.id, skipped);
                    }
                    Err(RecvError::Closed) => peer.leave(&state),
                }
            }
        }
    }

    peer.leave(&state);
    info!("Connection closed: {}", peer.id);
}
