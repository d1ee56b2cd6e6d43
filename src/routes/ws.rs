//! WebSocket handler — session event relay and command intake.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, joins the session task, and enters a
//! `select!` loop:
//! - Incoming client frames → parse into a `Command` → session task
//! - Frames queued by the session task → forward to client
//!
//! The handler never touches session state. Commands are applied and
//! broadcast by the session task, so the sender learns the outcome from the
//! same broadcast every other client receives.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join; the session queues `session:initial-state`
//! 2. Client sends `session:set-*` frames → parse → session command
//! 3. Close → part
//!
//! Malformed or unknown inbound frames are logged and dropped. No error
//! frame is sent back.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{ErrorCode, Frame, SYSCALL_SET_APPARATUS, SYSCALL_SET_PLAYING, Status};
use crate::services::transition::Command;
use crate::state::{AppState, ApparatusKind};

// =============================================================================
// COMMAND PARSING
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),
    #[error("unknown session op: {0}")]
    UnknownOp(String),
    #[error("expected request status, got {0:?}")]
    NotRequest(Status),
    #[error("{0} required")]
    MissingField(&'static str),
    #[error("unknown apparatus: {0}")]
    UnknownApparatus(String),
}

impl ErrorCode for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPrefix(_) => "E_UNKNOWN_PREFIX",
            Self::UnknownOp(_) => "E_UNKNOWN_OP",
            Self::NotRequest(_) => "E_NOT_REQUEST",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::UnknownApparatus(_) => "E_UNKNOWN_APPARATUS",
        }
    }
}

/// Translate an inbound frame into a session command.
///
/// # Errors
///
/// Returns a `CommandError` for anything other than a well-formed
/// `session:set-apparatus` or `session:set-playing` request.
pub fn parse_command(req: &Frame) -> Result<Command, CommandError> {
    if req.prefix() != "session" {
        return Err(CommandError::UnknownPrefix(req.prefix().to_string()));
    }
    if req.status != Status::Request {
        return Err(CommandError::NotRequest(req.status));
    }

    match req.syscall.as_str() {
        SYSCALL_SET_APPARATUS => {
            let raw = req
                .data
                .get("apparatus")
                .and_then(|v| v.as_str())
                .ok_or(CommandError::MissingField("apparatus"))?;
            let kind = ApparatusKind::parse(raw).ok_or_else(|| CommandError::UnknownApparatus(raw.to_string()))?;
            Ok(Command::SetApparatus(kind))
        }
        SYSCALL_SET_PLAYING => {
            let playing = req
                .data
                .get("playing")
                .and_then(serde_json::Value::as_bool)
                .ok_or(CommandError::MissingField("playing"))?;
            Ok(Command::SetPlaying(playing))
        }
        other => Err(CommandError::UnknownOp(other.to_string())),
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for frames queued by the session task.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.client_queue);

    if let Err(e) = state.session.join(client_id, client_tx).await {
        warn!(%client_id, code = e.error_code(), error = %e, "ws: join failed");
        return;
    }

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => process_inbound_text(&state, client_id, &text).await,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                let Some(frame) = frame else { break };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = state.session.part(client_id).await;
    info!(%client_id, "ws: client disconnected");
}

/// Parse one inbound text frame and hand the command to the session task.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) {
    let req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return;
        }
    };

    let command = match parse_command(&req) {
        Ok(c) => c,
        Err(e) => {
            warn!(%client_id, id = %req.id, syscall = %req.syscall, code = e.error_code(), error = %e, "ws: command rejected");
            return;
        }
    };

    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv command");
    if let Err(e) = state.session.command(client_id, command).await {
        warn!(%client_id, code = e.error_code(), error = %e, "ws: command not delivered");
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    debug!(id = %frame.id, syscall = %frame.syscall, "ws: send frame");
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
