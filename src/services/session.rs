//! Session service — the single owner of session state.
//!
//! DESIGN
//! ======
//! One tokio task owns the `SessionState`, the connected-client registry and
//! the `Ticker`. Websocket tasks talk to it through a `SessionHandle`
//! (mpsc), so joins, parts, commands and timer ticks are processed strictly
//! one at a time. A state mutation and the broadcast that follows it can
//! therefore never interleave with another event, and every client sees the
//! same ordered stream.
//!
//! LIFECYCLE
//! =========
//! 1. Join → register client, send `session:initial-state` to it only
//! 2. Tick → transition, broadcast `phase-changed` / `state-changed`
//! 3. Command → transition, broadcast to all, restart ticker from zero
//! 4. Part → deregister, no broadcast
//!
//! Fan-out is best-effort: a full client queue drops that frame for that
//! client; a closed queue removes the client.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ticker::Ticker;
use super::transition::{Command, Tick, apply_command, apply_tick};
use crate::frame::{ErrorCode, Frame};
use crate::state::SessionState;

/// Capacity of the queue feeding the session task.
const SESSION_QUEUE: usize = 1024;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session task is not running")]
    Closed,
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => "E_SESSION_CLOSED",
        }
    }
}

enum SessionMsg {
    Join { client_id: Uuid, tx: mpsc::Sender<Frame> },
    Part { client_id: Uuid },
    Command { client_id: Uuid, command: Command },
    Snapshot { reply: oneshot::Sender<SessionState> },
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionMsg>,
}

impl SessionHandle {
    /// Register a client. Its first frame is the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has stopped.
    pub async fn join(&self, client_id: Uuid, tx: mpsc::Sender<Frame>) -> Result<(), SessionError> {
        self.send(SessionMsg::Join { client_id, tx }).await
    }

    /// Deregister a client.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has stopped.
    pub async fn part(&self, client_id: Uuid) -> Result<(), SessionError> {
        self.send(SessionMsg::Part { client_id }).await
    }

    /// Queue a command on behalf of a client.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has stopped.
    pub async fn command(&self, client_id: Uuid, command: Command) -> Result<(), SessionError> {
        self.send(SessionMsg::Command { client_id, command }).await
    }

    /// Read the current state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has stopped.
    pub async fn snapshot(&self) -> Result<SessionState, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMsg::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    async fn send(&self, msg: SessionMsg) -> Result<(), SessionError> {
        self.tx.send(msg).await.map_err(|_| SessionError::Closed)
    }
}

/// Spawn the session task with default state. Returns its handle and the
/// task handle; the task stops once every `SessionHandle` is dropped.
#[must_use]
pub fn spawn_session(phase_every: Duration) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(SESSION_QUEUE);
    let session = Session::new(SessionState::new(), phase_every);
    let task = tokio::spawn(session.run(rx));
    (SessionHandle { tx }, task)
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    state: SessionState,
    clients: HashMap<Uuid, mpsc::Sender<Frame>>,
    ticker: Ticker,
}

impl Session {
    /// Create a session and start its ticker according to `state.playing`.
    #[must_use]
    pub fn new(state: SessionState, phase_every: Duration) -> Self {
        let mut ticker = Ticker::new(phase_every);
        ticker.start(state.playing);
        Self { state, clients: HashMap::new(), ticker }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn on_connect(&mut self, client_id: Uuid, tx: mpsc::Sender<Frame>) {
        if let Err(e) = tx.try_send(Frame::initial_state(self.state)) {
            warn!(%client_id, error = %e, "session: initial state not delivered; client not registered");
            return;
        }
        self.clients.insert(client_id, tx);
        info!(%client_id, clients = self.client_count(), "session: client joined");
    }

    pub fn on_disconnect(&mut self, client_id: Uuid) {
        if self.clients.remove(&client_id).is_some() {
            info!(%client_id, clients = self.client_count(), "session: client left");
        }
    }

    /// Apply a client command, broadcast the result to everyone, and restart
    /// the ticker so the next tick is a full period away.
    pub fn on_command(&mut self, client_id: Uuid, command: Command) {
        self.state = apply_command(self.state, command);
        let frame = match command {
            Command::SetApparatus(_) => Frame::state_changed(self.state),
            Command::SetPlaying(_) => Frame::play_state_changed(self.state.playing),
        }
        .with_from(client_id.to_string());

        info!(
            %client_id,
            ?command,
            phase = ?self.state.phase,
            apparatus = ?self.state.apparatus,
            playing = self.state.playing,
            "session: command applied"
        );

        self.broadcast(&frame);
        self.ticker.start(self.state.playing);
        debug!(ticking = self.is_ticking(), "session: ticker restarted");
    }

    pub fn on_tick(&mut self, tick: Tick) {
        self.state = apply_tick(self.state, tick);
        let frame = match tick {
            Tick::Phase => Frame::phase_changed(self.state.phase),
            Tick::Apparatus => Frame::state_changed(self.state),
        };
        debug!(?tick, phase = ?self.state.phase, apparatus = ?self.state.apparatus, "session: tick");
        self.broadcast(&frame);
    }

    fn broadcast(&mut self, frame: &Frame) {
        self.clients.retain(|client_id, tx| match tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%client_id, syscall = %frame.syscall, "session: client queue full; dropping frame");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%client_id, "session: client queue closed; pruning");
                false
            }
        });
    }

    fn handle(&mut self, msg: SessionMsg) {
        match msg {
            SessionMsg::Join { client_id, tx } => self.on_connect(client_id, tx),
            SessionMsg::Part { client_id } => self.on_disconnect(client_id),
            SessionMsg::Command { client_id, command } => self.on_command(client_id, command),
            SessionMsg::Snapshot { reply } => {
                let _ = reply.send(self.state());
            }
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SessionMsg>) {
        info!(
            phase_ms = self.ticker.phase_every().as_millis(),
            apparatus_ms = self.ticker.apparatus_every().as_millis(),
            playing = self.state.playing,
            "session: started"
        );

        loop {
            tokio::select! {
                biased;
                tick = self.ticker.next() => self.on_tick(tick),
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.handle(msg);
                }
            }
        }

        info!("session: all handles dropped; stopping");
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
