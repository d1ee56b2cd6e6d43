//! Frame — the universal message envelope on the session websocket.
//!
//! ARCHITECTURE
//! ============
//! Every websocket message is a Frame serialized as JSON text. The server
//! emits `session:*` event frames; clients send `session:set-*` request
//! frames. The gateway routes on `syscall` and reads the flat `data` map.
//!
//! DESIGN
//! ======
//! - Flat data: payload is always `Map<String, Value>`, never nested.
//! - Outbound frames are always `request` status events; there are no
//!   replies, since every command result is broadcast to everyone.
//! - Inbound frames only need `syscall` and `data`; the envelope fields get
//!   defaults so hand-written clients stay small.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{PhaseKind, SessionState};

// =============================================================================
// SYSCALLS
// =============================================================================

pub const SYSCALL_INITIAL_STATE: &str = "session:initial-state";
pub const SYSCALL_PHASE_CHANGED: &str = "session:phase-changed";
pub const SYSCALL_STATE_CHANGED: &str = "session:state-changed";
pub const SYSCALL_PLAY_STATE_CHANGED: &str = "session:play-state-changed";

pub const SYSCALL_SET_APPARATUS: &str = "session:set-apparatus";
pub const SYSCALL_SET_PLAYING: &str = "session:set-playing";

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

/// Lifecycle position of a frame in a request/response stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Request,
    Item,
    Done,
    Error,
    Cancel,
}

/// The universal message type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    #[serde(default)]
    pub ts: i64,
    #[serde(default)]
    pub from: Option<String>,
    pub syscall: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub data: Data,
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured logging of rejected input.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    /// Create a request frame. Entry point for every event.
    pub fn request(syscall: impl Into<String>, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            ts: now_ms(),
            from: None,
            syscall: syscall.into(),
            status: Status::Request,
            data,
        }
    }

    /// Full snapshot sent once to a newly connected client.
    #[must_use]
    pub fn initial_state(state: SessionState) -> Self {
        Self::request(SYSCALL_INITIAL_STATE, Data::new())
            .with_data("phase", json_of(state.phase))
            .with_data("apparatus", json_of(state.apparatus))
            .with_data("playing", state.playing)
    }

    /// Phase-only advance. Apparatus-dependent UI does not re-key on this.
    #[must_use]
    pub fn phase_changed(phase: PhaseKind) -> Self {
        Self::request(SYSCALL_PHASE_CHANGED, Data::new()).with_data("phase", json_of(phase))
    }

    #[must_use]
    pub fn state_changed(state: SessionState) -> Self {
        Self::request(SYSCALL_STATE_CHANGED, Data::new())
            .with_data("phase", json_of(state.phase))
            .with_data("apparatus", json_of(state.apparatus))
    }

    #[must_use]
    pub fn play_state_changed(playing: bool) -> Self {
        Self::request(SYSCALL_PLAY_STATE_CHANGED, Data::new()).with_data("playing", playing)
    }
}

fn json_of(value: impl Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

// =============================================================================
// BUILDERS
// =============================================================================

impl Frame {
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// ROUTING
// =============================================================================

impl Frame {
    /// Extract the syscall prefix (everything before the first ':').
    #[must_use]
    pub fn prefix(&self) -> &str {
        let Some((prefix, _)) = self.syscall.split_once(':') else {
            return &self.syscall;
        };
        prefix
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ApparatusKind;

    #[test]
    fn request_sets_fields() {
        let frame = Frame::request("session:phase-changed", Data::new());
        assert_eq!(frame.syscall, "session:phase-changed");
        assert_eq!(frame.status, Status::Request);
        assert!(frame.parent_id.is_none());
        assert!(frame.from.is_none());
        assert!(frame.ts > 0);
    }

    #[test]
    fn prefix_extraction() {
        let frame = Frame::request("session:set-playing", Data::new());
        assert_eq!(frame.prefix(), "session");

        let frame = Frame::request("noseparator", Data::new());
        assert_eq!(frame.prefix(), "noseparator");
    }

    #[test]
    fn initial_state_carries_full_snapshot() {
        let state = SessionState {
            phase: PhaseKind::Simulation,
            apparatus: ApparatusKind::ElectrokineticSaucer,
            playing: false,
        };
        let frame = Frame::initial_state(state);

        assert_eq!(frame.syscall, SYSCALL_INITIAL_STATE);
        assert_eq!(frame.data.len(), 3);
        assert_eq!(frame.data.get("phase").and_then(|v| v.as_str()), Some("simulation"));
        assert_eq!(frame.data.get("apparatus").and_then(|v| v.as_str()), Some("electrokinetic-saucer"));
        assert_eq!(frame.data.get("playing").and_then(serde_json::Value::as_bool), Some(false));
    }

    #[test]
    fn phase_changed_carries_phase_only() {
        let frame = Frame::phase_changed(PhaseKind::Deconstruction);
        assert_eq!(frame.syscall, SYSCALL_PHASE_CHANGED);
        assert_eq!(frame.data.len(), 1);
        assert_eq!(frame.data.get("phase").and_then(|v| v.as_str()), Some("deconstruction"));
    }

    #[test]
    fn state_changed_omits_playing() {
        let state = SessionState { phase: PhaseKind::Construction, apparatus: ApparatusKind::Zinsser, playing: true };
        let frame = Frame::state_changed(state);
        assert_eq!(frame.syscall, SYSCALL_STATE_CHANGED);
        assert!(!frame.data.contains_key("playing"));
        assert_eq!(frame.data.get("apparatus").and_then(|v| v.as_str()), Some("zinsser"));
        assert_eq!(frame.data.get("phase").and_then(|v| v.as_str()), Some("construction"));
    }

    #[test]
    fn play_state_changed_carries_flag() {
        let frame = Frame::play_state_changed(true).with_from("client-1");
        assert_eq!(frame.syscall, SYSCALL_PLAY_STATE_CHANGED);
        assert_eq!(frame.data.get("playing").and_then(serde_json::Value::as_bool), Some(true));
        assert_eq!(frame.from.as_deref(), Some("client-1"));
    }

    #[test]
    fn minimal_inbound_frame_gets_defaults() {
        let frame: Frame =
            serde_json::from_str(r#"{"syscall":"session:set-playing","data":{"playing":false}}"#).expect("parse");
        assert_eq!(frame.syscall, SYSCALL_SET_PLAYING);
        assert_eq!(frame.status, Status::Request);
        assert!(frame.parent_id.is_none());
        assert_eq!(frame.data.get("playing").and_then(serde_json::Value::as_bool), Some(false));
    }

    #[test]
    fn inbound_frame_without_syscall_is_rejected() {
        let parsed = serde_json::from_str::<Frame>(r#"{"data":{}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn json_round_trip() {
        let original = Frame::phase_changed(PhaseKind::Simulation).with_from("client-9");

        let json = serde_json::to_string(&original).expect("serialize");
        let restored: Frame = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.ts, original.ts);
        assert_eq!(restored.syscall, SYSCALL_PHASE_CHANGED);
        assert_eq!(restored.from.as_deref(), Some("client-9"));
        assert_eq!(restored.data.get("phase").and_then(|v| v.as_str()), Some("simulation"));
    }
}
