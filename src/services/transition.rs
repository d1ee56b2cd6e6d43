//! Transition engine — pure session state transitions.
//!
//! DESIGN
//! ======
//! Every function here takes a `SessionState` by value and returns the next
//! one. Nothing is stored, sent, or scheduled; the session task decides what
//! to broadcast and when to restart timers. Inputs are closed enums, so
//! there is no failure path.
//!
//! Apparatus changes always restart the phase cycle at Construction, whether
//! they come from the apparatus timer or from a client command.

use crate::state::{ApparatusKind, PhaseKind, SessionState};

/// Timer-driven transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Phase,
    Apparatus,
}

/// External command accepted from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetApparatus(ApparatusKind),
    SetPlaying(bool),
}

#[must_use]
pub fn advance_phase(state: SessionState) -> SessionState {
    SessionState { phase: state.phase.next(), ..state }
}

#[must_use]
pub fn advance_apparatus(state: SessionState) -> SessionState {
    SessionState { phase: PhaseKind::Construction, apparatus: state.apparatus.next(), ..state }
}

#[must_use]
pub fn apply_tick(state: SessionState, tick: Tick) -> SessionState {
    match tick {
        Tick::Phase => advance_phase(state),
        Tick::Apparatus => advance_apparatus(state),
    }
}

#[must_use]
pub fn apply_command(state: SessionState, command: Command) -> SessionState {
    match command {
        Command::SetApparatus(apparatus) => SessionState { phase: PhaseKind::Construction, apparatus, ..state },
        Command::SetPlaying(playing) => SessionState { playing, ..state },
    }
}

#[cfg(test)]
#[path = "transition_test.rs"]
mod tests;
