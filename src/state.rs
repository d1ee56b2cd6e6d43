//! Shared application state.
//!
//! DESIGN
//! ======
//! `SessionState` is the single authoritative record of what every viewer
//! should be showing. It is owned by the session task (see
//! `services::session`) and never shared by reference; everything else sees
//! copies. `AppState` is injected into Axum handlers via the `State`
//! extractor and only carries the handle used to talk to that task.

use serde::{Deserialize, Serialize};

use crate::services::session::SessionHandle;

// =============================================================================
// PHASE
// =============================================================================

/// Animation stage applied to the selected apparatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Construction,
    Simulation,
    Deconstruction,
}

impl PhaseKind {
    /// Next phase in the cycle. Deconstruction wraps to Construction.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Construction => Self::Simulation,
            Self::Simulation => Self::Deconstruction,
            Self::Deconstruction => Self::Construction,
        }
    }
}

// =============================================================================
// APPARATUS
// =============================================================================

/// Selectable visualization subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApparatusKind {
    BiefeldBrown,
    FluxCapacitor,
    Zinsser,
    ElectrokineticSaucer,
}

impl ApparatusKind {
    /// All apparatus in cycle order.
    pub const ALL: [ApparatusKind; 4] = [
        ApparatusKind::BiefeldBrown,
        ApparatusKind::FluxCapacitor,
        ApparatusKind::Zinsser,
        ApparatusKind::ElectrokineticSaucer,
    ];

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::BiefeldBrown => Self::FluxCapacitor,
            Self::FluxCapacitor => Self::Zinsser,
            Self::Zinsser => Self::ElectrokineticSaucer,
            Self::ElectrokineticSaucer => Self::BiefeldBrown,
        }
    }

    /// Wire name, as used in frame payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BiefeldBrown => "biefeld-brown",
            Self::FluxCapacitor => "flux-capacitor",
            Self::Zinsser => "zinsser",
            Self::ElectrokineticSaucer => "electrokinetic-saucer",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// The process-wide session record: which phase, which apparatus, and
/// whether the timers are running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: PhaseKind,
    pub apparatus: ApparatusKind,
    pub playing: bool,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: PhaseKind::Construction, apparatus: ApparatusKind::ALL[0], playing: true }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the session handle is a cheap channel clone.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    /// Capacity of each client's outbound frame queue.
    pub client_queue: usize,
}

impl AppState {
    #[must_use]
    pub fn new(session: SessionHandle, client_queue: usize) -> Self {
        Self { session, client_queue }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
