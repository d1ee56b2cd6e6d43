use super::*;

const PHASES: [PhaseKind; 3] = [PhaseKind::Construction, PhaseKind::Simulation, PhaseKind::Deconstruction];

fn all_states() -> Vec<SessionState> {
    let mut states = Vec::new();
    for phase in PHASES {
        for apparatus in ApparatusKind::ALL {
            for playing in [true, false] {
                states.push(SessionState { phase, apparatus, playing });
            }
        }
    }
    states
}

// =============================================================================
// advance_phase
// =============================================================================

#[test]
fn advance_phase_cycles_and_keeps_apparatus() {
    for s in all_states() {
        let next = advance_phase(s);
        assert_eq!(next.phase, s.phase.next());
        assert_eq!(next.apparatus, s.apparatus);
        assert_eq!(next.playing, s.playing);
    }
}

#[test]
fn advance_phase_full_cycle_order() {
    let mut s = SessionState::new();
    let mut seen = vec![s.phase];
    for _ in 0..3 {
        s = advance_phase(s);
        seen.push(s.phase);
    }
    assert_eq!(
        seen,
        vec![PhaseKind::Construction, PhaseKind::Simulation, PhaseKind::Deconstruction, PhaseKind::Construction]
    );
}

// =============================================================================
// advance_apparatus
// =============================================================================

#[test]
fn advance_apparatus_cycles_and_resets_phase() {
    for s in all_states() {
        let next = advance_apparatus(s);
        assert_eq!(next.apparatus, s.apparatus.next());
        assert_eq!(next.phase, PhaseKind::Construction);
        assert_eq!(next.playing, s.playing);
    }
}

#[test]
fn advance_apparatus_visits_all_four_in_order() {
    let mut s = SessionState::new();
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(s.apparatus);
        s = advance_apparatus(s);
    }
    assert_eq!(seen, ApparatusKind::ALL.to_vec());
    assert_eq!(s.apparatus, ApparatusKind::ALL[0]);
}

#[test]
fn apply_tick_dispatches() {
    let s = SessionState { phase: PhaseKind::Simulation, apparatus: ApparatusKind::Zinsser, playing: true };
    assert_eq!(apply_tick(s, Tick::Phase), advance_phase(s));
    assert_eq!(apply_tick(s, Tick::Apparatus), advance_apparatus(s));
}

// =============================================================================
// apply_command
// =============================================================================

#[test]
fn set_apparatus_resets_phase() {
    let s = SessionState { phase: PhaseKind::Simulation, apparatus: ApparatusKind::FluxCapacitor, playing: true };
    let next = apply_command(s, Command::SetApparatus(ApparatusKind::Zinsser));
    assert_eq!(
        next,
        SessionState { phase: PhaseKind::Construction, apparatus: ApparatusKind::Zinsser, playing: true }
    );
}

#[test]
fn set_apparatus_to_same_value_still_resets_phase() {
    let s = SessionState { phase: PhaseKind::Deconstruction, apparatus: ApparatusKind::Zinsser, playing: false };
    let next = apply_command(s, Command::SetApparatus(ApparatusKind::Zinsser));
    assert_eq!(next.phase, PhaseKind::Construction);
    assert_eq!(next.apparatus, ApparatusKind::Zinsser);
    assert!(!next.playing);
}

#[test]
fn set_playing_only_touches_playing() {
    for s in all_states() {
        for playing in [true, false] {
            let next = apply_command(s, Command::SetPlaying(playing));
            assert_eq!(next.playing, playing);
            assert_eq!(next.phase, s.phase);
            assert_eq!(next.apparatus, s.apparatus);
        }
    }
}
