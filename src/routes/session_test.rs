use super::*;
use crate::services::session::spawn_session;
use crate::services::transition::Command;
use crate::state::{ApparatusKind, PhaseKind};
use std::time::Duration;
use uuid::Uuid;

const PHASE: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn get_session_returns_defaults() {
    let (session, _task) = spawn_session(PHASE);
    let state = AppState::new(session, 8);

    let Json(snapshot) = get_session(State(state)).await.expect("snapshot");
    assert_eq!(snapshot, SessionState::new());
}

#[tokio::test]
async fn get_session_reflects_commands() {
    let (session, _task) = spawn_session(PHASE);
    session
        .command(Uuid::new_v4(), Command::SetApparatus(ApparatusKind::Zinsser))
        .await
        .unwrap();
    session.command(Uuid::new_v4(), Command::SetPlaying(false)).await.unwrap();
    let state = AppState::new(session, 8);

    let Json(snapshot) = get_session(State(state)).await.expect("snapshot");
    assert_eq!(
        snapshot,
        SessionState { phase: PhaseKind::Construction, apparatus: ApparatusKind::Zinsser, playing: false }
    );
}

#[tokio::test]
async fn get_session_unavailable_when_task_stopped() {
    let (session, task) = spawn_session(PHASE);
    task.abort();
    let _ = task.await;
    let state = AppState::new(session, 8);

    let err = get_session(State(state)).await.unwrap_err();
    assert_eq!(err, StatusCode::SERVICE_UNAVAILABLE);
}
