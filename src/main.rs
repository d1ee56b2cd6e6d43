mod config;
mod frame;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");

    // Spawn the session task; it owns all shared state and both timers.
    let (session, _session_task) = services::session::spawn_session(config.phase_duration);
    let state = state::AppState::new(session, config.client_queue);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(
        port = config.port,
        phase_ms = config.phase_duration.as_millis(),
        path = routes::WS_PATH,
        "rainlab-sync listening"
    );
    axum::serve(listener, app).await.expect("server failed");
}
