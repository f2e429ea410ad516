//! Integration tests for duet-client.
//!
//! - `agent_tests` - one agent driven directly through its channels
//! - `session_tests` - agents talking through a real signaling server

pub mod session_tests;

use duet_server::{AppState, ServerConfig, SessionCoordinator, router};
use tracing::Level;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Starts a signaling server on a free local port.
///
/// Returns its ws url and the coordinator behind it for inspection.
pub async fn spawn_server() -> (String, SessionCoordinator) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(&ServerConfig::default());
    let coordinator = state.coordinator.clone();
    let app = router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{}/ws", addr), coordinator)
}
