//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::infrastructure::store::InMemoryRoomStore;

use super::handler::websocket_handler;
use super::http::{autocomplete, create_room, get_room_detail, health_check};
use super::signal::shutdown_signal;
use super::state::AppState;

/// Build the application router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket endpoint
        .route("/ws/{room_id}", get(websocket_handler))
        // HTTP endpoints
        .route("/api/health", get(health_check))
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/autocomplete", post(autocomplete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the collaboration server.
///
/// # Arguments
///
/// * `host` - The host address to bind to (e.g., "127.0.0.1")
/// * `port` - The port number to bind to (e.g., 8080)
pub async fn run_server(host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(Arc::new(InMemoryRoomStore::new())));
    let app = router(state);

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(
        "Collaboration server listening on {}",
        listener.local_addr()?
    );
    tracing::info!("Connect to: ws://{}/ws/{{room_id}}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
