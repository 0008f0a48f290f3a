//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression,
//! and all endpoint handlers.

use std::future::Future;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use parla_core::config::ParlaConfig;
use parla_core::error::ParlaError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The relay is called from browser pages served elsewhere.
    let cors = CorsLayer::permissive();

    let relay_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/translate", post(handlers::translate))
        .route("/translate-realtime", post(handlers::translate_realtime))
        .route("/capture-failure", post(handlers::capture_failure));

    let session_routes = Router::new()
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/config", put(handlers::update_session_config))
        .route("/sessions/{id}/utterances", post(handlers::post_utterance))
        .route("/sessions/{id}/history", get(handlers::get_history))
        .route("/sessions/{id}/restart", post(handlers::restart_session));

    Router::new()
        .nest("/api", relay_routes.merge(session_routes))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Periodically drop sessions idle past the configured timeout.
pub fn spawn_session_sweeper(state: &AppState) -> tokio::task::JoinHandle<()> {
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.prune_expired() {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "expired idle sessions"),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    })
}

/// Start the HTTP server on the configured address and serve until
/// `shutdown` completes.
pub async fn start_server<F>(
    config: &ParlaConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), ParlaError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.general.host, config.general.port);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(addr = %addr, error = %e, "Failed to bind - is another instance running?");
        tracing::error!(
            "Try: PARLA_PORT={} cargo run -p parla-app",
            config.general.port.saturating_add(1)
        );
        ParlaError::Server(format!("Failed to bind {}: {}", addr, e))
    })?;

    let sweeper = spawn_session_sweeper(&state);
    let router = create_router(state);

    tracing::info!(addr = %addr, "API server listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ParlaError::Server(format!("Server error: {}", e)));
    sweeper.abort();
    served
}
