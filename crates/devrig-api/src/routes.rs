//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use devrig_core::config::DevrigConfig;
use devrig_core::error::DevrigError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Allow browser tooling served from the API's own localhost origins.
    let port = state.config.lock().map(|c| c.api.port).unwrap_or(3040);
    let origins: Vec<HeaderValue> = ["127.0.0.1", "localhost"]
        .iter()
        .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/groups/validate", post(handlers::validate_group))
        .route("/groups/run", post(handlers::run_group))
        .route("/groups/{id}/status", get(handlers::group_status))
        .route("/groups/events", get(handlers::group_events))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(config: &DevrigConfig, state: AppState) -> Result<(), DevrigError> {
    let addr = format!("{}:{}", config.api.bind_address, config.api.port);
    let router = create_router(state);

    tracing::info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DevrigError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| DevrigError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
