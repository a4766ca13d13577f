//! HTTP intake for moderation directives.
//!
//! Thin layer over `guildsync-core`: handlers deserialize a directive, gate
//! the actor, hand off to the orchestrator, and serialize the report. The
//! process stays resident so armed auto-unmute timers survive between
//! requests.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use auth::IntakeAuth;
use axum::routing::{get, post};
use axum::{middleware, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState, auth: IntakeAuth) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Directives
        .route("/api/directives/ban", post(routes::ban))
        .route("/api/directives/mute", post(routes::mute))
        .route("/api/directives/unmute", post(routes::unmute))
        .route("/api/directives/unban", post(routes::unban))
        // Introspection
        .route("/api/status", get(routes::status))
        .route("/api/communities/{id}", get(routes::community))
        .route("/api/health", get(routes::health))
        .route("/api/config", get(routes::get_config))
        .layer(middleware::from_fn_with_state(
            Arc::new(auth),
            auth::auth_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

/// Start the intake server and run until the process is stopped.
pub async fn serve(state: AppState, auth: IntakeAuth, port: u16) -> anyhow::Result<()> {
    let app = build_router(state, auth);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("moderation intake listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
