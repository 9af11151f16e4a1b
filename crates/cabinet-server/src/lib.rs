pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use cabinet_core::config::Config;

use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Pipeline
        .route(
            "/api/master-ai/events",
            post(routes::events::process_event),
        )
        .route(
            "/api/master-ai/stream",
            get(routes::events::stream_snapshots),
        )
        .route(
            "/api/master-ai/history",
            get(routes::history::list_history),
        )
        .route("/api/master-ai/brief", get(routes::brief::get_brief))
        // Local transport
        .route(
            "/api/master-ai/subscriptions/{name}",
            post(routes::subscriptions::publish),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the decision server.
pub async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(config, listener).await
}

/// Start the decision server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(config: &Config, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::from_config(config)?);

    tracing::info!("cabinet server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
