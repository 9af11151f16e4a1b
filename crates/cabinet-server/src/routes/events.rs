use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use cabinet_agent::Report;
use cabinet_core::types::LifecycleEvent;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/master-ai/events: run one lifecycle event through the pipeline.
///
/// The body is decoded with the same rules as bus deliveries, so legacy field
/// names are accepted and blank identifiers are a 400.
pub async fn process_event(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<Report>, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("request body is empty"));
    }
    let event = LifecycleEvent::from_slice(&body)?;
    let report = app.orchestrator.report(&event).await;
    Ok(Json(report))
}

/// GET /api/master-ai/stream: SSE stream emitting `snapshot` for every
/// decision as it is recorded.
pub async fn stream_snapshots(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.orchestrator.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .and_then(|snapshot| Event::default().event("snapshot").json_data(&snapshot).ok())
            .map(Ok::<Event, Infallible>)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
