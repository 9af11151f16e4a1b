use axum::extract::State;
use axum::Json;

use cabinet_core::types::Snapshot;

use crate::state::AppState;

/// GET /api/master-ai/history: every recorded snapshot, oldest first.
pub async fn list_history(State(app): State<AppState>) -> Json<Vec<Snapshot>> {
    Json(app.orchestrator.list_history())
}
