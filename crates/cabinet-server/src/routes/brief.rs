use axum::extract::State;
use axum::Json;

use cabinet_core::brief::Brief;

use crate::state::AppState;

/// GET /api/master-ai/brief: portfolio brief, independent of any event.
pub async fn get_brief(State(app): State<AppState>) -> Json<Brief> {
    Json(app.orchestrator.portfolio_brief().await)
}
