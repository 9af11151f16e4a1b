use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/master-ai/subscriptions/{name}: hand a raw payload to the
/// subscription's listener, as the transport would. The payload is not
/// validated here; malformed events are logged and acknowledged by the
/// listener.
pub async fn publish(
    State(app): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    app.bus.publish_raw(&name, body.to_vec())?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "subscription": name, "accepted": true })),
    ))
}
