use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cabinet_agent::AgentError;
use cabinet_core::error::CabinetError;

// ---------------------------------------------------------------------------
// AppError, the unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CabinetError::InvalidEvent(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<CabinetError>() {
            match e {
                CabinetError::InvalidEvent(_) | CabinetError::Json(_) => StatusCode::BAD_REQUEST,
                CabinetError::ConfigNotFound(_) => StatusCode::NOT_FOUND,
                CabinetError::InvalidConfig(_) | CabinetError::Io(_) | CabinetError::Yaml(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else if let Some(e) = self.0.downcast_ref::<AgentError>() {
            match e {
                AgentError::NoSubscriber(_) => StatusCode::NOT_FOUND,
                AgentError::Http(_)
                | AgentError::Status { .. }
                | AgentError::Parse { .. }
                | AgentError::MissingContent
                | AgentError::EmptyPlan => StatusCode::BAD_GATEWAY,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_event_maps_to_400() {
        let err = AppError(CabinetError::InvalidEvent("eventId is empty".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_json_maps_to_400() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError(CabinetError::Json(json_err).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_not_found_maps_to_404() {
        let err = AppError(CabinetError::ConfigNotFound("cabinet.yaml".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(CabinetError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_subscriber_maps_to_404() {
        let err = AppError(AgentError::NoSubscriber("property-events".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failure_maps_to_502() {
        let err = AppError(AgentError::EmptyPlan.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unknown_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("empty body");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
