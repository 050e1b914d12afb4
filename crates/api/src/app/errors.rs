use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use kanelm_auth::{AccessError, ResolutionError};

pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err {
        AccessError::TokenNotFound => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        AccessError::Denied { .. } => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        AccessError::Configuration { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "misconfigured",
            err.to_string(),
        ),
        AccessError::ResolutionFailed(ResolutionError::TimedOut { .. }) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "storage_timeout",
            err.to_string(),
        ),
        AccessError::ResolutionFailed(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "storage_error",
            err.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
