use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::services::AppServices;
use crate::context::UserContext;

pub async fn current(Extension(user): Extension<UserContext>) -> impl IntoResponse {
    Json(json!({
        "user_id": user.user_id(),
        "display_name": user.display_name(),
        "created_at": user.created_at(),
    }))
}

/// Drop the caller's token. Repeating the call is harmless.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> StatusCode {
    if services.sessions().delete(user.token()).is_some() {
        tracing::info!(user_id = %user.user_id(), "session closed");
    }
    StatusCode::NO_CONTENT
}
