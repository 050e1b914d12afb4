use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use kanelm_auth::AuthorizationRequest;

use crate::app::dto::AuthzCheckRequest;
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::UserContext;

/// POST /authz/check - evaluate a request for the caller and report the decision.
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<AuthzCheckRequest>,
) -> Response {
    let request: AuthorizationRequest = body.into_request(user.user_id());

    match authz::check(&services.access, &user, &request).await {
        Ok(allowed) => Json(json!({
            "entity": request.entity,
            "action": request.action,
            "allowed": allowed,
        }))
        .into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}

/// POST /authz/require - 204 when allowed, 403 when denied.
pub async fn require(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<AuthzCheckRequest>,
) -> Response {
    let request = body.into_request(user.user_id());

    match authz::require(&services.access, &user, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}
