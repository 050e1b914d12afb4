use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors::json_error;
use crate::app::services::SharedAccess;
use crate::context::UserContext;

#[derive(Clone)]
pub struct AuthState {
    pub access: SharedAccess,
}

/// Resolve the bearer token to a cached session or reject with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token");
    };

    let session = match state.access.session(token) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("rejecting request: {e}");
            return json_error(StatusCode::UNAUTHORIZED, "unauthenticated", e.to_string());
        }
    };

    let ctx = UserContext::new(token, session);
    req.extensions_mut().insert(ctx);

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}
