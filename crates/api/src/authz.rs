//! API-side authorization guard.
//!
//! Handlers call these before touching storage. Outcomes are logged here; the
//! auth core itself stays silent.

use kanelm_auth::{AccessError, AuthorizationRequest};

use crate::app::services::SharedAccess;
use crate::context::UserContext;

/// Decide `request` for the calling user.
///
/// `Ok(false)` is a denial; `Err` is a failure to decide.
pub async fn check(
    access: &SharedAccess,
    user: &UserContext,
    request: &AuthorizationRequest,
) -> Result<bool, AccessError> {
    let outcome = access.authorize(request).await.map_err(AccessError::from);
    match &outcome {
        Ok(false) => log_denied(user, request),
        Ok(true) => {}
        Err(e) => log_failure(user, e),
    }
    outcome
}

/// Like [`check`], but a denial becomes [`AccessError::Denied`].
pub async fn require(
    access: &SharedAccess,
    user: &UserContext,
    request: &AuthorizationRequest,
) -> Result<(), AccessError> {
    access.require(request).await.inspect_err(|e| match e {
        AccessError::Denied { .. } => log_denied(user, request),
        other => log_failure(user, other),
    })
}

fn log_denied(user: &UserContext, request: &AuthorizationRequest) {
    tracing::debug!(
        user_id = %user.user_id(),
        entity = %request.entity,
        action = %request.action,
        "authorization denied"
    );
}

fn log_failure(user: &UserContext, e: &AccessError) {
    match e {
        AccessError::Configuration { .. } => tracing::error!("permission table misconfigured: {e}"),
        _ => tracing::warn!(user_id = %user.user_id(), "authorization failed: {e}"),
    }
}
