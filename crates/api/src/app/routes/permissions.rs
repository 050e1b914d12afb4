use std::sync::Arc;

use axum::{extract::Extension, Json};

use kanelm_auth::PermissionTable;

use crate::app::services::AppServices;

/// The loaded permission table, `entity -> action -> [role]`.
pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> Json<PermissionTable> {
    Json(services.access.authorizer().table().clone())
}
