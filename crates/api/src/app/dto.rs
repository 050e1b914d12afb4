use serde::Deserialize;

use kanelm_auth::AuthorizationRequest;
use kanelm_core::{ProjectId, TaskId, UserId};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /authz/check` and `POST /authz/require`.
///
/// The acting user always comes from the session, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthzCheckRequest {
    pub entity: String,
    pub action: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
}

impl AuthzCheckRequest {
    pub fn into_request(self, acting: UserId) -> AuthorizationRequest {
        AuthorizationRequest {
            entity: self.entity,
            action: self.action,
            acting_user_id: acting,
            target_user_id: self.user_id,
            target_project_id: self.project_id,
            target_task_id: self.task_id,
        }
    }
}
