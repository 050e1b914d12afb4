use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use kanelm_core::{ProjectId, TaskId, UserId};

use crate::permissions::PermissionTable;
use crate::resolver::{OwnershipStore, ResolutionError, RoleResolver};

/// One "may this user do this?" question.
///
/// Only the targets relevant to the entity should be set; the resolver runs an
/// ownership check for each target that is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub entity: String,
    pub action: String,
    pub acting_user_id: UserId,
    pub target_user_id: Option<UserId>,
    pub target_project_id: Option<ProjectId>,
    pub target_task_id: Option<TaskId>,
}

impl AuthorizationRequest {
    pub fn new(entity: impl Into<String>, action: impl Into<String>, acting_user_id: UserId) -> Self {
        Self {
            entity: entity.into(),
            action: action.into(),
            acting_user_id,
            target_user_id: None,
            target_project_id: None,
            target_task_id: None,
        }
    }

    pub fn with_target_user(mut self, user: UserId) -> Self {
        self.target_user_id = Some(user);
        self
    }

    pub fn with_project(mut self, project: ProjectId) -> Self {
        self.target_project_id = Some(project);
        self
    }

    pub fn with_task(mut self, task: TaskId) -> Self {
        self.target_task_id = Some(task);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The `(entity, action)` pair has no permission entry. This is a server
    /// misconfiguration, not a denial.
    #[error("no permission entry for '{entity}.{action}'")]
    Configuration { entity: String, action: String },

    #[error("role resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Table-driven authorization engine.
///
/// A request is satisfied iff the roles the acting user holds intersect the
/// roles the table permits. `admin` gets no special treatment: it only helps
/// when the table lists it.
#[derive(Debug, Clone)]
pub struct Authorizer<S> {
    table: Arc<PermissionTable>,
    resolver: RoleResolver<S>,
}

impl<S: OwnershipStore> Authorizer<S> {
    pub fn new(table: Arc<PermissionTable>, resolver: RoleResolver<S>) -> Self {
        Self { table, resolver }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    pub fn resolver(&self) -> &RoleResolver<S> {
        &self.resolver
    }

    pub async fn is_satisfied(&self, request: &AuthorizationRequest) -> Result<bool, AuthzError> {
        self.is_satisfied_until(request, &CancellationToken::new()).await
    }

    /// Decide `request`, aborting role resolution once `cancel` fires.
    ///
    /// The table is consulted first, so a missing entry never touches storage.
    pub async fn is_satisfied_until(
        &self,
        request: &AuthorizationRequest,
        cancel: &CancellationToken,
    ) -> Result<bool, AuthzError> {
        let permitted = self
            .table
            .lookup(&request.entity, &request.action)
            .ok_or_else(|| AuthzError::Configuration {
                entity: request.entity.clone(),
                action: request.action.clone(),
            })?;

        let held = self.resolver.resolve_until(request, cancel).await?;

        Ok(held.intersects(permitted))
    }
}
