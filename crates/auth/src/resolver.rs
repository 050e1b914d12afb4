//! Held-role resolution against the ownership store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use kanelm_core::{ProjectId, TaskId, UserId};

use crate::authorize::AuthorizationRequest;
use crate::roles::{self, RoleSet};

/// Failure reported by an ownership store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// The ownership predicates the resolver needs from storage.
///
/// Implementations must report failures as errors. Returning `Ok(false)` on a
/// failed query would silently drop a role.
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    async fn is_admin(&self, user: UserId) -> Result<bool, StoreError>;

    async fn is_project_owner(&self, project: ProjectId, user: UserId) -> Result<bool, StoreError>;

    async fn is_task_owner_or_assignee(&self, task: TaskId, user: UserId) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> OwnershipStore for Arc<S>
where
    S: OwnershipStore + ?Sized,
{
    async fn is_admin(&self, user: UserId) -> Result<bool, StoreError> {
        (**self).is_admin(user).await
    }

    async fn is_project_owner(&self, project: ProjectId, user: UserId) -> Result<bool, StoreError> {
        (**self).is_project_owner(project, user).await
    }

    async fn is_task_owner_or_assignee(&self, task: TaskId, user: UserId) -> Result<bool, StoreError> {
        (**self).is_task_owner_or_assignee(task, user).await
    }
}

/// Which ownership predicate was being evaluated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Predicate {
    Admin,
    ProjectOwner,
    TaskOwnerOrAssignee,
}

impl core::fmt::Display for Predicate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Predicate::Admin => "is_admin",
            Predicate::ProjectOwner => "is_project_owner",
            Predicate::TaskOwnerOrAssignee => "is_task_owner_or_assignee",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("{predicate} failed: {source}")]
    Storage {
        predicate: Predicate,
        #[source]
        source: StoreError,
    },

    #[error("{predicate} timed out after {timeout:?}")]
    TimedOut { predicate: Predicate, timeout: Duration },

    #[error("role resolution cancelled")]
    Cancelled,
}

/// Computes the roles an acting user holds for one request.
///
/// Nothing is cached: ownership can change between requests.
#[derive(Debug, Clone)]
pub struct RoleResolver<S> {
    store: S,
    query_timeout: Option<Duration>,
}

impl<S: OwnershipStore> RoleResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            query_timeout: None,
        }
    }

    /// Bound every predicate query by `timeout`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn resolve(&self, request: &AuthorizationRequest) -> Result<RoleSet, ResolutionError> {
        self.resolve_until(request, &CancellationToken::new()).await
    }

    /// Resolve held roles, giving up as soon as `cancel` fires.
    ///
    /// Checks run in order: admin, user owner, project owner, task owner. Only
    /// targets present on the request are checked.
    pub async fn resolve_until(
        &self,
        request: &AuthorizationRequest,
        cancel: &CancellationToken,
    ) -> Result<RoleSet, ResolutionError> {
        let acting = request.acting_user_id;
        let mut held = RoleSet::new();

        if self
            .check(Predicate::Admin, cancel, self.store.is_admin(acting))
            .await?
        {
            held.insert(roles::ADMIN);
        }

        if request.target_user_id == Some(acting) {
            held.insert(roles::USER_OWNER);
        }

        if let Some(project) = request.target_project_id {
            if self
                .check(
                    Predicate::ProjectOwner,
                    cancel,
                    self.store.is_project_owner(project, acting),
                )
                .await?
            {
                held.insert(roles::PROJECT_OWNER);
            }
        }

        if let Some(task) = request.target_task_id {
            if self
                .check(
                    Predicate::TaskOwnerOrAssignee,
                    cancel,
                    self.store.is_task_owner_or_assignee(task, acting),
                )
                .await?
            {
                held.insert(roles::TASK_OWNER);
            }
        }

        Ok(held)
    }

    async fn check<F>(
        &self,
        predicate: Predicate,
        cancel: &CancellationToken,
        query: F,
    ) -> Result<bool, ResolutionError>
    where
        F: Future<Output = Result<bool, StoreError>>,
    {
        if cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }

        let outcome = match self.query_timeout {
            Some(timeout) => tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ResolutionError::Cancelled),
                res = tokio::time::timeout(timeout, query) => {
                    res.map_err(|_| ResolutionError::TimedOut { predicate, timeout })?
                }
            },
            None => tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ResolutionError::Cancelled),
                res = query => res,
            },
        };

        outcome.map_err(|source| ResolutionError::Storage { predicate, source })
    }
}
