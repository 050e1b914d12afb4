use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use kanelm_auth::{OwnershipStore, StoreError};
use kanelm_core::{ProjectId, TaskId, UserId};

/// In-memory ownership facts for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipStore {
    admins: RwLock<HashSet<UserId>>,
    project_owners: RwLock<HashSet<(ProjectId, UserId)>>,
    task_owners: RwLock<HashSet<(TaskId, UserId)>>,
}

impl InMemoryOwnershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_admin(&self, user: UserId, admin: bool) {
        let mut admins = self.admins.write().unwrap_or_else(PoisonError::into_inner);
        if admin {
            admins.insert(user);
        } else {
            admins.remove(&user);
        }
    }

    pub fn add_project_owner(&self, project: ProjectId, user: UserId) {
        self.project_owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((project, user));
    }

    pub fn remove_project_owner(&self, project: ProjectId, user: UserId) {
        self.project_owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(project, user));
    }

    /// Record `user` as creator or assignee of `task`.
    pub fn add_task_owner(&self, task: TaskId, user: UserId) {
        self.task_owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((task, user));
    }
}

#[async_trait]
impl OwnershipStore for InMemoryOwnershipStore {
    async fn is_admin(&self, user: UserId) -> Result<bool, StoreError> {
        let admins = self.admins.read().unwrap_or_else(PoisonError::into_inner);
        Ok(admins.contains(&user))
    }

    async fn is_project_owner(&self, project: ProjectId, user: UserId) -> Result<bool, StoreError> {
        let owners = self.project_owners.read().unwrap_or_else(PoisonError::into_inner);
        Ok(owners.contains(&(project, user)))
    }

    async fn is_task_owner_or_assignee(&self, task: TaskId, user: UserId) -> Result<bool, StoreError> {
        let owners = self.task_owners.read().unwrap_or_else(PoisonError::into_inner);
        Ok(owners.contains(&(task, user)))
    }
}
