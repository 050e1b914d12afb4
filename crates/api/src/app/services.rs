//! Service wiring: permission table, ownership store, session cache.

use std::sync::Arc;

use kanelm_auth::{
    AccessControl, Authorizer, OwnershipStore, PermissionTable, RoleResolver, SessionCache,
};

use crate::config::AppConfig;

/// Ownership store chosen at startup (Postgres or in-memory).
pub type DynOwnershipStore = Arc<dyn OwnershipStore>;

/// Access control as shared by handlers and middleware.
pub type SharedAccess = Arc<AccessControl<DynOwnershipStore>>;

#[derive(Clone)]
pub struct AppServices {
    pub access: SharedAccess,
}

impl AppServices {
    pub fn new(table: PermissionTable, store: DynOwnershipStore, config: &AppConfig) -> Self {
        let mut resolver = RoleResolver::new(store);
        if let Some(timeout) = config.query_timeout {
            resolver = resolver.with_query_timeout(timeout);
        }

        let authorizer = Authorizer::new(Arc::new(table), resolver);
        let sessions = Arc::new(SessionCache::new());

        Self {
            access: Arc::new(AccessControl::new(sessions, authorizer)),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        self.access.sessions()
    }
}
