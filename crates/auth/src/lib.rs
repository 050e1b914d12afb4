//! `kanelm-auth`: session cache and table-driven authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: ownership
//! facts come in through [`OwnershipStore`], the permission table through
//! [`PermissionTable::from_config`].

pub mod access;
pub mod authorize;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod session;

pub use access::{AccessControl, AccessError};
pub use authorize::{AuthorizationRequest, Authorizer, AuthzError};
pub use permissions::{PermissionConfig, PermissionTable};
pub use resolver::{OwnershipStore, Predicate, ResolutionError, RoleResolver, StoreError};
pub use roles::{Role, RoleSet};
pub use session::{Session, SessionCache, SessionConfig};
