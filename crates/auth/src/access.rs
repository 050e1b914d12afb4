//! The two entry points HTTP handlers use: authenticate a token, authorize a request.

use std::sync::Arc;

use thiserror::Error;

use kanelm_core::UserId;

use crate::authorize::{AuthorizationRequest, Authorizer, AuthzError};
use crate::resolver::{OwnershipStore, ResolutionError};
use crate::session::{Session, SessionCache};

/// Every way an access check can fail, folded into one enum for callers.
///
/// `Denied` is the ordinary "no". The other variants are errors the caller
/// must not present as a denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unknown or expired session token")]
    TokenNotFound,

    #[error("no permission entry for '{entity}.{action}'")]
    Configuration { entity: String, action: String },

    #[error("authorization could not be decided: {0}")]
    ResolutionFailed(ResolutionError),

    #[error("forbidden: '{entity}.{action}'")]
    Denied { entity: String, action: String },
}

impl From<AuthzError> for AccessError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Configuration { entity, action } => Self::Configuration { entity, action },
            AuthzError::Resolution(e) => Self::ResolutionFailed(e),
        }
    }
}

/// Session cache plus authorization engine, shared across request handlers.
#[derive(Debug)]
pub struct AccessControl<S> {
    sessions: Arc<SessionCache>,
    authorizer: Authorizer<S>,
}

impl<S: OwnershipStore> AccessControl<S> {
    pub fn new(sessions: Arc<SessionCache>, authorizer: Authorizer<S>) -> Self {
        Self {
            sessions,
            authorizer,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    pub fn authorizer(&self) -> &Authorizer<S> {
        &self.authorizer
    }

    pub fn authenticate(&self, token: &str) -> Option<UserId> {
        self.sessions.user_id(token)
    }

    pub fn session(&self, token: &str) -> Result<Session, AccessError> {
        self.sessions.lookup(token).ok_or(AccessError::TokenNotFound)
    }

    pub async fn authorize(&self, request: &AuthorizationRequest) -> Result<bool, AuthzError> {
        self.authorizer.is_satisfied(request).await
    }

    /// Authorize `request`, turning a negative decision into `AccessError::Denied`.
    pub async fn require(&self, request: &AuthorizationRequest) -> Result<(), AccessError> {
        if self.authorize(request).await? {
            Ok(())
        } else {
            Err(AccessError::Denied {
                entity: request.entity.clone(),
                action: request.action.clone(),
            })
        }
    }

    /// Authenticate `token`, then authorize the request `build` makes for that user.
    pub async fn require_token<F>(&self, token: &str, build: F) -> Result<UserId, AccessError>
    where
        F: FnOnce(UserId) -> AuthorizationRequest,
    {
        let user = self.authenticate(token).ok_or(AccessError::TokenNotFound)?;
        self.require(&build(user)).await?;
        Ok(user)
    }
}
