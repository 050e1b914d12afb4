use chrono::{DateTime, Utc};

use kanelm_auth::Session;
use kanelm_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted into request extensions by the auth middleware; immutable after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    token: String,
    session: Session,
}

impl UserContext {
    pub fn new(token: impl Into<String>, session: Session) -> Self {
        Self {
            token: token.into(),
            session,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }

    pub fn display_name(&self) -> &str {
        &self.session.display_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.session.created_at
    }

    /// The bearer token the caller presented.
    pub fn token(&self) -> &str {
        &self.token
    }
}
