use axum::{
    routing::{get, post},
    Router,
};

pub mod authz;
pub mod permissions;
pub mod session;
pub mod system;

/// Router for every endpoint behind the bearer-token middleware.
pub fn router() -> Router {
    Router::new()
        .route("/session", get(session::current).delete(session::logout))
        .route("/permissions", get(permissions::list))
        .route("/authz/check", post(authz::check))
        .route("/authz/require", post(authz::require))
}
