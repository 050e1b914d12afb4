//! HTTP API: router, bearer-token middleware, and server configuration.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
