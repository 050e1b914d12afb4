//! Infrastructure layer: permission file loading and ownership storage.

pub mod config;
pub mod ownership;

pub use config::{ConfigError, load_permission_table, parse_permission_table};
pub use ownership::{InMemoryOwnershipStore, PostgresOwnershipStore};
