//! `kanelm-core`: identifiers shared by every Kanelm crate.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{ProjectId, TaskId, UserId};
