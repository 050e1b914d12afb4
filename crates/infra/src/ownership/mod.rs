//! Ownership predicate stores backing the role resolver.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOwnershipStore;
pub use postgres::PostgresOwnershipStore;
