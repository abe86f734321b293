//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL storage for links and usage counters
//! - [`MemoryLinkRepository`] - In-process storage for single-node runs and tests

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod pool;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pool::{PoolSettings, connect_with_retry};

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
