//! gridclip-db: SQLite-backed persistence for the log cache tiers.
//!
//! Provides connection pooling, embedded migrations, and the tier query
//! module. Each cache tier is one key-value record holding a JSON
//! [`gridclip_core::LogSnapshot`] document.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{get_conn, init_memory_pool, init_pool, DbPool, PooledConnection};
pub use queries::tiers::Tier;
