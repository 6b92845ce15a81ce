//! Database connection pool management.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use gridclip_core::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a pool backed by the given SQLite file, creating the file
/// and running pending migrations as needed.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));
    build_pool(manager, 4)
}

/// Initialize an in-memory pool for testing. The database is lost when the
/// pool is dropped.
///
/// Capped at one connection: each `:memory:` connection is its own
/// database, so a larger pool would hand out disjoint stores.
pub fn init_memory_pool() -> Result<DbPool> {
    build_pool(SqliteConnectionManager::memory(), 1)
}

fn build_pool(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {e}")))?;
    migrations::run_migrations(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool, converting the r2d2 error into the
/// common error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}
