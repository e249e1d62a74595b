//! Pooled `SQLite` connections with WAL mode and foreign keys enforced.
//!
//! `r2d2` + `r2d2_sqlite` with a customizer that applies the pragmas on
//! every new connection, so repositories can assume WAL, FK enforcement,
//! and a busy timeout regardless of which pooled handle they receive.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Tuning knobs for the connection pool.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB (default: 4096 = 4 MB).
    pub cache_size_kib: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 30_000,
            cache_size_kib: 4096,
        }
    }
}

#[derive(Debug)]
struct Pragmas {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for Pragmas {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA cache_size = -{};\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms, self.cache_size_kib
        ))?;
        Ok(())
    }
}

fn build(manager: SqliteConnectionManager, config: &StoreConfig) -> Result<ConnectionPool> {
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(Pragmas {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
        .build(manager)?;
    Ok(pool)
}

static MEMORY_POOL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Open an in-memory pool (tests and ephemeral runs).
///
/// Uses a uniquely named shared-cache database so every connection in the
/// pool sees the same store, while separate pools stay isolated. A plain
/// `:memory:` manager would give each pooled connection its own database.
pub fn open_in_memory(config: &StoreConfig) -> Result<ConnectionPool> {
    let seq = MEMORY_POOL_SEQ.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:tempo-mem-{seq}?mode=memory&cache=shared");
    build(SqliteConnectionManager::file(uri), config)
}

/// Open a file-backed pool at `path`.
pub fn open_file(path: &str, config: &StoreConfig) -> Result<ConnectionPool> {
    build(SqliteConnectionManager::file(path), config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
