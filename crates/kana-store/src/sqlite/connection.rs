//! Connection pool with the pragmas every connection needs.
//!
//! WAL for concurrent readers, foreign keys on (the answer cascade relies
//! on it), and a busy timeout so short same-database contention resolves
//! inside `SQLite` before our own retry loop kicks in.

use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::Result;

/// Pool of `SQLite` connections.
pub type ConnectionPool = r2d2::Pool<SqliteConnectionManager>;
/// One checked-out connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const INIT_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 5000;
    PRAGMA synchronous = NORMAL;
";

/// Open a pool against a database file, creating it if absent.
pub fn open_pool(path: &Path) -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch(INIT_PRAGMAS));
    Ok(r2d2::Pool::builder().max_size(8).build(manager)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_opens_and_applies_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("kana.db")).unwrap();
        let conn = pool.get().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn pool_hands_out_multiple_connections() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("kana.db")).unwrap();
        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        drop((a, b));
    }
}
