//! Stateless per-table repositories. Every method takes `&Connection`;
//! transaction scope is the caller's responsibility.

pub mod answer;
pub mod character;
pub mod module;
pub mod progress;
pub mod session;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    use crate::sqlite::migrations::{run_migrations, seed_curriculum};

    /// In-memory database with schema and curriculum, for repo tests.
    pub fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        seed_curriculum(&conn).unwrap();
        conn
    }
}
