//! Schema migrations and curriculum seeding.
//!
//! Migrations are gated on `PRAGMA user_version` and applied in order
//! inside one transaction each. The curriculum seed is idempotent (`INSERT
//! OR IGNORE` keyed on stable slugs) so repeated startups are safe.

use rusqlite::Connection;

use kana_core::curriculum;

use crate::errors::Result;

const SCHEMA_V1: &str = "
    CREATE TABLE modules (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        position    INTEGER NOT NULL UNIQUE
    );

    CREATE TABLE characters (
        id          TEXT PRIMARY KEY,
        glyph       TEXT NOT NULL,
        reading     TEXT NOT NULL,
        script      TEXT NOT NULL CHECK (script IN ('hiragana', 'katakana')),
        position    INTEGER NOT NULL
    );

    CREATE TABLE module_characters (
        module_id    TEXT NOT NULL REFERENCES modules(id),
        character_id TEXT NOT NULL REFERENCES characters(id),
        position     INTEGER NOT NULL,
        PRIMARY KEY (module_id, character_id),
        UNIQUE (module_id, position)
    );

    CREATE TABLE user_character_stats (
        user_id         TEXT NOT NULL,
        character_id    TEXT NOT NULL REFERENCES characters(id),
        total_attempts  INTEGER NOT NULL DEFAULT 0,
        correct_count   INTEGER NOT NULL DEFAULT 0,
        streak          INTEGER NOT NULL DEFAULT 0,
        last_attempt_at TEXT NOT NULL,
        PRIMARY KEY (user_id, character_id),
        CHECK (correct_count <= total_attempts)
    );

    CREATE TABLE quiz_sessions (
        id           TEXT PRIMARY KEY,
        user_id      TEXT NOT NULL,
        module_id    TEXT NOT NULL REFERENCES modules(id),
        total_items  INTEGER NOT NULL,
        score        INTEGER NOT NULL DEFAULT 0,
        started_at   TEXT NOT NULL,
        completed_at TEXT,
        CHECK (score >= 0 AND score <= total_items)
    );
    CREATE INDEX idx_sessions_user ON quiz_sessions(user_id, completed_at);

    CREATE TABLE quiz_answers (
        id           TEXT PRIMARY KEY,
        session_id   TEXT NOT NULL REFERENCES quiz_sessions(id) ON DELETE CASCADE,
        character_id TEXT NOT NULL REFERENCES characters(id),
        answer_text  TEXT NOT NULL,
        is_correct   INTEGER NOT NULL,
        latency_ms   INTEGER NOT NULL DEFAULT 0,
        answered_at  TEXT NOT NULL,
        UNIQUE (session_id, character_id)
    );

    CREATE TABLE user_progress (
        user_id            TEXT NOT NULL,
        module_id          TEXT NOT NULL REFERENCES modules(id),
        percentage         REAL NOT NULL CHECK (percentage >= 0 AND percentage <= 100),
        completed_sessions INTEGER NOT NULL DEFAULT 0,
        updated_at         TEXT NOT NULL,
        PRIMARY KEY (user_id, module_id)
    );
";

/// Ordered migration scripts; index + 1 is the resulting `user_version`.
const MIGRATIONS: &[&str] = &[SCHEMA_V1];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    for (idx, script) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as i64;
        if version <= current {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(script)?;
        let _ = tx.execute_batch(&format!("PRAGMA user_version = {version}"))?;
        tx.commit()?;
        tracing::info!(version, "applied migration");
    }
    Ok(())
}

/// Seed the built-in curriculum. Idempotent.
pub fn seed_curriculum(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for module in curriculum::modules() {
        let _ = tx.execute(
            "INSERT OR IGNORE INTO modules (id, name, position) VALUES (?1, ?2, ?3)",
            rusqlite::params![module.id, module.name, module.position],
        )?;
        for (idx, ch) in module.characters.iter().enumerate() {
            let _ = tx.execute(
                "INSERT OR IGNORE INTO characters (id, glyph, reading, script, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![ch.id, ch.glyph, ch.reading, ch.script.as_str(), ch.position],
            )?;
            let _ = tx.execute(
                "INSERT OR IGNORE INTO module_characters (module_id, character_id, position)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![module.id, ch.id, (idx + 1) as i64],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn migrations_set_user_version() {
        let conn = setup();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i64);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = setup();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn seed_populates_curriculum() {
        let conn = setup();
        seed_curriculum(&conn).unwrap();

        let modules: i64 = conn
            .query_row("SELECT COUNT(*) FROM modules", [], |row| row.get(0))
            .unwrap();
        let characters: i64 = conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(modules, 10);
        assert_eq!(characters, 92);
    }

    #[test]
    fn seed_is_idempotent() {
        let conn = setup();
        seed_curriculum(&conn).unwrap();
        seed_curriculum(&conn).unwrap();
        let characters: i64 = conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(characters, 92);
    }

    #[test]
    fn duplicate_answer_violates_unique_constraint() {
        // The storage-layer backstop for the duplicate-answer guard.
        let conn = setup();
        seed_curriculum(&conn).unwrap();
        conn.execute(
            "INSERT INTO quiz_sessions (id, user_id, module_id, total_items, score, started_at)
             VALUES ('sess_x', 'u1', 'hiragana_1', 5, 0, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO quiz_answers (id, session_id, character_id, answer_text, is_correct, latency_ms, answered_at)
             VALUES ('ans_1', 'sess_x', 'hira_a', 'a', 1, 0, '2026-01-01T00:00:01Z')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO quiz_answers (id, session_id, character_id, answer_text, is_correct, latency_ms, answered_at)
             VALUES ('ans_2', 'sess_x', 'hira_a', 'i', 0, 0, '2026-01-01T00:00:02Z')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn deleting_session_cascades_answers() {
        let conn = setup();
        seed_curriculum(&conn).unwrap();
        conn.execute(
            "INSERT INTO quiz_sessions (id, user_id, module_id, total_items, score, started_at)
             VALUES ('sess_x', 'u1', 'hiragana_1', 5, 0, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO quiz_answers (id, session_id, character_id, answer_text, is_correct, latency_ms, answered_at)
             VALUES ('ans_1', 'sess_x', 'hira_a', 'a', 1, 0, '2026-01-01T00:00:01Z')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM quiz_sessions WHERE id = 'sess_x'", [])
            .unwrap();
        let answers: i64 = conn
            .query_row("SELECT COUNT(*) FROM quiz_answers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(answers, 0);
    }
}
