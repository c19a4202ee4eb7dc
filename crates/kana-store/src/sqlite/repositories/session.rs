//! Quiz session repository — CRUD for the `quiz_sessions` table.
//!
//! Sessions move `active → completed` (completion timestamp set) or
//! `active → abandoned` (row deleted, answers cascade). Ownership is part
//! of every lookup: a session fetched with the wrong user simply does not
//! exist from that caller's perspective.

use kana_core::ids::new_session_id;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::SessionRow;

/// Options for creating a session.
pub struct CreateSessionOptions<'a> {
    /// Owning learner.
    pub user_id: &'a str,
    /// Target module.
    pub module_id: &'a str,
    /// Number of generated questions.
    pub total_items: i64,
}

/// Session repository — stateless, every method takes `&Connection`.
pub struct SessionRepo;

impl SessionRepo {
    /// Create an active session with score 0.
    pub fn create(conn: &Connection, opts: &CreateSessionOptions<'_>) -> Result<SessionRow> {
        let id = new_session_id();
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO quiz_sessions (id, user_id, module_id, total_items, score, started_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![id, opts.user_id, opts.module_id, opts.total_items, now],
        )?;
        Ok(SessionRow {
            id,
            user_id: opts.user_id.to_string(),
            module_id: opts.module_id.to_string(),
            total_items: opts.total_items,
            score: 0,
            started_at: now,
            completed_at: None,
        })
    }

    /// Get a session owned by `user_id`.
    pub fn get_owned(
        conn: &Connection,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<SessionRow>> {
        let row = conn
            .query_row(
                "SELECT id, user_id, module_id, total_items, score, started_at, completed_at
                 FROM quiz_sessions WHERE id = ?1 AND user_id = ?2",
                params![session_id, user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Add `delta` to the running score.
    pub fn add_score(conn: &Connection, session_id: &str, delta: i64) -> Result<()> {
        let _ = conn.execute(
            "UPDATE quiz_sessions SET score = score + ?1 WHERE id = ?2",
            params![delta, session_id],
        )?;
        Ok(())
    }

    /// Set the score outright (batch path).
    pub fn set_score(conn: &Connection, session_id: &str, score: i64) -> Result<()> {
        let _ = conn.execute(
            "UPDATE quiz_sessions SET score = ?1 WHERE id = ?2",
            params![score, session_id],
        )?;
        Ok(())
    }

    /// Set the completion timestamp. Returns `false` if already completed.
    pub fn complete(conn: &Connection, session_id: &str, now: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE quiz_sessions SET completed_at = ?1
             WHERE id = ?2 AND completed_at IS NULL",
            params![now, session_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a session (answers cascade). Returns `true` if a row went away.
    pub fn delete(conn: &Connection, session_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM quiz_sessions WHERE id = ?1",
            params![session_id],
        )?;
        Ok(changed > 0)
    }

    /// Count completed sessions for (learner, module).
    pub fn count_completed(conn: &Connection, user_id: &str, module_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quiz_sessions
             WHERE user_id = ?1 AND module_id = ?2 AND completed_at IS NOT NULL",
            params![user_id, module_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count all completed sessions for a learner.
    pub fn count_all_completed(conn: &Connection, user_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quiz_sessions
             WHERE user_id = ?1 AND completed_at IS NOT NULL",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Completed sessions, most recent first.
    pub fn history(conn: &Connection, user_id: &str, limit: i64) -> Result<Vec<SessionRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, module_id, total_items, score, started_at, completed_at
             FROM quiz_sessions
             WHERE user_id = ?1 AND completed_at IS NOT NULL
             ORDER BY completed_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
        Ok(SessionRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            module_id: row.get(2)?,
            total_items: row.get(3)?,
            score: row.get(4)?,
            started_at: row.get(5)?,
            completed_at: row.get(6)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
