//! Per-learner module progress — the `user_progress` table.
//!
//! One row per (learner, module), created on first quiz completion and
//! updated on every subsequent one. The smoothing rule lives in
//! kana-engine; this repo only persists its output.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::ProgressRow;

/// Progress repository — stateless, every method takes `&Connection`.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Get progress for (learner, module), if any completion happened yet.
    pub fn get(conn: &Connection, user_id: &str, module_id: &str) -> Result<Option<ProgressRow>> {
        let row = conn
            .query_row(
                "SELECT user_id, module_id, percentage, completed_sessions, updated_at
                 FROM user_progress WHERE user_id = ?1 AND module_id = ?2",
                params![user_id, module_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Upsert the smoothed percentage, bumping the completion counter.
    pub fn upsert(
        conn: &Connection,
        user_id: &str,
        module_id: &str,
        percentage: f64,
        now: &str,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO user_progress (user_id, module_id, percentage, completed_sessions, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT(user_id, module_id) DO UPDATE SET
                 percentage = ?3,
                 completed_sessions = completed_sessions + 1,
                 updated_at = ?4",
            params![user_id, module_id, percentage, now],
        )?;
        Ok(())
    }

    /// All progress rows for a learner keyed by module id.
    pub fn for_user(conn: &Connection, user_id: &str) -> Result<Vec<ProgressRow>> {
        let mut stmt = conn.prepare(
            "SELECT user_id, module_id, percentage, completed_sessions, updated_at
             FROM user_progress WHERE user_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRow> {
        Ok(ProgressRow {
            user_id: row.get(0)?,
            module_id: row.get(1)?,
            percentage: row.get(2)?,
            completed_sessions: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
