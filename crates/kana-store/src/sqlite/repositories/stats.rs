//! Per-learner character statistics — the `user_character_stats` table.
//!
//! Rows are created on first answer and mutated on every subsequent answer
//! for that character; they are never deleted. The streak column resets to
//! zero on any incorrect answer and increments on correct ones.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::StatsRow;

/// Stats repository — stateless, every method takes `&Connection`.
pub struct StatsRepo;

impl StatsRepo {
    /// Get stats for one (learner, character), if any attempts exist.
    pub fn get(conn: &Connection, user_id: &str, character_id: &str) -> Result<Option<StatsRow>> {
        let row = conn
            .query_row(
                "SELECT user_id, character_id, total_attempts, correct_count, streak, last_attempt_at
                 FROM user_character_stats WHERE user_id = ?1 AND character_id = ?2",
                params![user_id, character_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Stats for every character of a module the learner has attempted.
    pub fn for_module(conn: &Connection, user_id: &str, module_id: &str) -> Result<Vec<StatsRow>> {
        let mut stmt = conn.prepare(
            "SELECT s.user_id, s.character_id, s.total_attempts, s.correct_count, s.streak, s.last_attempt_at
             FROM user_character_stats s
             JOIN module_characters mc ON mc.character_id = s.character_id
             WHERE s.user_id = ?1 AND mc.module_id = ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, module_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fold one answer into the stats row (insert on first attempt).
    ///
    /// Correct: attempts+1, correct+1, streak+1. Incorrect: attempts+1,
    /// streak reset to 0.
    pub fn record_answer(
        conn: &Connection,
        user_id: &str,
        character_id: &str,
        is_correct: bool,
        now: &str,
    ) -> Result<()> {
        let correct = i64::from(is_correct);
        let _ = conn.execute(
            "INSERT INTO user_character_stats
                 (user_id, character_id, total_attempts, correct_count, streak, last_attempt_at)
             VALUES (?1, ?2, 1, ?3, ?3, ?4)
             ON CONFLICT(user_id, character_id) DO UPDATE SET
                 total_attempts  = total_attempts + 1,
                 correct_count   = correct_count + ?3,
                 streak          = CASE WHEN ?3 = 1 THEN streak + 1 ELSE 0 END,
                 last_attempt_at = ?4",
            params![user_id, character_id, correct, now],
        )?;
        Ok(())
    }

    /// Totals across all characters: (attempts, correct).
    pub fn totals(conn: &Connection, user_id: &str) -> Result<(i64, i64)> {
        let row = conn.query_row(
            "SELECT COALESCE(SUM(total_attempts), 0), COALESCE(SUM(correct_count), 0)
             FROM user_character_stats WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(row)
    }

    /// Attempted characters with accuracy below `threshold`, weakest first.
    pub fn weakest(
        conn: &Connection,
        user_id: &str,
        threshold: f64,
        limit: i64,
    ) -> Result<Vec<StatsRow>> {
        let mut stmt = conn.prepare(
            "SELECT user_id, character_id, total_attempts, correct_count, streak, last_attempt_at
             FROM user_character_stats
             WHERE user_id = ?1
               AND total_attempts > 0
               AND CAST(correct_count AS REAL) / total_attempts < ?2
             ORDER BY CAST(correct_count AS REAL) / total_attempts ASC, total_attempts DESC
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![user_id, threshold, limit], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatsRow> {
        Ok(StatsRow {
            user_id: row.get(0)?,
            character_id: row.get(1)?,
            total_attempts: row.get(2)?,
            correct_count: row.get(3)?,
            streak: row.get(4)?,
            last_attempt_at: row.get(5)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::repositories::test_support::setup;

    const NOW: &str = "2026-01-01T00:00:00Z";

    #[test]
    fn first_answer_creates_row() {
        let conn = setup();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        let stats = StatsRepo::get(&conn, "u1", "hira_a").unwrap().unwrap();
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.correct_count, 1);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn streak_increments_on_correct() {
        let conn = setup();
        for _ in 0..3 {
            StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        }
        let stats = StatsRepo::get(&conn, "u1", "hira_a").unwrap().unwrap();
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.correct_count, 3);
    }

    #[test]
    fn streak_resets_on_miss() {
        let conn = setup();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_a", false, NOW).unwrap();
        let stats = StatsRepo::get(&conn, "u1", "hira_a").unwrap().unwrap();
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.correct_count, 2);
    }

    #[test]
    fn stats_are_per_user() {
        let conn = setup();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        assert!(StatsRepo::get(&conn, "u2", "hira_a").unwrap().is_none());
    }

    #[test]
    fn for_module_filters_by_membership() {
        let conn = setup();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_ra", false, NOW).unwrap();
        let rows = StatsRepo::for_module(&conn, "u1", "hiragana_1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].character_id, "hira_a");
    }

    #[test]
    fn totals_sum_across_characters() {
        let conn = setup();
        StatsRepo::record_answer(&conn, "u1", "hira_a", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_i", false, NOW).unwrap();
        assert_eq!(StatsRepo::totals(&conn, "u1").unwrap(), (2, 1));
    }

    #[test]
    fn totals_empty_user_is_zero() {
        let conn = setup();
        assert_eq!(StatsRepo::totals(&conn, "ghost").unwrap(), (0, 0));
    }

    #[test]
    fn weakest_orders_by_accuracy() {
        let conn = setup();
        // hira_a: 0/2, hira_i: 1/2, hira_u: 2/2
        StatsRepo::record_answer(&conn, "u1", "hira_a", false, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_a", false, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_i", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_i", false, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_u", true, NOW).unwrap();
        StatsRepo::record_answer(&conn, "u1", "hira_u", true, NOW).unwrap();

        let weak = StatsRepo::weakest(&conn, "u1", 0.8, 10).unwrap();
        assert_eq!(weak.len(), 2);
        assert_eq!(weak[0].character_id, "hira_a");
        assert_eq!(weak[1].character_id, "hira_i");
    }

    #[test]
    fn weakest_respects_limit() {
        let conn = setup();
        for id in ["hira_a", "hira_i", "hira_u"] {
            StatsRepo::record_answer(&conn, "u1", id, false, NOW).unwrap();
        }
        assert_eq!(StatsRepo::weakest(&conn, "u1", 0.8, 2).unwrap().len(), 2);
    }
}
