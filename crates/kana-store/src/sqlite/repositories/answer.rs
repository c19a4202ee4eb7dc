//! Quiz answer repository — append-only `quiz_answers` rows.
//!
//! At most one answer per (session, character); the table's UNIQUE
//! constraint backs the duplicate check against concurrent submissions.

use kana_core::ids::new_answer_id;
use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::sqlite::row_types::AnswerRow;

/// Options for appending an answer.
pub struct CreateAnswerOptions<'a> {
    /// Owning session.
    pub session_id: &'a str,
    /// Answered character.
    pub character_id: &'a str,
    /// Submitted text.
    pub answer_text: &'a str,
    /// Server-computed correctness.
    pub is_correct: bool,
    /// Response latency in milliseconds.
    pub latency_ms: i64,
}

/// Answer repository — stateless, every method takes `&Connection`.
pub struct AnswerRepo;

impl AnswerRepo {
    /// Append one answer.
    pub fn create(conn: &Connection, opts: &CreateAnswerOptions<'_>) -> Result<AnswerRow> {
        let id = new_answer_id();
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO quiz_answers
                 (id, session_id, character_id, answer_text, is_correct, latency_ms, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                opts.session_id,
                opts.character_id,
                opts.answer_text,
                opts.is_correct,
                opts.latency_ms,
                now
            ],
        )?;
        Ok(AnswerRow {
            id,
            session_id: opts.session_id.to_string(),
            character_id: opts.character_id.to_string(),
            answer_text: opts.answer_text.to_string(),
            is_correct: opts.is_correct,
            latency_ms: opts.latency_ms,
            answered_at: now,
        })
    }

    /// Whether this character was already answered in this session.
    pub fn exists(conn: &Connection, session_id: &str, character_id: &str) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM quiz_answers WHERE session_id = ?1 AND character_id = ?2)",
            params![session_id, character_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Count answers in a session.
    pub fn count(conn: &Connection, session_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quiz_answers WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// All answers of a session in submission order.
    pub fn list_for_session(conn: &Connection, session_id: &str) -> Result<Vec<AnswerRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, session_id, character_id, answer_text, is_correct, latency_ms, answered_at
             FROM quiz_answers WHERE session_id = ?1 ORDER BY answered_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(AnswerRow {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    character_id: row.get(2)?,
                    answer_text: row.get(3)?,
                    is_correct: row.get(4)?,
                    latency_ms: row.get(5)?,
                    answered_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
