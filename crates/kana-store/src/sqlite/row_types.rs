//! Plain row structs returned by the repositories.
//!
//! These mirror the table shapes one-to-one. Wire types with derived
//! fields (accuracy, accessibility) live in `crate::types`.

use serde::{Deserialize, Serialize};

/// Row of `modules`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRow {
    /// Stable slug id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Global ordinal, 1-based.
    pub position: i64,
    /// Character count (joined in by the repo).
    pub character_count: i64,
}

/// Row of `characters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRow {
    /// Stable slug id.
    pub id: String,
    /// Display glyph.
    pub glyph: String,
    /// Romanized reading.
    pub reading: String,
    /// `"hiragana"` or `"katakana"`.
    pub script: String,
    /// Gojūon ordinal within the syllabary.
    pub position: i64,
}

/// Row of `user_character_stats`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    /// Owning learner.
    pub user_id: String,
    /// Character these stats track.
    pub character_id: String,
    /// Lifetime attempts.
    pub total_attempts: i64,
    /// Lifetime correct answers.
    pub correct_count: i64,
    /// Current consecutive-correct streak.
    pub streak: i64,
    /// RFC 3339 timestamp of the latest attempt.
    pub last_attempt_at: String,
}

/// Row of `quiz_sessions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    /// Session id (`sess_` + UUID v7).
    pub id: String,
    /// Owning learner.
    pub user_id: String,
    /// Target module.
    pub module_id: String,
    /// Number of generated questions.
    pub total_items: i64,
    /// Running score.
    pub score: i64,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// RFC 3339 completion timestamp; `None` while active.
    pub completed_at: Option<String>,
}

impl SessionRow {
    /// Whether the session still accepts answers.
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Row of `quiz_answers`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRow {
    /// Answer id (`ans_` + UUID v7).
    pub id: String,
    /// Owning session.
    pub session_id: String,
    /// Answered character.
    pub character_id: String,
    /// Text the learner submitted.
    pub answer_text: String,
    /// Server-computed correctness.
    pub is_correct: bool,
    /// Response latency in milliseconds.
    pub latency_ms: i64,
    /// RFC 3339 timestamp.
    pub answered_at: String,
}

/// Row of `user_progress`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    /// Owning learner.
    pub user_id: String,
    /// Module this progress tracks.
    pub module_id: String,
    /// Progress percentage in `[0, 100]`.
    pub percentage: f64,
    /// Completed sessions folded into this value.
    pub completed_sessions: i64,
    /// RFC 3339 timestamp of the last update.
    pub updated_at: String,
}
