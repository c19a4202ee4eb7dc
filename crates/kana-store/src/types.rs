//! Output types of the high-level store, serialized as the API payloads.

use serde::{Deserialize, Serialize};

use kana_engine::progress::ProgressUpdate;
use kana_engine::selector::Question;

use crate::sqlite::row_types::{AnswerRow, CharacterRow, ModuleRow, SessionRow};

/// Per-request overrides for quiz creation; unset fields fall back to
/// settings.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizOptions {
    /// Requested question count (capped at module size).
    pub question_count: Option<usize>,
    /// Requested options per question.
    pub options_count: Option<usize>,
}

/// A freshly started quiz.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedQuiz {
    /// The created session.
    pub session: SessionRow,
    /// The generated questions in presentation order.
    pub questions: Vec<Question>,
}

/// Outcome of a single answer submission.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// The stored answer (server-scored).
    pub answer: AnswerRow,
    /// The character's correct reading, for client feedback.
    pub correct_reading: String,
    /// Session score after this answer.
    pub score: i64,
}

/// One answer in a batch submission. Correctness is recomputed server-side
/// regardless of what the client concluded.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnswer {
    /// Answered character.
    pub character_id: String,
    /// Submitted text.
    pub answer_text: String,
    /// Response latency in milliseconds.
    #[serde(default)]
    pub latency_ms: i64,
}

/// Outcome of a batch submission.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Final session score (count of correct answers).
    pub score: i64,
    /// Question count of the session.
    pub total_items: i64,
    /// The stored answers.
    pub answers: Vec<AnswerRow>,
}

/// Result of completing a quiz (and of fetching it later).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// The completed session.
    pub session: SessionRow,
    /// `score / total_items * 100`.
    pub session_percentage: f64,
    /// Progress after folding this session in. For retrospective fetches
    /// the transition flags are always `false`.
    pub progress: ProgressUpdate,
    /// Per-question breakdown.
    pub answers: Vec<AnswerRow>,
}

/// One character's stats inside a module report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStat {
    /// The character.
    pub character: CharacterRow,
    /// Lifetime attempts (0 if unseen).
    pub total_attempts: i64,
    /// Lifetime correct answers.
    pub correct_count: i64,
    /// Current consecutive-correct streak.
    pub streak: i64,
    /// `correct / attempts`, 0 for unseen.
    pub accuracy: f64,
    /// Whether the mastery bar is met.
    pub mastered: bool,
}

/// Per-module stats report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    /// The module.
    pub module: ModuleRow,
    /// Progress percentage (0 if no completion yet).
    pub percentage: f64,
    /// Completed sessions for this module.
    pub completed_sessions: i64,
    /// Whether the learner can take this module yet.
    pub accessible: bool,
    /// Every character of the module with the learner's stats.
    pub characters: Vec<CharacterStat>,
}

/// One module in the overview list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOverview {
    /// The module.
    pub module: ModuleRow,
    /// Progress percentage (0 if no completion yet).
    pub percentage: f64,
    /// Whether the preceding module's progress unlocks this one.
    pub accessible: bool,
    /// Whether progress has reached 100.
    pub completed: bool,
}

/// Cross-module aggregate stats.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    /// Completed sessions across all modules.
    pub total_sessions: i64,
    /// Lifetime answer count.
    pub total_answers: i64,
    /// Lifetime correct count.
    pub total_correct: i64,
    /// `total_correct / total_answers`, 0 with no answers.
    pub accuracy: f64,
    /// Per-module overview in curriculum order.
    pub modules: Vec<ModuleOverview>,
}

/// One completed session in the history list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The session.
    pub session: SessionRow,
    /// Module display name.
    pub module_name: String,
    /// `score / total_items * 100`.
    pub percentage: f64,
}

/// One weak character in the weakest-first list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakCharacter {
    /// The character.
    pub character: CharacterRow,
    /// Lifetime attempts.
    pub total_attempts: i64,
    /// Lifetime correct answers.
    pub correct_count: i64,
    /// `correct / attempts`.
    pub accuracy: f64,
    /// Current streak.
    pub streak: i64,
}
