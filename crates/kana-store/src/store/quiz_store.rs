//! High-level transactional [`QuizStore`] API.
//!
//! Composes the repositories into atomic, session-centric operations.
//! Every write method runs inside a single `SQLite` transaction — callers
//! never observe partial state (an answer without its stats update, a
//! completion without its progress fold).
//!
//! INVARIANT: session writes are serialized per-session via in-process
//! mutex locks (`with_session_write_lock`). Session creation uses a
//! separate global lock. The `UNIQUE(session_id, character_id)` constraint
//! enforces the duplicate-answer guard at the DB level as a backstop
//! against races between concurrent duplicate requests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use metrics::counter;
use tracing::{debug, instrument};

use kana_core::curriculum::{self, Character};
use kana_engine::{mastery, progress, selector};

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::{ConnectionPool, PooledConnection, open_pool};
use crate::sqlite::migrations::{run_migrations, seed_curriculum};
use crate::sqlite::repositories::answer::{AnswerRepo, CreateAnswerOptions};
use crate::sqlite::repositories::character::CharacterRepo;
use crate::sqlite::repositories::module::ModuleRepo;
use crate::sqlite::repositories::progress::ProgressRepo;
use crate::sqlite::repositories::session::{CreateSessionOptions, SessionRepo};
use crate::sqlite::repositories::stats::StatsRepo;
use crate::sqlite::row_types::{CharacterRow, ModuleRow, SessionRow};
use crate::types::{
    AnswerOutcome, BatchAnswer, BatchOutcome, CharacterStat, HistoryEntry, ModuleOverview,
    ModuleStats, OverallStats, QuizOptions, QuizResult, StartedQuiz, WeakCharacter,
};

/// High-level store wrapping a connection pool and all repositories.
pub struct QuizStore {
    pool: ConnectionPool,
    global_write_lock: Mutex<()>,
    session_write_locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl QuizStore {
    const SQLITE_BUSY_MAX_RETRIES: u32 = 32;

    /// Wrap an existing pool (schema assumed present).
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            global_write_lock: Mutex::new(()),
            session_write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open a database file, run migrations, and seed the curriculum.
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_pool(path)?;
        {
            let conn = pool.get()?;
            run_migrations(&conn)?;
            seed_curriculum(&conn)?;
        }
        Ok(Self::new(pool))
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Write serialization (per-session locks + BUSY retry)
    // ─────────────────────────────────────────────────────────────────────

    fn lock_global_write(&self) -> Result<MutexGuard<'_, ()>> {
        self.global_write_lock
            .lock()
            .map_err(|_| StoreError::Internal("global write lock poisoned".into()))
    }

    fn acquire_session_write_lock(&self, session_id: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .session_write_locks
            .lock()
            .map_err(|_| StoreError::Internal("session lock map poisoned".into()))?;

        // Opportunistically prune dead weak refs when the map grows.
        if locks.len() > 128 {
            locks.retain(|_, weak| weak.strong_count() > 0);
        }

        if let Some(existing) = locks.get(session_id).and_then(Weak::upgrade) {
            return Ok(existing);
        }

        let lock = Arc::new(Mutex::new(()));
        let _ = locks.insert(session_id.to_string(), Arc::downgrade(&lock));
        Ok(lock)
    }

    fn with_session_write_lock<T>(
        &self,
        session_id: &str,
        f: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let session_lock = self.acquire_session_write_lock(session_id)?;
        let _guard = session_lock
            .lock()
            .map_err(|_| StoreError::Internal("session write lock poisoned".into()))?;
        Self::retry_on_sqlite_busy(f)
    }

    fn with_global_write_lock<T>(&self, f: impl FnMut() -> Result<T>) -> Result<T> {
        let _guard = self.lock_global_write()?;
        Self::retry_on_sqlite_busy(f)
    }

    /// Retry an operation on `SQLite` BUSY/LOCKED with linear backoff + jitter.
    fn retry_on_sqlite_busy<T>(mut f: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempts = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(err)
                    if Self::is_sqlite_busy_or_locked(&err)
                        && attempts < Self::SQLITE_BUSY_MAX_RETRIES =>
                {
                    attempts += 1;
                    let base_ms = u64::from(attempts).saturating_mul(10).min(500);
                    let jitter_range = base_ms / 4;
                    let jitter = if jitter_range > 0 {
                        rand::random::<u64>() % (jitter_range * 2 + 1)
                    } else {
                        0
                    };
                    let backoff_ms = base_ms.saturating_sub(jitter_range) + jitter;
                    std::thread::sleep(Duration::from_millis(backoff_ms));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_sqlite_busy_or_locked(err: &StoreError) -> bool {
        match err {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(code, _)) => matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    fn remove_session_write_lock(&self, session_id: &str) {
        if let Ok(mut locks) = self.session_write_locks.lock() {
            let _ = locks.remove(session_id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Start a quiz: adaptive character selection + question building +
    /// session row, atomically.
    #[instrument(skip(self))]
    pub fn start_quiz(
        &self,
        user_id: &str,
        module_id: &str,
        options: QuizOptions,
    ) -> Result<StartedQuiz> {
        let settings = kana_settings::get_settings();
        let question_count = options.question_count.unwrap_or(settings.quiz.question_count);
        let options_count = options.options_count.unwrap_or(settings.quiz.options_count);
        let weak_weight = settings.quiz.weak_character_weight;

        self.with_global_write_lock(|| {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;

            let Some(_module) = ModuleRepo::get_by_id(&tx, module_id)? else {
                return Err(StoreError::NotFound(format!("module {module_id}")));
            };
            let characters = ModuleRepo::characters(&tx, module_id)?;
            if characters.is_empty() {
                return Err(StoreError::EmptyContent);
            }

            let stats: HashMap<String, (i64, i64)> =
                StatsRepo::for_module(&tx, user_id, module_id)?
                    .into_iter()
                    .map(|s| (s.character_id, (s.total_attempts, s.correct_count)))
                    .collect();

            let pool_chars: Vec<Character> =
                characters.iter().map(to_curriculum_character).collect();
            let questions = selector::generate_quiz(
                &pool_chars,
                &stats,
                question_count,
                options_count,
                weak_weight,
                &mut rand::rng(),
            )?;

            let session = SessionRepo::create(
                &tx,
                &CreateSessionOptions {
                    user_id,
                    module_id,
                    total_items: questions.len() as i64,
                },
            )?;
            tx.commit()?;

            counter!("kana_sessions_started_total").increment(1);
            debug!(session_id = %session.id, questions = questions.len(), "quiz started");
            Ok(StartedQuiz { session, questions })
        })
    }

    /// Submit one answer. Correctness is recomputed here from reference
    /// data; answer row, score bump, and stats fold are one transaction.
    #[instrument(skip(self, answer_text))]
    pub fn submit_answer(
        &self,
        user_id: &str,
        session_id: &str,
        character_id: &str,
        answer_text: &str,
        latency_ms: i64,
    ) -> Result<AnswerOutcome> {
        self.with_session_write_lock(session_id, || {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;

            let session = Self::load_active_session(&tx, user_id, session_id)?;
            if AnswerRepo::exists(&tx, session_id, character_id)? {
                return Err(StoreError::InvalidState(
                    "character already answered in this session".into(),
                ));
            }
            if !ModuleRepo::contains_character(&tx, &session.module_id, character_id)? {
                return Err(StoreError::NotFound(format!(
                    "character {character_id} in module {}",
                    session.module_id
                )));
            }
            let character = CharacterRepo::get_by_id(&tx, character_id)?
                .ok_or_else(|| StoreError::NotFound(format!("character {character_id}")))?;

            let is_correct = curriculum::readings_match(answer_text, &character.reading);
            let answer = AnswerRepo::create(
                &tx,
                &CreateAnswerOptions {
                    session_id,
                    character_id,
                    answer_text,
                    is_correct,
                    latency_ms,
                },
            )?;
            if is_correct {
                SessionRepo::add_score(&tx, session_id, 1)?;
            }
            let now = chrono::Utc::now().to_rfc3339();
            StatsRepo::record_answer(&tx, user_id, character_id, is_correct, &now)?;
            tx.commit()?;

            counter!("kana_answers_total").increment(1);
            Ok(AnswerOutcome {
                answer,
                correct_reading: character.reading.clone(),
                score: session.score + i64::from(is_correct),
            })
        })
    }

    /// Submit a whole quiz's answers at once (the preferred path).
    ///
    /// Guards against double submission by requiring the session to have no
    /// answers yet; writes every answer, the final score, and every stats
    /// fold in one transaction.
    #[instrument(skip(self, answers), fields(count = answers.len()))]
    pub fn submit_answer_batch(
        &self,
        user_id: &str,
        session_id: &str,
        answers: &[BatchAnswer],
    ) -> Result<BatchOutcome> {
        self.with_session_write_lock(session_id, || {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;

            let session = Self::load_active_session(&tx, user_id, session_id)?;
            if AnswerRepo::count(&tx, session_id)? > 0 {
                return Err(StoreError::InvalidState(
                    "answers already submitted for this session".into(),
                ));
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for a in answers {
                if !seen.insert(a.character_id.as_str()) {
                    return Err(StoreError::InvalidState(format!(
                        "duplicate character {} in batch",
                        a.character_id
                    )));
                }
            }

            let now = chrono::Utc::now().to_rfc3339();
            let mut stored = Vec::with_capacity(answers.len());
            let mut score = 0i64;
            for a in answers {
                if !ModuleRepo::contains_character(&tx, &session.module_id, &a.character_id)? {
                    return Err(StoreError::NotFound(format!(
                        "character {} in module {}",
                        a.character_id, session.module_id
                    )));
                }
                let character = CharacterRepo::get_by_id(&tx, &a.character_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("character {}", a.character_id)))?;
                let is_correct = curriculum::readings_match(&a.answer_text, &character.reading);
                score += i64::from(is_correct);
                stored.push(AnswerRepo::create(
                    &tx,
                    &CreateAnswerOptions {
                        session_id,
                        character_id: &a.character_id,
                        answer_text: &a.answer_text,
                        is_correct,
                        latency_ms: a.latency_ms,
                    },
                )?);
                StatsRepo::record_answer(&tx, user_id, &a.character_id, is_correct, &now)?;
            }
            SessionRepo::set_score(&tx, session_id, score)?;
            tx.commit()?;

            counter!("kana_answers_total").increment(answers.len() as u64);
            Ok(BatchOutcome {
                score,
                total_items: session.total_items,
                answers: stored,
            })
        })
    }

    /// Complete a quiz: set the completion timestamp and fold the score
    /// into module progress, atomically. A second call fails.
    #[instrument(skip(self))]
    pub fn complete_quiz(&self, user_id: &str, session_id: &str) -> Result<QuizResult> {
        let settings = kana_settings::get_settings();
        let unlock_threshold = settings.progress.unlock_threshold;

        let result = self.with_session_write_lock(session_id, || {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;

            let session = SessionRepo::get_owned(&tx, session_id, user_id)?
                .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
            let now = chrono::Utc::now().to_rfc3339();
            if !SessionRepo::complete(&tx, session_id, &now)? {
                return Err(StoreError::InvalidState("session already completed".into()));
            }

            let session_pct = if session.total_items > 0 {
                session.score as f64 / session.total_items as f64 * 100.0
            } else {
                0.0
            };

            let prior = ProgressRepo::get(&tx, user_id, &session.module_id)?;
            let update = progress::evaluate(
                prior.as_ref().map(|p| p.percentage),
                prior.as_ref().map_or(0, |p| p.completed_sessions),
                session_pct,
                unlock_threshold,
            );
            ProgressRepo::upsert(&tx, user_id, &session.module_id, update.percentage, &now)?;

            let answers = AnswerRepo::list_for_session(&tx, session_id)?;
            tx.commit()?;

            counter!("kana_sessions_completed_total").increment(1);
            debug!(
                session_id,
                score = session.score,
                percentage = update.percentage,
                unlocked = update.unlocked_next_module,
                "quiz completed"
            );
            Ok(QuizResult {
                session: SessionRow {
                    completed_at: Some(now),
                    ..session
                },
                session_percentage: session_pct,
                progress: update,
                answers,
            })
        });
        if result.is_ok() {
            self.remove_session_write_lock(session_id);
        }
        result
    }

    /// Abandon an active quiz: delete the session and its answers, leaving
    /// no trace and no progress impact.
    #[instrument(skip(self))]
    pub fn abandon_quiz(&self, user_id: &str, session_id: &str) -> Result<()> {
        let result = self.with_session_write_lock(session_id, || {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            let _session = Self::load_active_session(&tx, user_id, session_id)?;
            let _ = SessionRepo::delete(&tx, session_id)?;
            tx.commit()?;
            Ok(())
        });
        if result.is_ok() {
            self.remove_session_write_lock(session_id);
        }
        result
    }

    /// Fetch the result of a completed quiz.
    ///
    /// The transition flags cannot be reconstructed after the fact, so a
    /// retrospective result always reports them `false`.
    #[instrument(skip(self))]
    pub fn get_quiz_result(&self, user_id: &str, session_id: &str) -> Result<QuizResult> {
        let conn = self.conn()?;
        let session = SessionRepo::get_owned(&conn, session_id, user_id)?
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
        if session.is_active() {
            return Err(StoreError::InvalidState("session not completed".into()));
        }
        let session_pct = if session.total_items > 0 {
            session.score as f64 / session.total_items as f64 * 100.0
        } else {
            0.0
        };
        let current = ProgressRepo::get(&conn, user_id, &session.module_id)?
            .map_or(0.0, |p| p.percentage);
        let answers = AnswerRepo::list_for_session(&conn, session_id)?;
        Ok(QuizResult {
            session,
            session_percentage: session_pct,
            progress: progress::ProgressUpdate {
                percentage: current,
                changed: false,
                newly_completed: false,
                unlocked_next_module: false,
            },
            answers,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stats queries
    // ─────────────────────────────────────────────────────────────────────

    /// Modules in curriculum order with the learner's progress and
    /// accessibility.
    pub fn list_modules(&self, user_id: &str) -> Result<Vec<ModuleOverview>> {
        let settings = kana_settings::get_settings();
        let unlock_threshold = settings.progress.unlock_threshold;

        let conn = self.conn()?;
        let modules = ModuleRepo::list(&conn)?;
        let progress_by_module: HashMap<String, f64> = ProgressRepo::for_user(&conn, user_id)?
            .into_iter()
            .map(|p| (p.module_id, p.percentage))
            .collect();

        // Accessibility chains off the previous module's progress; walking
        // the ordered list avoids one query per module.
        let mut out = Vec::with_capacity(modules.len());
        let mut prev_pct = 100.0; // the first module is always accessible
        for module in modules {
            let pct = progress_by_module.get(&module.id).copied().unwrap_or(0.0);
            out.push(ModuleOverview {
                accessible: prev_pct >= unlock_threshold,
                percentage: pct,
                completed: pct >= 100.0,
                module,
            });
            prev_pct = pct;
        }
        Ok(out)
    }

    /// Per-character stats for one module, plus progress and accessibility.
    pub fn get_module_stats(&self, user_id: &str, module_id: &str) -> Result<ModuleStats> {
        let settings = kana_settings::get_settings();
        let conn = self.conn()?;

        let module = ModuleRepo::get_by_id(&conn, module_id)?
            .ok_or_else(|| StoreError::NotFound(format!("module {module_id}")))?;
        let characters = ModuleRepo::characters(&conn, module_id)?;
        let stats: HashMap<String, (i64, i64, i64)> =
            StatsRepo::for_module(&conn, user_id, module_id)?
                .into_iter()
                .map(|s| (s.character_id, (s.total_attempts, s.correct_count, s.streak)))
                .collect();

        let accessible = Self::module_accessible(&conn, user_id, &module)?;
        let progress_row = ProgressRepo::get(&conn, user_id, module_id)?;

        let character_stats = characters
            .into_iter()
            .map(|c| {
                let (attempts, correct, streak) = stats.get(&c.id).copied().unwrap_or((0, 0, 0));
                CharacterStat {
                    accuracy: mastery::accuracy(attempts, correct),
                    mastered: mastery::is_mastered(
                        attempts,
                        correct,
                        settings.quiz.min_attempts_for_mastery,
                        settings.quiz.mastery_threshold,
                    ),
                    total_attempts: attempts,
                    correct_count: correct,
                    streak,
                    character: c,
                }
            })
            .collect();

        Ok(ModuleStats {
            module,
            percentage: progress_row.as_ref().map_or(0.0, |p| p.percentage),
            completed_sessions: progress_row.as_ref().map_or(0, |p| p.completed_sessions),
            accessible,
            characters: character_stats,
        })
    }

    /// Aggregate stats across all modules.
    pub fn get_overall_stats(&self, user_id: &str) -> Result<OverallStats> {
        let conn = self.conn()?;
        let (total_answers, total_correct) = StatsRepo::totals(&conn, user_id)?;
        let total_sessions = SessionRepo::count_all_completed(&conn, user_id)?;
        let modules = self.list_modules(user_id)?;
        Ok(OverallStats {
            total_sessions,
            total_answers,
            total_correct,
            accuracy: mastery::accuracy(total_answers, total_correct),
            modules,
        })
    }

    /// Completed sessions, most recent first.
    pub fn get_quiz_history(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn()?;
        let sessions = SessionRepo::history(&conn, user_id, limit)?;
        let modules: HashMap<String, String> = ModuleRepo::list(&conn)?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        Ok(sessions
            .into_iter()
            .map(|s| {
                let percentage = if s.total_items > 0 {
                    s.score as f64 / s.total_items as f64 * 100.0
                } else {
                    0.0
                };
                HistoryEntry {
                    module_name: modules.get(&s.module_id).cloned().unwrap_or_default(),
                    percentage,
                    session: s,
                }
            })
            .collect())
    }

    /// The learner's weakest characters, below the mastery threshold.
    pub fn get_weak_characters(&self, user_id: &str, limit: i64) -> Result<Vec<WeakCharacter>> {
        let settings = kana_settings::get_settings();
        let conn = self.conn()?;
        let weakest =
            StatsRepo::weakest(&conn, user_id, settings.quiz.mastery_threshold, limit)?;
        let mut out = Vec::with_capacity(weakest.len());
        for s in weakest {
            let character = CharacterRepo::get_by_id(&conn, &s.character_id)?
                .ok_or_else(|| StoreError::NotFound(format!("character {}", s.character_id)))?;
            out.push(WeakCharacter {
                character,
                accuracy: mastery::accuracy(s.total_attempts, s.correct_count),
                total_attempts: s.total_attempts,
                correct_count: s.correct_count,
                streak: s.streak,
            });
        }
        Ok(out)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn load_active_session(
        conn: &rusqlite::Connection,
        user_id: &str,
        session_id: &str,
    ) -> Result<SessionRow> {
        let session = SessionRepo::get_owned(conn, session_id, user_id)?
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
        if !session.is_active() {
            return Err(StoreError::InvalidState("session already completed".into()));
        }
        Ok(session)
    }

    fn module_accessible(
        conn: &rusqlite::Connection,
        user_id: &str,
        module: &ModuleRow,
    ) -> Result<bool> {
        if module.position <= 1 {
            return Ok(true);
        }
        let settings = kana_settings::get_settings();
        let Some(prev) = ModuleRepo::get_by_position(conn, module.position - 1)? else {
            return Ok(true);
        };
        let pct = ProgressRepo::get(conn, user_id, &prev.id)?.map_or(0.0, |p| p.percentage);
        Ok(pct >= settings.progress.unlock_threshold)
    }
}

fn to_curriculum_character(row: &CharacterRow) -> Character {
    Character {
        id: row.id.clone(),
        glyph: row.glyph.clone(),
        reading: row.reading.clone(),
        script: curriculum::Script::parse(&row.script).unwrap_or(curriculum::Script::Hiragana),
        position: row.position,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
