//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! wire format the web client reads. Each type implements [`Default`] with
//! production default values. Types marked with `#[serde(default)]` allow
//! partial JSON — missing fields get their default value during
//! deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Kana service.
///
/// Loaded from `~/.kana/settings.json` with defaults applied for missing
/// fields. Environment variables (`KANA_*`) can override specific values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KanaSettings {
    /// Settings schema version.
    pub version: String,
    /// Quiz generation parameters.
    pub quiz: QuizSettings,
    /// Progress aggregation parameters.
    pub progress: ProgressSettings,
    /// Server network settings.
    pub server: ServerSettings,
    /// Client sync-queue behavior.
    pub sync: SyncSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for KanaSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            quiz: QuizSettings::default(),
            progress: ProgressSettings::default(),
            server: ServerSettings::default(),
            sync: SyncSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl KanaSettings {
    /// Clamp out-of-range values and correct invalid invariants.
    ///
    /// Called automatically during loading. Out-of-range values are clamped
    /// with a warning rather than rejected, so users get corrected behavior
    /// instead of a confusing error.
    pub fn validate(&mut self) {
        let q = &mut self.quiz;
        if q.question_count == 0 {
            tracing::warn!("questionCount of 0 corrected to 1");
            q.question_count = 1;
        }
        if q.options_count < 2 {
            tracing::warn!(
                options_count = q.options_count,
                "optionsCount below 2 corrected to 2"
            );
            q.options_count = 2;
        }
        if q.weak_character_weight < 0.0 {
            tracing::warn!(
                weight = q.weak_character_weight,
                "weakCharacterWeight negative, corrected to 0"
            );
            q.weak_character_weight = 0.0;
        }
        if !(0.0..=1.0).contains(&q.mastery_threshold) {
            let clamped = q.mastery_threshold.clamp(0.0, 1.0);
            tracing::warn!(
                threshold = q.mastery_threshold,
                clamped,
                "masteryThreshold out of range, clamped"
            );
            q.mastery_threshold = clamped;
        }
        let p = &mut self.progress;
        if !(0.0..=100.0).contains(&p.unlock_threshold) {
            let clamped = p.unlock_threshold.clamp(0.0, 100.0);
            tracing::warn!(
                threshold = p.unlock_threshold,
                clamped,
                "unlockThreshold out of range, clamped"
            );
            p.unlock_threshold = clamped;
        }
    }
}

/// Quiz generation parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
    /// Questions per quiz, capped at the module's character count.
    pub question_count: usize,
    /// Multiple-choice options per question (correct + distractors).
    pub options_count: usize,
    /// Extra weight applied to low-accuracy characters during selection.
    pub weak_character_weight: f64,
    /// Attempts required before a character can count as mastered.
    pub min_attempts_for_mastery: i64,
    /// Accuracy at or above which a character counts as mastered.
    pub mastery_threshold: f64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: 10,
            options_count: 4,
            weak_character_weight: 3.0,
            min_attempts_for_mastery: 5,
            mastery_threshold: 0.8,
        }
    }
}

/// Progress aggregation parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSettings {
    /// Progress percentage at which the next module unlocks.
    pub unlock_threshold: f64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            unlock_threshold: 80.0,
        }
    }
}

/// Server network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8642,
        }
    }
}

/// Client sync-queue behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Retry delays in milliseconds; the last value repeats for later
    /// retries.
    pub retry_delays_ms: Vec<u64>,
    /// Delivery attempts before an answer is terminally failed.
    pub max_attempts: u32,
    /// Ceiling for `waitForSync`, in milliseconds.
    pub wait_ceiling_ms: u64,
    /// Age after which spilled unsynced answers are pruned, in hours.
    pub spill_max_age_hours: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            retry_delays_ms: vec![1_000, 2_000, 5_000],
            max_attempts: 3,
            wait_ceiling_ms: 10_000,
            spill_max_age_hours: 24,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Emit JSON-formatted logs (for collectors) instead of human-readable.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { json: false }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let s = KanaSettings::default();
        assert_eq!(s.quiz.question_count, 10);
        assert_eq!(s.quiz.options_count, 4);
        assert!((s.quiz.weak_character_weight - 3.0).abs() < f64::EPSILON);
        assert_eq!(s.quiz.min_attempts_for_mastery, 5);
        assert!((s.quiz.mastery_threshold - 0.8).abs() < f64::EPSILON);
        assert!((s.progress.unlock_threshold - 80.0).abs() < f64::EPSILON);
        assert_eq!(s.sync.retry_delays_ms, vec![1_000, 2_000, 5_000]);
        assert_eq!(s.sync.max_attempts, 3);
        assert_eq!(s.sync.wait_ceiling_ms, 10_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: KanaSettings =
            serde_json::from_str(r#"{"quiz": {"questionCount": 5}}"#).unwrap();
        assert_eq!(s.quiz.question_count, 5);
        assert_eq!(s.quiz.options_count, 4);
        assert_eq!(s.server.port, 8642);
    }

    #[test]
    fn validate_clamps_mastery_threshold() {
        let mut s = KanaSettings::default();
        s.quiz.mastery_threshold = 1.7;
        s.validate();
        assert!((s.quiz.mastery_threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_corrects_zero_question_count() {
        let mut s = KanaSettings::default();
        s.quiz.question_count = 0;
        s.validate();
        assert_eq!(s.quiz.question_count, 1);
    }

    #[test]
    fn validate_raises_tiny_options_count() {
        let mut s = KanaSettings::default();
        s.quiz.options_count = 1;
        s.validate();
        assert_eq!(s.quiz.options_count, 2);
    }
}
