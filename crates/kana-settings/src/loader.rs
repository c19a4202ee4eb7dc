//! Settings loading: defaults → user file → environment overrides.
//!
//! The user file is deep-merged over serialized defaults so a partial file
//! only overrides the keys it mentions. `KANA_*` environment variables win
//! over both layers.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::Result;
use crate::types::KanaSettings;

/// Default settings file location: `~/.kana/settings.json`.
pub fn settings_path() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".kana").join("settings.json")
}

/// Deep-merge `overlay` into `base`. Objects merge recursively; any other
/// value in `overlay` replaces the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from the default path with env overrides applied.
pub fn load_settings() -> Result<KanaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific file path.
///
/// A missing file is not an error — defaults are used. A present but
/// malformed file is an error (silent fallback would hide typos).
pub fn load_settings_from_path(path: &Path) -> Result<KanaSettings> {
    let defaults = serde_json::to_value(KanaSettings::default())?;

    let merged = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&raw)?;
        deep_merge(defaults, user)
    } else {
        defaults
    };

    let mut settings: KanaSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Apply `KANA_*` environment variable overrides (highest priority).
///
/// Unparseable values are ignored with a warning — env typos should not
/// take the server down.
fn apply_env_overrides(settings: &mut KanaSettings) {
    if let Some(port) = env_parsed::<u16>("KANA_PORT") {
        settings.server.port = port;
    }
    if let Ok(bind) = std::env::var("KANA_BIND") {
        settings.server.bind = bind;
    }
    if let Some(count) = env_parsed::<usize>("KANA_QUESTION_COUNT") {
        settings.quiz.question_count = count;
    }
    if let Some(count) = env_parsed::<usize>("KANA_OPTIONS_COUNT") {
        settings.quiz.options_count = count;
    }
    if let Some(weight) = env_parsed::<f64>("KANA_WEAK_CHARACTER_WEIGHT") {
        settings.quiz.weak_character_weight = weight;
    }
    if let Some(json) = env_parsed::<bool>("KANA_LOG_JSON") {
        settings.logging.json = json;
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_nested_objects() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let overlay = serde_json::json!({"a": {"y": 9}});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["a"]["x"], 1);
        assert_eq!(merged["a"]["y"], 9);
        assert_eq!(merged["b"], 3);
    }

    #[test]
    fn deep_merge_scalar_replaces() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": [2]}));
        assert_eq!(merged["a"], serde_json::json!([2]));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let s = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(s.quiz.question_count, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"quiz": {"optionsCount": 3}, "server": {"port": 9001}}"#)
            .unwrap();
        let s = load_settings_from_path(&path).unwrap();
        assert_eq!(s.quiz.options_count, 3);
        assert_eq!(s.server.port, 9001);
        // untouched keys keep defaults
        assert_eq!(s.quiz.question_count, 10);
    }

    #[test]
    fn loaded_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"quiz": {"masteryThreshold": 5.0}}"#).unwrap();
        let s = load_settings_from_path(&path).unwrap();
        assert!((s.quiz.mastery_threshold - 1.0).abs() < f64::EPSILON);
    }
}
