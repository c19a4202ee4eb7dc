//! # kana-settings
//!
//! Configuration management with layered sources for the Kana service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`KanaSettings::default()`]
//! 2. **User file** — `~/.kana/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `KANA_*` overrides (highest priority)
//!
//! The global singleton is reloadable: when an operator edits the settings
//! file, [`reload_settings_from_path`] swaps the cached value so all
//! subsequent [`get_settings`] calls return fresh data. The singleton also
//! serves as the process-wide handle the quiz components read their
//! configuration from, so per-request code never re-parses files.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::path::Path;
use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// Uses `RwLock<Option<Arc<KanaSettings>>>` instead of `OnceLock` so the
/// cached value can be swapped on reload. Reads are cheap (shared lock +
/// `Arc::clone`); writes only happen on reload, which is rare.
static SETTINGS: RwLock<Option<Arc<KanaSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.kana/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
///
/// Returns an `Arc` so callers can hold a consistent snapshot even if
/// another thread reloads settings concurrently.
pub fn get_settings() -> Arc<KanaSettings> {
    // Fast path: read lock
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref s) = *guard {
            return Arc::clone(s);
        }
    }

    // Slow path: first access, take write lock
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Double-check after acquiring write lock (another thread may have initialized)
    if let Some(ref s) = *guard {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            KanaSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings. Useful for tests and server
/// startup where the settings path is known.
pub fn init_settings(settings: KanaSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

/// Reload settings from a specific file path.
///
/// Reads the file, deep-merges over defaults, applies env overrides, and
/// atomically swaps the global cache. All subsequent [`get_settings`] calls
/// return the new values.
pub fn reload_settings_from_path(path: &Path) {
    let new = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to reload settings, falling back to defaults");
            KanaSettings::default()
        }
    });
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(new);
    tracing::info!(?path, "settings reloaded from disk");
}

/// Reset the global settings cache (test-only).
///
/// Clears the cached value so the next [`get_settings`] call re-loads from
/// disk. This is needed because tests share a process and the global is
/// `static`.
#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that mutate the global SETTINGS static must hold this lock
    /// to avoid racing with each other (Rust runs tests in parallel threads).
    static SETTINGS_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn init_settings_sets_custom_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut custom = KanaSettings::default();
        custom.server.port = 9999;
        init_settings(custom);
        assert_eq!(get_settings().server.port, 9999);
        reset_settings();
    }

    #[test]
    fn init_settings_replaces_previous() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut first = KanaSettings::default();
        first.quiz.question_count = 7;
        init_settings(first);
        assert_eq!(get_settings().quiz.question_count, 7);

        let mut second = KanaSettings::default();
        second.quiz.question_count = 12;
        init_settings(second);
        assert_eq!(get_settings().quiz.question_count, 12);
        reset_settings();
    }

    #[test]
    fn reload_settings_from_path_updates_cached_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        init_settings(KanaSettings::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"quiz": {"weakCharacterWeight": 5.0}}"#).unwrap();

        reload_settings_from_path(&path);

        let updated = get_settings();
        assert!((updated.quiz.weak_character_weight - 5.0).abs() < f64::EPSILON);
        // Other defaults preserved (deep merge)
        assert_eq!(updated.quiz.options_count, 4);
        reset_settings();
    }

    #[test]
    fn reload_from_nonexistent_path_falls_back_to_defaults() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut custom = KanaSettings::default();
        custom.server.port = 7777;
        init_settings(custom);

        reload_settings_from_path(Path::new("/nonexistent/settings.json"));
        assert_eq!(get_settings().server.port, 8642);
        reset_settings();
    }

    #[test]
    fn get_settings_returns_arc_for_snapshot_isolation() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        init_settings(KanaSettings::default());

        let snapshot = get_settings();
        assert_eq!(snapshot.server.port, 8642);

        let mut new = KanaSettings::default();
        new.server.port = 5555;
        init_settings(new);

        // Snapshot still sees the old value (Arc isolation)
        assert_eq!(snapshot.server.port, 8642);
        assert_eq!(get_settings().server.port, 5555);
        reset_settings();
    }
}
