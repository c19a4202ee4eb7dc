//! Durable spill of unsynced answers.
//!
//! One JSON file per session under a state directory. The spill is a
//! safety net, not a source of truth: every storage failure is logged
//! and swallowed, and the queue keeps working from memory.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::queue::{QueuedAnswer, SyncState};

/// Filesystem store for spilled answers.
#[derive(Clone, Debug)]
pub struct SpillStore {
    dir: PathBuf,
    max_age_hours: i64,
}

impl SpillStore {
    /// Spill under `dir`, pruning entries older than `max_age_hours` on
    /// load.
    pub fn new(dir: impl Into<PathBuf>, max_age_hours: i64) -> Self {
        Self {
            dir: dir.into(),
            max_age_hours,
        }
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// Load the unsynced answers spilled for a session.
    ///
    /// Entries older than the age limit are dropped, and entries caught
    /// mid-delivery by a crash are reset to pending. A missing or
    /// unreadable file yields an empty queue.
    pub fn load(&self, session_id: &str) -> Vec<QueuedAnswer> {
        let path = self.path_for(session_id);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read spill file");
                return Vec::new();
            }
        };
        let entries: Vec<QueuedAnswer> = match serde_json::from_str(&data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed spill file, discarding");
                return Vec::new();
            }
        };

        let cutoff = chrono::Utc::now() - chrono::Duration::hours(self.max_age_hours);
        entries
            .into_iter()
            .filter(|a| a.state != SyncState::Synced && a.queued_at >= cutoff)
            .map(|mut a| {
                if a.state == SyncState::Syncing {
                    a.state = SyncState::Pending;
                }
                a
            })
            .collect()
    }

    /// Persist the unsynced answers of a session, replacing the file.
    ///
    /// Synced entries are not written; when nothing is left unsynced the
    /// file is removed.
    pub fn persist(&self, session_id: &str, entries: &[QueuedAnswer]) {
        let path = self.path_for(session_id);
        let unsynced: Vec<&QueuedAnswer> = entries
            .iter()
            .filter(|a| a.state != SyncState::Synced)
            .collect();

        if unsynced.is_empty() {
            Self::remove_file(&path);
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create spill dir");
            return;
        }
        let json = match serde_json::to_string_pretty(&unsynced) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize spill");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, json) {
            warn!(path = %path.display(), error = %e, "failed to write spill file");
        }
    }

    /// Drop the spill file for a session.
    pub fn remove(&self, session_id: &str) {
        Self::remove_file(&self.path_for(session_id));
    }

    fn remove_file(path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove spill file");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(character_id: &str, state: SyncState) -> QueuedAnswer {
        QueuedAnswer {
            character_id: character_id.to_string(),
            answer_text: "a".to_string(),
            is_correct: true,
            latency_ms: 300,
            queued_at: chrono::Utc::now(),
            state,
            attempts: 0,
        }
    }

    #[test]
    fn persist_then_load_roundtrips_unsynced() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        spill.persist(
            "sess_1",
            &[
                answer("hira_a", SyncState::Pending),
                answer("hira_i", SyncState::Synced),
                answer("hira_u", SyncState::Failed),
            ],
        );

        let loaded = spill.load("sess_1");
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|a| a.state != SyncState::Synced));
    }

    #[test]
    fn syncing_entries_reset_to_pending_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        spill.persist("sess_1", &[answer("hira_a", SyncState::Syncing)]);

        let loaded = spill.load("sess_1");
        assert_eq!(loaded[0].state, SyncState::Pending);
    }

    #[test]
    fn stale_entries_pruned_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        let mut old = answer("hira_a", SyncState::Pending);
        old.queued_at = chrono::Utc::now() - chrono::Duration::hours(25);
        spill.persist("sess_1", &[old, answer("hira_i", SyncState::Pending)]);

        let loaded = spill.load("sess_1");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].character_id, "hira_i");
    }

    #[test]
    fn all_synced_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        spill.persist("sess_1", &[answer("hira_a", SyncState::Pending)]);
        assert!(dir.path().join("sess_1.json").exists());

        spill.persist("sess_1", &[answer("hira_a", SyncState::Synced)]);
        assert!(!dir.path().join("sess_1.json").exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        assert!(spill.load("sess_none").is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sess_1.json"), "{ nope").unwrap();
        let spill = SpillStore::new(dir.path(), 24);
        assert!(spill.load("sess_1").is_empty());
    }

    #[test]
    fn unwritable_dir_is_swallowed() {
        // A file where the directory should be makes create_dir_all fail.
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, "file").unwrap();
        let spill = SpillStore::new(&blocked, 24);
        spill.persist("sess_1", &[answer("hira_a", SyncState::Pending)]);
    }
}
