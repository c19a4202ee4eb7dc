//! Prefixed string ID generation.
//!
//! Rows are keyed by UUID v7 strings with a short type prefix (`sess_`,
//! `ans_`), so ids sort by creation time and are self-describing in logs.
//! Reference data (characters, modules) uses stable human-readable slugs
//! from the curriculum instead.

use uuid::Uuid;

/// New quiz session id (`sess_` + UUID v7).
pub fn new_session_id() -> String {
    format!("sess_{}", Uuid::now_v7())
}

/// New quiz answer id (`ans_` + UUID v7).
pub fn new_answer_id() -> String {
    format!("ans_{}", Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_prefixed_and_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("sess_"));
        assert_ne!(a, b);
    }

    #[test]
    fn answer_ids_are_prefixed() {
        assert!(new_answer_id().starts_with("ans_"));
    }

    #[test]
    fn v7_ids_sort_by_creation() {
        let first = new_session_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_session_id();
        assert!(first < second);
    }
}
