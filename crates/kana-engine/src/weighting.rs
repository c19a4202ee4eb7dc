//! Per-character selection weights from historical accuracy.
//!
//! Unseen characters get a fixed moderate weight so they surface without
//! swamping the quiz; seen characters are weighted by how often the learner
//! misses them. The floor of 1.0 keeps mastered characters in rotation.

/// Weight for a character the learner has never attempted.
pub const UNSEEN_WEIGHT: f64 = 2.0;

/// Minimum weight — mastered characters can still reappear.
pub const FLOOR_WEIGHT: f64 = 1.0;

/// Compute the selection weight for one character.
///
/// - No recorded attempts: exactly [`UNSEEN_WEIGHT`].
/// - Otherwise: `(1 - accuracy) * weak_weight + 1`, where
///   `accuracy = correct / attempts`. Strictly decreasing in accuracy,
///   never below [`FLOOR_WEIGHT`].
pub fn selection_weight(total_attempts: i64, correct_count: i64, weak_weight: f64) -> f64 {
    if total_attempts <= 0 {
        return UNSEEN_WEIGHT;
    }
    let accuracy = correct_count as f64 / total_attempts as f64;
    ((1.0 - accuracy) * weak_weight + 1.0).max(FLOOR_WEIGHT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f64 = 3.0;

    #[test]
    fn unseen_character_weighs_two() {
        assert!((selection_weight(0, 0, W) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn perfect_accuracy_hits_floor() {
        assert!((selection_weight(10, 10, W) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_accuracy_gets_full_weak_weight() {
        // (1 - 0) * 3 + 1 = 4
        assert!((selection_weight(5, 0, W) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn half_accuracy_midpoint() {
        // (1 - 0.5) * 3 + 1 = 2.5
        assert!((selection_weight(4, 2, W) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_weak_weight_scales() {
        assert!((selection_weight(5, 0, 6.0) - 7.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn weight_never_below_floor(attempts in 1i64..10_000, correct_ratio in 0.0f64..=1.0, w in 0.0f64..50.0) {
            let correct = ((attempts as f64) * correct_ratio) as i64;
            prop_assert!(selection_weight(attempts, correct, w) >= FLOOR_WEIGHT);
        }

        #[test]
        fn weight_monotonically_non_increasing_in_accuracy(attempts in 1i64..1_000, correct in 0i64..1_000, w in 0.1f64..20.0) {
            let correct = correct.min(attempts);
            if correct < attempts {
                let lower = selection_weight(attempts, correct, w);
                let higher = selection_weight(attempts, correct + 1, w);
                prop_assert!(higher <= lower);
            }
        }
    }
}
