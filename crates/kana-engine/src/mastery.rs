//! Weak/mastered classification of characters from their stats.

/// Accuracy as a ratio in `[0, 1]`; zero attempts count as zero accuracy.
pub fn accuracy(total_attempts: i64, correct_count: i64) -> f64 {
    if total_attempts <= 0 {
        0.0
    } else {
        correct_count as f64 / total_attempts as f64
    }
}

/// A character is mastered once it has enough attempts on record and its
/// accuracy meets the threshold.
pub fn is_mastered(
    total_attempts: i64,
    correct_count: i64,
    min_attempts: i64,
    threshold: f64,
) -> bool {
    total_attempts >= min_attempts && accuracy(total_attempts, correct_count) >= threshold
}

/// A character is weak when it has been attempted but its accuracy is below
/// the mastery threshold. Unseen characters are not weak — they are unknown.
pub fn is_weak(total_attempts: i64, correct_count: i64, threshold: f64) -> bool {
    total_attempts > 0 && accuracy(total_attempts, correct_count) < threshold
}
