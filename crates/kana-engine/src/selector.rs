//! Weighted character selection and multiple-choice assembly.
//!
//! Selection bias controls *which* characters appear in a quiz; the
//! on-screen order is an independent uniform shuffle so weak characters
//! don't always lead. Distractors come only from the same module, so every
//! option is a reading the learner has plausibly seen.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use kana_core::curriculum::Character;
use kana_core::{KanaError, Result};

/// One generated multiple-choice question.
///
/// `reading` is included so the client can score optimistically; the server
/// recomputes correctness from reference data at write time using the same
/// comparison rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The prompted character.
    pub character: Character,
    /// Shuffled options: the correct reading plus distractors.
    pub options: Vec<String>,
}

/// Weighted sampling without replacement.
///
/// Repeatedly draws one item via weighted-random selection over the
/// *currently remaining* pool: draw uniform in `[0, total_weight)`, walk
/// the cumulative weights, take the first item whose cumulative weight
/// meets or exceeds the draw, then remove it. `n` is capped at pool size.
///
/// A pool whose weights sum to zero (or negative, which callers never
/// produce) degenerates to taking items front-to-back.
pub fn select_weighted<T>(mut pool: Vec<(T, f64)>, n: usize, rng: &mut impl Rng) -> Vec<T> {
    let n = n.min(pool.len());
    let mut chosen = Vec::with_capacity(n);
    for _ in 0..n {
        let total: f64 = pool.iter().map(|(_, w)| w).sum();
        let idx = if total > 0.0 {
            let draw = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            let mut pick = pool.len() - 1;
            for (i, (_, weight)) in pool.iter().enumerate() {
                cumulative += weight;
                if cumulative >= draw {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            0
        };
        chosen.push(pool.swap_remove(idx).0);
    }
    chosen
}

/// Build questions for the selected characters.
///
/// For each character: the correct option is its reading; `options_count-1`
/// distractors are drawn uniformly without replacement from the
/// deduplicated set of *other* readings in the module. When a module has
/// fewer distinct other readings than requested, the question simply
/// carries fewer options. All options are shuffled together.
pub fn build_questions(
    selected: &[Character],
    module_characters: &[Character],
    options_count: usize,
    rng: &mut impl Rng,
) -> Vec<Question> {
    // Dedup in a BTreeSet so distractor candidates are deterministic for a
    // seeded rng regardless of module iteration order.
    let all_readings: BTreeSet<&str> = module_characters
        .iter()
        .map(|c| c.reading.as_str())
        .collect();

    selected
        .iter()
        .map(|character| {
            let candidates: Vec<&str> = all_readings
                .iter()
                .copied()
                .filter(|r| *r != character.reading)
                .collect();
            let distractor_count = options_count.saturating_sub(1).min(candidates.len());
            let mut options: Vec<String> = candidates
                .choose_multiple(rng, distractor_count)
                .map(|r| (*r).to_string())
                .collect();
            options.push(character.reading.clone());
            options.shuffle(rng);
            Question {
                character: character.clone(),
                options,
            }
        })
        .collect()
}

/// Generate a full quiz for a module.
///
/// `stats` maps character id → (total attempts, correct count); characters
/// absent from the map are treated as unseen. The chosen set is re-shuffled
/// after selection so presentation order is independent of selection order.
pub fn generate_quiz(
    module_characters: &[Character],
    stats: &HashMap<String, (i64, i64)>,
    question_count: usize,
    options_count: usize,
    weak_weight: f64,
    rng: &mut impl Rng,
) -> Result<Vec<Question>> {
    if module_characters.is_empty() {
        return Err(KanaError::EmptyContent);
    }

    let pool: Vec<(Character, f64)> = module_characters
        .iter()
        .map(|c| {
            let (attempts, correct) = stats.get(&c.id).copied().unwrap_or((0, 0));
            let weight = crate::weighting::selection_weight(attempts, correct, weak_weight);
            (c.clone(), weight)
        })
        .collect();

    let mut selected = select_weighted(pool, question_count, rng);
    selected.shuffle(rng);

    tracing::debug!(
        questions = selected.len(),
        pool = module_characters.len(),
        "generated quiz"
    );
    Ok(build_questions(
        &selected,
        module_characters,
        options_count,
        rng,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kana_core::curriculum::Script;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chr(id: &str, reading: &str) -> Character {
        Character {
            id: id.to_string(),
            glyph: id.to_string(),
            reading: reading.to_string(),
            script: Script::Hiragana,
            position: 1,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn selects_exactly_n_distinct_items() {
        let pool: Vec<(i32, f64)> = (0..20).map(|i| (i, 1.0)).collect();
        let chosen = select_weighted(pool, 7, &mut rng());
        assert_eq!(chosen.len(), 7);
        let unique: BTreeSet<_> = chosen.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn n_equal_to_pool_selects_all() {
        let pool: Vec<(i32, f64)> = (0..5).map(|i| (i, (i + 1) as f64)).collect();
        let mut chosen = select_weighted(pool, 5, &mut rng());
        chosen.sort_unstable();
        assert_eq!(chosen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn n_larger_than_pool_is_capped() {
        let pool: Vec<(i32, f64)> = (0..3).map(|i| (i, 1.0)).collect();
        assert_eq!(select_weighted(pool, 10, &mut rng()).len(), 3);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let pool: Vec<(i32, f64)> = vec![];
        assert!(select_weighted(pool, 4, &mut rng()).is_empty());
    }

    #[test]
    fn zero_total_weight_degenerates_front_to_back() {
        let pool: Vec<(i32, f64)> = vec![(1, 0.0), (2, 0.0), (3, 0.0)];
        assert_eq!(select_weighted(pool, 2, &mut rng()), vec![1, 2]);
    }

    #[test]
    fn heavier_item_selected_more_often() {
        // Statistical property: weight 4 vs weight 1 over many single draws.
        let mut rng = rng();
        let mut heavy = 0u32;
        let mut light = 0u32;
        for _ in 0..10_000 {
            let pool = vec![("heavy", 4.0), ("light", 1.0)];
            match select_weighted(pool, 1, &mut rng)[0] {
                "heavy" => heavy += 1,
                _ => light += 1,
            }
        }
        assert!(
            heavy > light * 2,
            "expected strong bias, got heavy={heavy} light={light}"
        );
    }

    #[test]
    fn questions_carry_correct_reading_exactly_once() {
        let module: Vec<Character> = [("a", "a"), ("b", "i"), ("c", "u"), ("d", "e"), ("e", "o")]
            .iter()
            .map(|(id, r)| chr(id, r))
            .collect();
        let questions = build_questions(&module, &module, 4, &mut rng());
        for q in &questions {
            assert_eq!(q.options.len(), 4);
            let correct = q
                .options
                .iter()
                .filter(|o| *o == &q.character.reading)
                .count();
            assert_eq!(correct, 1, "question for {}", q.character.id);
        }
    }

    #[test]
    fn distractors_shrink_with_small_modules() {
        let module: Vec<Character> = vec![chr("a", "a"), chr("b", "i")];
        let questions = build_questions(&module, &module, 4, &mut rng());
        // Only one other reading exists, so options = correct + 1 distractor.
        assert_eq!(questions[0].options.len(), 2);
    }

    #[test]
    fn duplicate_readings_deduplicated_in_distractors() {
        let module = vec![chr("a", "a"), chr("b", "ka"), chr("c", "ka"), chr("d", "sa")];
        let questions = build_questions(&module[..1], &module, 4, &mut rng());
        let q = &questions[0];
        // "ka" appears twice in the module but at most once as a distractor.
        assert!(q.options.iter().filter(|o| o.as_str() == "ka").count() <= 1);
    }

    #[test]
    fn generate_quiz_empty_module_is_empty_content() {
        let err = generate_quiz(&[], &HashMap::new(), 10, 4, 3.0, &mut rng()).unwrap_err();
        assert!(matches!(err, KanaError::EmptyContent));
    }

    #[test]
    fn generate_quiz_caps_question_count_to_pool() {
        // 5-character module with questionCount=10 → exactly 5
        // questions, each with 4 options including the correct reading once.
        let module: Vec<Character> = [("a", "a"), ("b", "i"), ("c", "u"), ("d", "e"), ("e", "o")]
            .iter()
            .map(|(id, r)| chr(id, r))
            .collect();
        let questions =
            generate_quiz(&module, &HashMap::new(), 10, 4, 3.0, &mut rng()).unwrap();
        assert_eq!(questions.len(), 5);
        let ids: BTreeSet<_> = questions.iter().map(|q| q.character.id.clone()).collect();
        assert_eq!(ids.len(), 5);
        for q in &questions {
            assert_eq!(q.options.len(), 4);
            assert_eq!(
                q.options.iter().filter(|o| *o == &q.character.reading).count(),
                1
            );
        }
    }

    #[test]
    fn generate_quiz_biases_toward_weak_characters() {
        // One character missed every time, the rest perfect. Over many
        // 1-question quizzes the weak one should dominate.
        let module: Vec<Character> = [("a", "a"), ("b", "i"), ("c", "u"), ("d", "e"), ("e", "o")]
            .iter()
            .map(|(id, r)| chr(id, r))
            .collect();
        let mut stats = HashMap::new();
        let _ = stats.insert("a".to_string(), (10, 0)); // weight 4
        for id in ["b", "c", "d", "e"] {
            let _ = stats.insert(id.to_string(), (10, 10)); // weight 1
        }
        let mut rng = rng();
        let mut weak_hits = 0u32;
        for _ in 0..2_000 {
            let qs = generate_quiz(&module, &stats, 1, 4, 3.0, &mut rng).unwrap();
            if qs[0].character.id == "a" {
                weak_hits += 1;
            }
        }
        // Expected share 4/8 = 50%; uniform would be 20%.
        assert!(weak_hits > 700, "weak hits only {weak_hits} of 2000");
    }
}
