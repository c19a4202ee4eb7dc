//! # kana-engine
//!
//! Adaptive quiz generation and progress scoring.
//!
//! Everything here is a pure function of its inputs (randomness comes in
//! through a caller-supplied [`rand::Rng`]), so the store and the tests
//! exercise identical code paths:
//!
//! - **Weighting**: [`weighting::selection_weight`] — accuracy-biased
//!   selection weights
//! - **Selection**: [`selector::select_weighted`] — weighted sampling
//!   without replacement; [`selector::build_questions`] — multiple-choice
//!   assembly with in-module distractors
//! - **Progress**: [`progress::evaluate`] — smoothing blend with bounded
//!   regression, unlock and completion thresholds
//! - **Mastery**: [`mastery`] — weak/mastered classification

#![deny(unsafe_code)]

pub mod mastery;
pub mod progress;
pub mod selector;
pub mod weighting;
