//! # kana-core
//!
//! Foundation types, errors, IDs, and the built-in curriculum for Kana.
//!
//! This crate provides the shared vocabulary that all other Kana crates
//! depend on:
//!
//! - **Curriculum**: [`curriculum::Character`], [`curriculum::Module`] and
//!   the built-in gojūon dataset for both syllabaries
//! - **Reading comparison**: [`curriculum::readings_match`] — the single
//!   correctness rule shared by server and client scoring
//! - **IDs**: prefixed string IDs from UUID v7 ([`ids`])
//! - **Errors**: [`errors::KanaError`] taxonomy via `thiserror`, with wire
//!   reason codes
//! - **Logging**: [`logging::init_tracing`] tracing-subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other kana crates.

#![deny(unsafe_code)]

pub mod curriculum;
pub mod errors;
pub mod ids;
pub mod logging;

pub use errors::{KanaError, Result};
