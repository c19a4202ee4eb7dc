//! # kana-store
//!
//! SQLite persistence and the transactional [`store::QuizStore`].
//!
//! Layout mirrors the two-level design the rest of the service relies on:
//!
//! - [`sqlite`] — connection pool, migrations + curriculum seed, row types,
//!   and stateless per-table repositories whose methods take `&Connection`
//! - [`store`] — the high-level [`store::QuizStore`]: every multi-step
//!   write (answer + score + stats, completion + progress) runs in a single
//!   transaction behind per-session write locks, so callers never observe
//!   partial state
//!
//! ## Crate Position
//!
//! Depends on kana-core (curriculum, errors), kana-engine (selection and
//! progress math), kana-settings (quiz parameters). Depended on by
//! kana-server and the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;
pub mod types;

pub use errors::{Result, StoreError};
pub use store::quiz_store::QuizStore;
