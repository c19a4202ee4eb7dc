//! High-level transactional store.

pub mod quiz_store;
