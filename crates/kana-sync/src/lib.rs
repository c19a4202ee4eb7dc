//! Client-side answer sync queue.
//!
//! Quizzes are scored locally first; answers are queued per session and
//! delivered to the backing store in the background with retry and
//! backoff. Undelivered answers spill to a JSON file per session so a
//! restart does not lose them.
//!
//! Delivery goes through the [`Transport`] seam, so tests substitute a
//! scripted double and production wires in [`StoreTransport`].

pub mod errors;
pub mod queue;
pub mod spill;
pub mod transport;

pub use errors::SyncError;
pub use queue::{QueueConfig, QueuedAnswer, SyncQueue, SyncState};
pub use spill::SpillStore;
pub use transport::{StoreTransport, Transport};
