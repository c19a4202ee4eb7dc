//! Per-session sync queue.
//!
//! Answers enter as `pending`, move to `syncing` while a delivery attempt
//! is in flight, and settle as `synced` or — after the attempt budget is
//! spent — terminally `failed`. One delivery pass runs at a time; retries
//! back off 1s, 2s, then 5s between attempts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, warn};

use kana_settings::types::SyncSettings;

use crate::errors::SyncError;
use crate::spill::SpillStore;
use crate::transport::Transport;

/// Delivery state of one queued answer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Waiting for its first delivery attempt.
    Pending,
    /// A delivery attempt is in flight.
    Syncing,
    /// Delivered.
    Synced,
    /// Last attempt failed. Retryable until the attempt budget is spent,
    /// terminal after.
    Failed,
}

/// One locally scored answer awaiting delivery.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAnswer {
    /// Answered character.
    pub character_id: String,
    /// Submitted text.
    pub answer_text: String,
    /// Local verdict (the server re-scores on delivery).
    pub is_correct: bool,
    /// Response latency in milliseconds.
    pub latency_ms: i64,
    /// When the answer entered the queue.
    pub queued_at: DateTime<Utc>,
    /// Current delivery state.
    pub state: SyncState,
    /// Delivery attempts so far.
    pub attempts: u32,
}

/// Retry and wait behavior, usually derived from settings.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Backoff delays between attempts; the last value repeats.
    pub retry_delays: Vec<Duration>,
    /// Attempts before an answer is terminally failed.
    pub max_attempts: u32,
    /// Ceiling for [`SyncQueue::wait_for_sync`].
    pub wait_ceiling: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::from_settings(&SyncSettings::default())
    }
}

impl QueueConfig {
    /// Build from the sync section of the settings file.
    pub fn from_settings(settings: &SyncSettings) -> Self {
        let retry_delays = if settings.retry_delays_ms.is_empty() {
            vec![Duration::from_secs(1)]
        } else {
            settings
                .retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect()
        };
        Self {
            retry_delays,
            max_attempts: settings.max_attempts.max(1),
            wait_ceiling: Duration::from_millis(settings.wait_ceiling_ms),
        }
    }

    fn delay_for(&self, attempts: u32) -> Duration {
        let index = (attempts.saturating_sub(1) as usize).min(self.retry_delays.len() - 1);
        self.retry_delays[index]
    }
}

/// Sync queue for one quiz session.
pub struct SyncQueue {
    session_id: String,
    transport: Arc<dyn Transport>,
    config: QueueConfig,
    entries: Mutex<Vec<QueuedAnswer>>,
    spill: Option<SpillStore>,
    delivering: AtomicBool,
    alive: AtomicBool,
    work_notify: Notify,
    settle_notify: Notify,
}

impl SyncQueue {
    /// In-memory queue (no spill).
    pub fn new(
        session_id: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: QueueConfig,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            transport,
            config,
            entries: Mutex::new(Vec::new()),
            spill: None,
            delivering: AtomicBool::new(false),
            alive: AtomicBool::new(true),
            work_notify: Notify::new(),
            settle_notify: Notify::new(),
        }
    }

    /// Queue backed by a spill file; previously spilled unsynced answers
    /// are restored.
    pub fn with_spill(
        session_id: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: QueueConfig,
        spill: SpillStore,
    ) -> Self {
        let session_id = session_id.into();
        let restored = spill.load(&session_id);
        if !restored.is_empty() {
            debug!(
                session_id,
                restored = restored.len(),
                "restored spilled answers"
            );
        }
        Self {
            entries: Mutex::new(restored),
            spill: Some(spill),
            ..Self::new(session_id, transport, config)
        }
    }

    /// The session this queue belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue a locally scored answer for delivery.
    pub fn enqueue(
        &self,
        character_id: impl Into<String>,
        answer_text: impl Into<String>,
        is_correct: bool,
        latency_ms: i64,
    ) {
        {
            let mut entries = self.entries.lock();
            entries.push(QueuedAnswer {
                character_id: character_id.into(),
                answer_text: answer_text.into(),
                is_correct,
                latency_ms,
                queued_at: Utc::now(),
                state: SyncState::Pending,
                attempts: 0,
            });
            self.persist(&entries);
        }
        self.work_notify.notify_one();
    }

    /// Number of queued answers, any state.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the queue holds no answers at all.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Answers not yet delivered, including terminal failures.
    pub fn unsynced_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|a| a.state != SyncState::Synced)
            .count()
    }

    /// Answers that spent their attempt budget.
    pub fn failed_count(&self) -> usize {
        let entries = self.entries.lock();
        entries.iter().filter(|a| self.is_terminal(a)).count()
    }

    /// Stop delivering; in-flight timers become no-ops.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.work_notify.notify_one();
        self.settle_notify.notify_waiters();
    }

    /// Spawn the cooperative delivery task for this queue.
    ///
    /// The task wakes on [`enqueue`](Self::enqueue) and exits on
    /// [`shutdown`](Self::shutdown).
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            while queue.alive.load(Ordering::SeqCst) {
                let _ = queue.run_delivery_pass().await;
                if !queue.has_deliverable() {
                    queue.work_notify.notified().await;
                }
            }
        })
    }

    /// Run one delivery pass: attempt every deliverable answer, backing
    /// off between retries.
    ///
    /// Returns how many answers were delivered. A second caller while a
    /// pass is in flight returns immediately with 0.
    pub async fn run_delivery_pass(&self) -> usize {
        if self
            .delivering
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return 0;
        }
        let delivered = self.delivery_loop().await;
        self.delivering.store(false, Ordering::SeqCst);
        self.settle_notify.notify_waiters();
        delivered
    }

    async fn delivery_loop(&self) -> usize {
        let mut delivered = 0;
        loop {
            if !self.alive.load(Ordering::SeqCst) {
                break;
            }
            let Some((index, answer)) = self.take_next_deliverable() else {
                break;
            };

            let result = self.transport.deliver(&self.session_id, &answer).await;
            let backoff = self.settle_attempt(index, &result);
            match result {
                Ok(()) => {
                    delivered += 1;
                    counter!("kana_sync_delivered_total").increment(1);
                }
                Err(_) => {
                    counter!("kana_sync_failed_attempts_total").increment(1);
                }
            }
            if let Some(delay) = backoff {
                tokio::time::sleep(delay).await;
            }
        }
        delivered
    }

    /// Mark the next pending or retryable answer as syncing and hand out
    /// a snapshot of it.
    fn take_next_deliverable(&self) -> Option<(usize, QueuedAnswer)> {
        let mut entries = self.entries.lock();
        let index = entries.iter().position(|a| {
            matches!(a.state, SyncState::Pending)
                || (a.state == SyncState::Failed && a.attempts < self.config.max_attempts)
        })?;
        entries[index].state = SyncState::Syncing;
        let snapshot = entries[index].clone();
        Some((index, snapshot))
    }

    /// Fold a delivery result back into the entry. Returns the backoff to
    /// sleep before the next attempt, if any.
    fn settle_attempt(&self, index: usize, result: &Result<(), SyncError>) -> Option<Duration> {
        let mut entries = self.entries.lock();
        let entry = &mut entries[index];
        entry.attempts += 1;
        let backoff = match result {
            Ok(()) => {
                entry.state = SyncState::Synced;
                None
            }
            Err(SyncError::Rejected(reason)) => {
                warn!(
                    session_id = %self.session_id,
                    character_id = %entry.character_id,
                    reason,
                    "answer rejected, not retrying"
                );
                entry.state = SyncState::Failed;
                entry.attempts = self.config.max_attempts;
                None
            }
            Err(SyncError::Unavailable(reason)) => {
                entry.state = SyncState::Failed;
                if entry.attempts >= self.config.max_attempts {
                    warn!(
                        session_id = %self.session_id,
                        character_id = %entry.character_id,
                        attempts = entry.attempts,
                        reason,
                        "answer failed terminally"
                    );
                    None
                } else {
                    Some(self.config.delay_for(entry.attempts))
                }
            }
        };
        self.persist(&entries);
        backoff
    }

    /// Wait until every queued answer is synced.
    ///
    /// Resolves `true` when the queue drains; `false` once every unsynced
    /// answer is terminally failed, or at the configured ceiling.
    pub async fn wait_for_sync(&self) -> bool {
        let deadline = tokio::time::Instant::now() + self.config.wait_ceiling;
        loop {
            let settled = self.settle_notify.notified();
            {
                let entries = self.entries.lock();
                let unsynced: Vec<_> = entries
                    .iter()
                    .filter(|a| a.state != SyncState::Synced)
                    .collect();
                if unsynced.is_empty() {
                    return true;
                }
                if unsynced.iter().all(|a| self.is_terminal(a)) {
                    return false;
                }
            }
            if tokio::time::timeout_at(deadline, settled).await.is_err() {
                return false;
            }
        }
    }

    fn has_deliverable(&self) -> bool {
        self.entries.lock().iter().any(|a| {
            matches!(a.state, SyncState::Pending)
                || (a.state == SyncState::Failed && a.attempts < self.config.max_attempts)
        })
    }

    fn is_terminal(&self, answer: &QueuedAnswer) -> bool {
        answer.state == SyncState::Failed && answer.attempts >= self.config.max_attempts
    }

    fn persist(&self, entries: &[QueuedAnswer]) {
        if let Some(spill) = &self.spill {
            spill.persist(&self.session_id, entries);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
