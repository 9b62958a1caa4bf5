// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared polling/caching primitive underneath both dispatcher flavors.
//!
//! `PollState` keeps an in-memory snapshot of due work, a dirty counter fed
//! by external signals, and a staleness timer that forces a re-poll even
//! when every signal was missed. Each dispatcher owns its `PollState` by
//! value; no process-wide state exists.

use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use trunkq_core::types::WorkItem;
use trunkq_core::TrunkqError;

/// Snapshot cache with signal-driven and time-based reload policies.
pub struct PollState {
    dirty: u64,
    snapshot: VecDeque<WorkItem>,
    loading: bool,
    last_load: Option<Instant>,
    reload_interval: Duration,
}

impl PollState {
    pub fn new(reload_interval: Duration) -> Self {
        Self {
            dirty: 0,
            snapshot: VecDeque::new(),
            loading: false,
            last_load: None,
            reload_interval,
        }
    }

    /// Record an external signal that new or changed work may exist.
    pub fn mark_dirty(&mut self) {
        self.dirty += 1;
    }

    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    pub fn reload_interval(&self) -> Duration {
        self.reload_interval
    }

    /// Whether the snapshot is older than the reload interval (or was never
    /// loaded).
    pub fn is_stale(&self) -> bool {
        self.last_load
            .is_none_or(|t| t.elapsed() >= self.reload_interval)
    }

    /// Reload the snapshot from the store when dirty signals are pending or
    /// the snapshot is empty. A stale snapshot forces one extra dirty tick
    /// first, as a fallback against missed signals.
    pub async fn reload_if_needed<F, Fut>(&mut self, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<WorkItem>, TrunkqError>>,
    {
        if self.is_stale() && !self.loading {
            self.mark_dirty();
        }
        if self.dirty > 0 || self.snapshot.is_empty() {
            self.load(fetch).await;
        }
    }

    /// Replace the snapshot with fresh results from the store.
    ///
    /// The dirty counter and snapshot are reset synchronously at entry, so a
    /// dirty signal that arrives while the fetch is in flight survives for
    /// the next cycle. A fetch error leaves the snapshot empty; the caller
    /// proceeds with no work rather than seeing the failure.
    pub async fn load<F, Fut>(&mut self, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<WorkItem>, TrunkqError>>,
    {
        if self.loading {
            return;
        }
        self.loading = true;
        self.dirty = 0;
        self.snapshot.clear();

        match fetch().await {
            Ok(items) => {
                debug!(count = items.len(), "snapshot reloaded");
                self.snapshot = items.into();
            }
            Err(e) => {
                warn!(error = %e, "snapshot reload failed, keeping empty snapshot");
            }
        }
        self.last_load = Some(Instant::now());
        self.loading = false;
    }

    /// Pop the head of the ordered snapshot.
    pub fn pop(&mut self) -> Option<WorkItem> {
        self.snapshot.pop_front()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trunkq_core::types::{priority, ActivityKind, WorkStatus};

    fn item(id: i64) -> WorkItem {
        WorkItem {
            id,
            channel_id: "sim1".into(),
            kind: ActivityKind::Sms,
            fingerprint: format!("fp{id}"),
            address: "31612345678".into(),
            payload: String::new(),
            priority: priority::NORMAL,
            processed: false,
            status: WorkStatus::Pending,
            retry_count: 0,
            submitted_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn load_resets_dirty_and_replaces_snapshot() {
        let mut poll = PollState::new(Duration::from_secs(300));
        poll.mark_dirty();
        poll.mark_dirty();
        assert_eq!(poll.dirty(), 2);

        poll.load(|| async { Ok(vec![item(1), item(2)]) }).await;
        assert_eq!(poll.dirty(), 0);
        assert_eq!(poll.len(), 2);
        assert_eq!(poll.pop().unwrap().id, 1);
    }

    #[tokio::test]
    async fn reload_skipped_when_clean_and_snapshot_nonempty() {
        let mut poll = PollState::new(Duration::from_secs(300));
        poll.load(|| async { Ok(vec![item(1)]) }).await;

        // Clean, non-empty, fresh: the fetch must not run.
        poll.reload_if_needed(|| async {
            panic!("fetch must not run");
        })
        .await;
        assert_eq!(poll.len(), 1);
    }

    #[tokio::test]
    async fn empty_snapshot_always_reloads() {
        let mut poll = PollState::new(Duration::from_secs(300));
        poll.load(|| async { Ok(vec![]) }).await;
        assert_eq!(poll.dirty(), 0);

        poll.reload_if_needed(|| async { Ok(vec![item(7)]) }).await;
        assert_eq!(poll.len(), 1);
    }

    #[tokio::test]
    async fn stale_snapshot_forces_a_dirty_tick_and_reload() {
        // Zero interval: everything is immediately stale.
        let mut poll = PollState::new(Duration::from_secs(0));
        poll.load(|| async { Ok(vec![item(1)]) }).await;

        poll.reload_if_needed(|| async { Ok(vec![item(2), item(3)]) }).await;
        assert_eq!(poll.len(), 2, "stale snapshot must reload despite being non-empty");
    }

    #[tokio::test]
    async fn fetch_error_degrades_to_empty_snapshot() {
        let mut poll = PollState::new(Duration::from_secs(300));
        poll.mark_dirty();
        poll.reload_if_needed(|| async {
            Err(TrunkqError::Internal("store down".into()))
        })
        .await;
        assert!(poll.is_empty());
        assert_eq!(poll.dirty(), 0, "a failed load still consumes the dirty ticks");
    }
}
