// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue store contract: the durable work queue and outcome log.

use async_trait::async_trait;

use crate::error::TrunkqError;
use crate::types::{ActivityKind, NewWorkItem, OutcomeEntry, WorkItem, WorkItemPatch, WorkStatus};

/// Durable store of work items and their outcome log.
///
/// One typed method per query, mirroring how the dispatchers consume the
/// store. Items are never deleted; dispatchers only flip `processed`,
/// `status` and `retry_count`.
#[async_trait]
pub trait QueueStore: Send + Sync + 'static {
    /// The terminal dispatcher snapshot for one channel: unprocessed
    /// outbound work plus retry-eligible failed SMS
    /// (`retry_count < max_retry`; the count tracks completed retries),
    /// ordered by `(priority ASC, processed ASC, submitted_at ASC)`.
    async fn due_for_channel(
        &self,
        channel_id: &str,
        max_retry: i64,
    ) -> Result<Vec<WorkItem>, TrunkqError>;

    /// The activity dispatcher snapshot: unprocessed inbound events
    /// (ring/inbox/cusd), ordered by `(priority ASC, submitted_at ASC)`.
    async fn pending_inbound(&self) -> Result<Vec<WorkItem>, TrunkqError>;

    /// Number of unprocessed items with this `(channel_id, fingerprint)`.
    async fn count_active(
        &self,
        channel_id: &str,
        fingerprint: &str,
    ) -> Result<i64, TrunkqError>;

    /// Idempotent insert: persists the item unless an unprocessed item with
    /// the same `(channel_id, fingerprint)` already exists. Returns the
    /// inserted row, or `None` when deduplicated. The check and the insert
    /// run atomically on the store's single writer.
    async fn insert_if_absent(
        &self,
        item: &NewWorkItem,
    ) -> Result<Option<WorkItem>, TrunkqError>;

    /// Apply a partial update and return the updated row.
    async fn update(&self, id: i64, patch: &WorkItemPatch) -> Result<WorkItem, TrunkqError>;

    /// Append a row to the outcome log.
    async fn append_outcome(&self, entry: &OutcomeEntry) -> Result<(), TrunkqError>;

    /// Patch the existing outcome row keyed by
    /// `(channel_id, fingerprint, kind)`, e.g. on an SMS delivery report.
    /// Returns the number of rows patched.
    async fn patch_outcome(
        &self,
        channel_id: &str,
        fingerprint: &str,
        kind: ActivityKind,
        status: WorkStatus,
        delivered_at: Option<&str>,
    ) -> Result<usize, TrunkqError>;

    /// Recent-activity read model: the newest item per address among the
    /// given kinds, newest first, paginated.
    async fn most_recent_per_address(
        &self,
        kinds: &[ActivityKind],
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WorkItem>, TrunkqError>;
}
