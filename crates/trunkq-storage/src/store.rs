// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `QueueStore` trait.

use async_trait::async_trait;

use trunkq_core::types::{
    ActivityKind, NewWorkItem, OutcomeEntry, WorkItem, WorkItemPatch, WorkStatus,
};
use trunkq_core::{QueueStore, TrunkqError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed queue store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. Every operation runs on the single writer thread.
pub struct SqliteQueueStore {
    db: Database,
}

impl SqliteQueueStore {
    /// Open (or create) the store at the given path and run migrations.
    pub async fn open(path: &str) -> Result<Self, TrunkqError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Open the store at the path named by the storage configuration.
    pub async fn from_config(config: &trunkq_config::StorageConfig) -> Result<Self, TrunkqError> {
        Self::open(&config.database_path).await
    }

    /// In-memory store, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, TrunkqError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Access the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Fetch one work item by id (host-side reporting).
    pub async fn item(&self, id: i64) -> Result<Option<WorkItem>, TrunkqError> {
        queries::queue::get_by_id(&self.db, id).await
    }

    /// Outcome rows for one log key, oldest first (host-side reporting).
    pub async fn outcome_entries(
        &self,
        channel_id: &str,
        fingerprint: &str,
        kind: ActivityKind,
    ) -> Result<Vec<OutcomeEntry>, TrunkqError> {
        queries::outcome::entries_for_key(&self.db, channel_id, fingerprint, kind).await
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn due_for_channel(
        &self,
        channel_id: &str,
        max_retry: i64,
    ) -> Result<Vec<WorkItem>, TrunkqError> {
        queries::queue::due_for_channel(&self.db, channel_id, max_retry).await
    }

    async fn pending_inbound(&self) -> Result<Vec<WorkItem>, TrunkqError> {
        queries::queue::pending_inbound(&self.db).await
    }

    async fn count_active(
        &self,
        channel_id: &str,
        fingerprint: &str,
    ) -> Result<i64, TrunkqError> {
        queries::queue::count_active(&self.db, channel_id, fingerprint).await
    }

    async fn insert_if_absent(
        &self,
        item: &NewWorkItem,
    ) -> Result<Option<WorkItem>, TrunkqError> {
        queries::queue::insert_if_absent(&self.db, item).await
    }

    async fn update(&self, id: i64, patch: &WorkItemPatch) -> Result<WorkItem, TrunkqError> {
        queries::queue::update(&self.db, id, patch).await
    }

    async fn append_outcome(&self, entry: &OutcomeEntry) -> Result<(), TrunkqError> {
        queries::outcome::append(&self.db, entry).await
    }

    async fn patch_outcome(
        &self,
        channel_id: &str,
        fingerprint: &str,
        kind: ActivityKind,
        status: WorkStatus,
        delivered_at: Option<&str>,
    ) -> Result<usize, TrunkqError> {
        queries::outcome::patch(&self.db, channel_id, fingerprint, kind, status, delivered_at)
            .await
    }

    async fn most_recent_per_address(
        &self,
        kinds: &[ActivityKind],
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WorkItem>, TrunkqError> {
        queries::queue::most_recent_per_address(&self.db, kinds, offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use trunkq_core::types::priority;

    async fn open_store() -> (tempfile::TempDir, SqliteQueueStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = SqliteQueueStore::open(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    fn sms(channel: &str, address: &str, payload: &str) -> NewWorkItem {
        NewWorkItem::new(channel, ActivityKind::Sms, address, payload)
    }

    #[tokio::test]
    async fn open_runs_migrations_on_fresh_databases() {
        // File-backed and in-memory opens both leave a usable schema behind.
        let (_dir, store) = open_store().await;
        assert!(store.due_for_channel("sim1", 3).await.unwrap().is_empty());

        let mem = SqliteQueueStore::open_in_memory().await.unwrap();
        let item = mem
            .insert_if_absent(&sms("sim1", "31612345678", "hello"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.item(item.id).await.unwrap().unwrap().payload, "hello");
    }

    #[tokio::test]
    async fn duplicate_insert_is_deduplicated() {
        let (_dir, store) = open_store().await;

        let first = store.insert_if_absent(&sms("sim1", "31612345678", "hello")).await.unwrap();
        assert!(first.is_some());

        let second = store.insert_if_absent(&sms("sim1", "31612345678", "hello")).await.unwrap();
        assert!(second.is_none(), "second insert of the same content must dedup");

        let first = first.unwrap();
        assert_eq!(
            store.count_active("sim1", &first.fingerprint).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn same_content_on_another_channel_is_not_deduplicated() {
        let (_dir, store) = open_store().await;

        assert!(store.insert_if_absent(&sms("sim1", "31612345678", "hello")).await.unwrap().is_some());
        assert!(store.insert_if_absent(&sms("sim2", "31612345678", "hello")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn processed_item_frees_the_fingerprint_for_reinsert() {
        let (_dir, store) = open_store().await;

        let item = store
            .insert_if_absent(&sms("sim1", "31612345678", "hello"))
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                item.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: Some(WorkStatus::Success),
                    retry_count: None,
                },
            )
            .await
            .unwrap();

        // Nothing active anymore, so the same content may be queued again.
        assert_eq!(store.count_active("sim1", &item.fingerprint).await.unwrap(), 0);
        assert!(store.insert_if_absent(&sms("sim1", "31612345678", "hello")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn due_for_channel_orders_by_priority_then_age() {
        let (_dir, store) = open_store().await;

        store
            .insert_if_absent(&sms("sim1", "31600000001", "low").with_priority(priority::BELOW))
            .await
            .unwrap();
        store
            .insert_if_absent(&sms("sim1", "31600000002", "high").with_priority(priority::ABOVE))
            .await
            .unwrap();
        store
            .insert_if_absent(&sms("sim1", "31600000003", "normal"))
            .await
            .unwrap();

        let due = store.due_for_channel("sim1", 3).await.unwrap();
        let priorities: Vec<i64> = due.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, vec![10, 20, 50]);
    }

    #[tokio::test]
    async fn due_for_channel_includes_retry_eligible_sms_only() {
        let (_dir, store) = open_store().await;

        // A failed SMS inside the retry budget.
        let retryable = store
            .insert_if_absent(&sms("sim1", "31600000001", "retry me"))
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                retryable.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: Some(WorkStatus::Failed),
                    retry_count: Some(2),
                },
            )
            .await
            .unwrap();

        // A failed SMS that already used its whole retry budget.
        let exhausted = store
            .insert_if_absent(&sms("sim1", "31600000002", "give up"))
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                exhausted.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: Some(WorkStatus::Failed),
                    retry_count: Some(3),
                },
            )
            .await
            .unwrap();

        // A processed failed call never retries.
        let call = store
            .insert_if_absent(&NewWorkItem::new("sim1", ActivityKind::Call, "31600000003", ""))
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                call.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: Some(WorkStatus::Failed),
                    retry_count: None,
                },
            )
            .await
            .unwrap();

        let due = store.due_for_channel("sim1", 3).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, retryable.id);
    }

    #[tokio::test]
    async fn unprocessed_work_precedes_retries_at_equal_priority() {
        let (_dir, store) = open_store().await;

        let retry = store
            .insert_if_absent(&sms("sim1", "31600000001", "old retry"))
            .await
            .unwrap()
            .unwrap();
        store
            .update(
                retry.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: Some(WorkStatus::Failed),
                    retry_count: Some(1),
                },
            )
            .await
            .unwrap();

        let fresh = store
            .insert_if_absent(&sms("sim1", "31600000002", "fresh"))
            .await
            .unwrap()
            .unwrap();

        let due = store.due_for_channel("sim1", 3).await.unwrap();
        let ids: Vec<i64> = due.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![fresh.id, retry.id]);
    }

    #[tokio::test]
    async fn pending_inbound_returns_only_inbound_kinds() {
        let (_dir, store) = open_store().await;

        store.insert_if_absent(&sms("sim1", "31600000001", "outbound")).await.unwrap();
        let ring = store
            .insert_if_absent(&NewWorkItem::new("sim1", ActivityKind::Ring, "31600000002", ""))
            .await
            .unwrap()
            .unwrap();
        let inbox = store
            .insert_if_absent(
                &NewWorkItem::new("sim1", ActivityKind::Inbox, "31600000003", "hi")
                    .with_priority(priority::ABOVE),
            )
            .await
            .unwrap()
            .unwrap();

        let pending = store.pending_inbound().await.unwrap();
        let ids: Vec<i64> = pending.iter().map(|i| i.id).collect();
        // Above-priority inbox first, then the ring.
        assert_eq!(ids, vec![inbox.id, ring.id]);
    }

    #[tokio::test]
    async fn update_patches_only_given_fields() {
        let (_dir, store) = open_store().await;

        let item = store
            .insert_if_absent(&sms("sim1", "31600000001", "x"))
            .await
            .unwrap()
            .unwrap();

        let updated = store
            .update(
                item.id,
                &WorkItemPatch {
                    processed: Some(true),
                    status: None,
                    retry_count: None,
                },
            )
            .await
            .unwrap();
        assert!(updated.processed);
        assert_eq!(updated.status, WorkStatus::Pending);
        assert_eq!(updated.retry_count, 0);
        assert_eq!(updated.payload, "x");
    }

    #[tokio::test]
    async fn outcome_append_then_patch() {
        let (_dir, store) = open_store().await;

        let entry = OutcomeEntry {
            channel_id: "sim1".into(),
            kind: ActivityKind::Sms,
            fingerprint: "fp1".into(),
            address: "31600000001".into(),
            status: WorkStatus::Failed,
            delivered_at: None,
        };
        store.append_outcome(&entry).await.unwrap();

        let patched = store
            .patch_outcome(
                "sim1",
                "fp1",
                ActivityKind::Sms,
                WorkStatus::Success,
                Some("2026-01-02T03:04:05.000Z"),
            )
            .await
            .unwrap();
        assert_eq!(patched, 1);

        let rows = store.outcome_entries("sim1", "fp1", ActivityKind::Sms).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, WorkStatus::Success);
        assert_eq!(rows[0].delivered_at.as_deref(), Some("2026-01-02T03:04:05.000Z"));
    }

    #[tokio::test]
    async fn patch_outcome_on_missing_key_patches_nothing() {
        let (_dir, store) = open_store().await;
        let patched = store
            .patch_outcome("sim1", "nope", ActivityKind::Sms, WorkStatus::Success, None)
            .await
            .unwrap();
        assert_eq!(patched, 0);
    }

    #[tokio::test]
    async fn most_recent_per_address_groups_and_paginates() {
        let (_dir, store) = open_store().await;

        store
            .insert_if_absent(&NewWorkItem::new("sim1", ActivityKind::Inbox, "31600000001", "first"))
            .await
            .unwrap();
        let newer = store
            .insert_if_absent(&NewWorkItem::new("sim1", ActivityKind::Inbox, "31600000001", "second"))
            .await
            .unwrap()
            .unwrap();
        let other = store
            .insert_if_absent(&NewWorkItem::new("sim1", ActivityKind::Ring, "31600000002", ""))
            .await
            .unwrap()
            .unwrap();
        // A kind outside the filter never shows up.
        store
            .insert_if_absent(&sms("sim1", "31600000001", "outbound"))
            .await
            .unwrap();

        let kinds = [ActivityKind::Ring, ActivityKind::Inbox, ActivityKind::Cusd];
        let recent = store.most_recent_per_address(&kinds, 0, 10).await.unwrap();
        assert_eq!(recent.len(), 2, "one row per address");
        // Newest first across addresses.
        assert_eq!(recent[0].id, other.id);
        assert_eq!(recent[1].id, newer.id);
        assert_eq!(recent[1].payload, "second");

        let page = store.most_recent_per_address(&kinds, 1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, newer.id);

        assert!(store.most_recent_per_address(&[], 0, 10).await.unwrap().is_empty());
    }
}
