// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enqueue entry points used by the host and by plugins requesting
//! outbound work against a specific channel.
//!
//! Every insert funnels through the store's atomic insert-if-absent, so
//! dedup by `(channel_id, fingerprint)` holds regardless of caller. After
//! enqueueing, the caller signals the owning dispatcher dirty.

use tracing::debug;

use trunkq_core::types::{ActivityKind, NewWorkItem, WorkItem};
use trunkq_core::{QueueStore, TrunkqError};

/// Queue one unit of work. Returns the inserted item, or `None` when an
/// unprocessed item with the same content is already queued.
pub async fn enqueue_work(
    store: &dyn QueueStore,
    channel_id: &str,
    kind: ActivityKind,
    address: &str,
    payload: &str,
    priority: Option<i64>,
) -> Result<Option<WorkItem>, TrunkqError> {
    let mut item = NewWorkItem::new(channel_id, kind, address, payload);
    if let Some(priority) = priority {
        item = item.with_priority(priority);
    }
    let inserted = store.insert_if_absent(&item).await?;
    match &inserted {
        Some(row) => debug!(id = row.id, channel = channel_id, %kind, "work enqueued"),
        None => debug!(channel = channel_id, %kind, fingerprint = %item.fingerprint, "duplicate work suppressed"),
    }
    Ok(inserted)
}

/// Queue a USSD command against a channel. The command travels in the
/// address field; USSD work has no payload.
pub async fn enqueue_ussd(
    store: &dyn QueueStore,
    channel_id: &str,
    command: &str,
) -> Result<Option<WorkItem>, TrunkqError> {
    enqueue_work(store, channel_id, ActivityKind::Ussd, command, "", None).await
}
