// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel terminal dispatcher.
//!
//! One instance per channel. Consumes outbound call/SMS/USSD work for its
//! channel one item at a time, driven by the channel's idle transitions,
//! with SMS-specific retry and status reconciliation. No failure ever
//! reaches the host: every path terminates in a persisted status update.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use trunkq_config::DispatchConfig;
use trunkq_core::types::{now_iso, ActivityKind, OutcomeEntry, WorkItem, WorkItemPatch, WorkStatus};
use trunkq_core::{ChannelLink, QueueStore};

use crate::poll::PollState;

/// Buffered signals per dispatcher; the host only ever needs one pending
/// idle notification, extra slots absorb bursts.
const SIGNAL_BUFFER: usize = 64;

/// Host-pushed notifications for a terminal dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSignal {
    /// The channel finished an operation and is ready for the next item.
    Idle,
    /// New or changed work may exist for this channel.
    Dirty,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// The channel's status query confirmed an earlier delivery; nothing
    /// was resent.
    Reconciled,
    /// An operation ran; the flag is the channel's content-level success.
    Sent(bool),
}

/// Dispatcher for one channel's outbound work queue.
pub struct TerminalDispatcher {
    channel_id: String,
    max_retry: i64,
    poll: PollState,
    store: Arc<dyn QueueStore>,
    channel: Arc<dyn ChannelLink>,
    inbox: mpsc::Receiver<TerminalSignal>,
}

impl TerminalDispatcher {
    /// Build the dispatcher plus the sender the host uses to push
    /// idle/dirty signals. `run` ends once every sender is dropped.
    pub fn new(
        channel: Arc<dyn ChannelLink>,
        store: Arc<dyn QueueStore>,
        config: &DispatchConfig,
    ) -> (Self, mpsc::Sender<TerminalSignal>) {
        let (signals, inbox) = mpsc::channel(SIGNAL_BUFFER);
        let dispatcher = Self {
            channel_id: channel.id().to_string(),
            max_retry: config.max_retry,
            poll: PollState::new(std::time::Duration::from_secs(config.reload_interval_secs)),
            store,
            channel,
            inbox,
        };
        (dispatcher, signals)
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Consume signals until the host drops every handle.
    pub async fn run(mut self) {
        while let Some(signal) = self.inbox.recv().await {
            match signal {
                TerminalSignal::Dirty => self.poll.mark_dirty(),
                TerminalSignal::Idle => self.on_idle().await,
            }
        }
        debug!(channel = %self.channel_id, "terminal dispatcher stopped");
    }

    /// React to the channel going idle: refresh the snapshot if needed,
    /// then drain at most one item.
    pub async fn on_idle(&mut self) {
        let store = Arc::clone(&self.store);
        let channel_id = self.channel_id.clone();
        let max_retry = self.max_retry;
        self.poll
            .reload_if_needed(move || async move {
                store.due_for_channel(&channel_id, max_retry).await
            })
            .await;
        self.check().await;
    }

    /// Pop exactly one item when the channel is free and process it.
    async fn check(&mut self) {
        if self.channel.busy().await {
            debug!(channel = %self.channel_id, "channel busy, holding queue");
            return;
        }
        let Some(item) = self.poll.pop() else {
            debug!(channel = %self.channel_id, "terminal queue empty");
            return;
        };
        let attempt = self.process(&item).await;
        self.finish(item, attempt).await;
        debug!(channel = %self.channel_id, remaining = self.poll.len(), "terminal queue state");
    }

    /// Run the channel operation for one item.
    ///
    /// SMS retries first ask the channel for the fingerprint's delivery
    /// status: a confirmed success is taken as-is instead of resending a
    /// message whose outcome was merely recorded late. An outstanding
    /// report or a failed query falls through to a resend.
    async fn process(&self, item: &WorkItem) -> Attempt {
        if item.kind == ActivityKind::Sms && item.processed {
            match self.channel.query_status(&item.fingerprint).await {
                Ok(report)
                    if report.success
                        && report.fingerprint == item.fingerprint
                        && report.status == WorkStatus::Success =>
                {
                    info!(
                        channel = %self.channel_id,
                        fingerprint = %item.fingerprint,
                        "sms already delivered, skipping resend"
                    );
                    return Attempt::Reconciled;
                }
                Ok(report) => {
                    debug!(
                        channel = %self.channel_id,
                        fingerprint = %item.fingerprint,
                        status = %report.status,
                        "status query inconclusive, resending"
                    );
                }
                Err(e) => {
                    warn!(
                        channel = %self.channel_id,
                        fingerprint = %item.fingerprint,
                        error = %e,
                        "status query failed, resending"
                    );
                }
            }
        }

        let reply = match item.kind {
            ActivityKind::Call => self.channel.dial(item).await,
            ActivityKind::Sms => self.channel.send_message(item).await,
            ActivityKind::Ussd => self.channel.ussd(item).await,
            other => {
                warn!(channel = %self.channel_id, kind = %other, id = item.id, "inbound kind in terminal snapshot");
                return Attempt::Sent(false);
            }
        };
        match reply {
            Ok(r) => Attempt::Sent(r.success),
            Err(e) => {
                warn!(channel = %self.channel_id, id = item.id, error = %e, "channel operation failed");
                Attempt::Sent(false)
            }
        }
    }

    /// Persist the attempt: flip `processed`, derive `status`, advance the
    /// retry counter for failed SMS retries, and write the outcome log
    /// (every kind except USSD, whose exchanges are transient).
    async fn finish(&self, item: WorkItem, attempt: Attempt) {
        let success = match attempt {
            Attempt::Reconciled => true,
            Attempt::Sent(success) => success,
        };
        let status = if success {
            WorkStatus::Success
        } else {
            WorkStatus::Failed
        };

        let mut patch = WorkItemPatch {
            processed: Some(true),
            status: Some(status),
            retry_count: None,
        };
        // The counter tracks completed retries: a failed retry advances it,
        // the initial attempt does not.
        if !success && item.kind == ActivityKind::Sms && item.processed {
            patch.retry_count = Some(item.retry_count + 1);
        }
        if let Err(e) = self.store.update(item.id, &patch).await {
            warn!(channel = %self.channel_id, id = item.id, error = %e, "work item update failed");
        }

        if item.kind == ActivityKind::Ussd {
            return;
        }
        let delivered_at = success.then(now_iso);
        let logged = if item.processed {
            // A retry patches the log row written by the first attempt;
            // append anyway if that row is gone.
            match self
                .store
                .patch_outcome(
                    &item.channel_id,
                    &item.fingerprint,
                    item.kind,
                    status,
                    delivered_at.as_deref(),
                )
                .await
            {
                Ok(0) => self.append_outcome(&item, status, delivered_at.clone()).await,
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            }
        } else {
            self.append_outcome(&item, status, delivered_at).await
        };
        if let Err(e) = logged {
            warn!(channel = %self.channel_id, id = item.id, error = %e, "outcome log write failed");
        }
    }

    async fn append_outcome(
        &self,
        item: &WorkItem,
        status: WorkStatus,
        delivered_at: Option<String>,
    ) -> Result<(), trunkq_core::TrunkqError> {
        self.store
            .append_outcome(&OutcomeEntry {
                channel_id: item.channel_id.clone(),
                kind: item.kind,
                fingerprint: item.fingerprint.clone(),
                address: item.address.clone(),
                status,
                delivered_at,
            })
            .await
    }
}
