// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel for deterministic testing.
//!
//! `MockChannel` implements `ChannelLink` with scripted replies and status
//! reports, and captures every outbound operation for assertion in tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use trunkq_core::types::{ActivityKind, ChannelOptions, ChannelReply, StatusReport, WorkItem};
use trunkq_core::{ChannelLink, TrunkqError};

/// Scripted outcome for one dial/send/ussd invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Transport and content success.
    Success,
    /// Transport accepted, content-level failure.
    Failure,
    /// The operation itself errors out.
    Error,
}

/// A mock terminal capturing outbound operations.
///
/// Replies are consumed front-to-back from the scripted queue; when the
/// queue is empty every operation succeeds. Status queries answer from a
/// fingerprint-keyed table and error for unknown fingerprints.
pub struct MockChannel {
    id: String,
    options: ChannelOptions,
    busy: AtomicBool,
    connected: AtomicBool,
    replies: Mutex<VecDeque<ScriptedReply>>,
    reports: Mutex<HashMap<String, StatusReport>>,
    sent: Mutex<Vec<(ActivityKind, WorkItem)>>,
    status_queries: Mutex<Vec<String>>,
}

impl MockChannel {
    /// Create a connected mock channel with all capabilities enabled.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: ChannelOptions {
                allow_call: true,
                send_message: true,
                receive_message: true,
                ..ChannelOptions::default()
            },
            busy: AtomicBool::new(false),
            connected: AtomicBool::new(true),
            replies: Mutex::new(VecDeque::new()),
            reports: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            status_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_options(mut self, options: ChannelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.options.group = group.into();
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.options.priority = priority;
        self
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Queue the outcome for the next outbound operation.
    pub async fn script_reply(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Set the status report returned for a fingerprint.
    pub async fn script_status(&self, fingerprint: impl Into<String>, report: StatusReport) {
        self.reports.lock().await.insert(fingerprint.into(), report);
    }

    /// Every operation passed to `dial`/`send_message`/`ussd`, in order.
    pub async fn sent(&self) -> Vec<(ActivityKind, WorkItem)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Fingerprints the dispatcher queried status for, in order.
    pub async fn status_queries(&self) -> Vec<String> {
        self.status_queries.lock().await.clone()
    }

    async fn operate(&self, kind: ActivityKind, item: &WorkItem) -> Result<ChannelReply, TrunkqError> {
        self.sent.lock().await.push((kind, item.clone()));
        match self.replies.lock().await.pop_front() {
            None | Some(ScriptedReply::Success) => Ok(ChannelReply { success: true }),
            Some(ScriptedReply::Failure) => Ok(ChannelReply { success: false }),
            Some(ScriptedReply::Error) => Err(TrunkqError::Channel {
                message: format!("scripted {kind} error on {}", self.id),
                source: None,
            }),
        }
    }
}

#[async_trait]
impl ChannelLink for MockChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn options(&self) -> ChannelOptions {
        self.options.clone()
    }

    async fn busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    async fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn dial(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError> {
        self.operate(ActivityKind::Call, item).await
    }

    async fn send_message(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError> {
        self.operate(ActivityKind::Sms, item).await
    }

    async fn ussd(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError> {
        self.operate(ActivityKind::Ussd, item).await
    }

    async fn query_status(&self, fingerprint: &str) -> Result<StatusReport, TrunkqError> {
        self.status_queries.lock().await.push(fingerprint.to_string());
        self.reports
            .lock()
            .await
            .get(fingerprint)
            .cloned()
            .ok_or_else(|| TrunkqError::Channel {
                message: format!("no status report for {fingerprint}"),
                source: None,
            })
    }
}
