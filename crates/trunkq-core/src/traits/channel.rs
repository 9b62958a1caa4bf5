// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel seam: the read-only view of a physical terminal.

use async_trait::async_trait;

use crate::error::TrunkqError;
use crate::types::{ChannelOptions, ChannelReply, StatusReport, WorkItem};

/// Non-owning view of a communication terminal (e.g. a cellular line).
///
/// The host owns the channel lifecycle and driver; the engine only inspects
/// state, reads capability options, and requests outbound operations.
/// Operation failures are caught at the dispatch boundary and converted to
/// failed outcomes, never propagated to the host.
#[async_trait]
pub trait ChannelLink: Send + Sync + 'static {
    /// Stable channel identifier matching `WorkItem::channel_id`.
    fn id(&self) -> &str;

    /// Capability flags, routing group, priority and operator allow-list.
    fn options(&self) -> ChannelOptions;

    /// Whether an operation is currently in flight on this channel.
    async fn busy(&self) -> bool;

    /// Whether the channel is connected and usable.
    async fn connected(&self) -> bool;

    /// Place a voice call for the item.
    async fn dial(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError>;

    /// Send the item's payload as an SMS to its address.
    async fn send_message(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError>;

    /// Run the item's address as a USSD command.
    async fn ussd(&self, item: &WorkItem) -> Result<ChannelReply, TrunkqError>;

    /// Query channel-side delivery status for a fingerprint, used to
    /// reconcile SMS retries whose outcome was recorded late.
    async fn query_status(&self, fingerprint: &str) -> Result<StatusReport, TrunkqError>;
}
