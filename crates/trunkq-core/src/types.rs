// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the trunkq dispatch engine.
//!
//! The work queue data model lives here so the storage and dispatch crates
//! share one vocabulary: [`WorkItem`] rows, the six [`ActivityKind`]s, the
//! outcome log shape, and the read-only views of channels and consumers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Priority values for work items. Lower value = higher precedence.
pub mod priority {
    /// Processed before normal work.
    pub const ABOVE: i64 = 10;
    /// Default priority for new work items.
    pub const NORMAL: i64 = 20;
    /// Background work, drained last.
    pub const BELOW: i64 = 50;
}

/// The six event/work categories routed by the engine.
///
/// Call/Sms/Ussd are channel-bound outbound work consumed by a terminal
/// dispatcher; Ring/Inbox/Cusd are inbound events fanned out to consumers
/// by the activity dispatcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Call,
    Ring,
    Sms,
    Inbox,
    Ussd,
    Cusd,
}

impl ActivityKind {
    /// Outbound kinds are transmitted through a channel.
    pub fn is_outbound(self) -> bool {
        matches!(self, Self::Call | Self::Sms | Self::Ussd)
    }

    /// Inbound kinds are fanned out to registered consumers.
    pub fn is_inbound(self) -> bool {
        matches!(self, Self::Ring | Self::Inbox | Self::Cusd)
    }
}

/// Delivery status of a work item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Pending,
    Success,
    Failed,
}

/// A persisted unit of work in the queue.
///
/// Rows are created by an upstream recorder or an enqueue entry point,
/// mutated exactly once by the dispatcher that consumes them, and never
/// deleted (retained for audit/log correlation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i64,
    pub channel_id: String,
    pub kind: ActivityKind,
    /// Content hash used for idempotent insert; at most one unprocessed
    /// item per `(channel_id, fingerprint)` exists at a time.
    pub fingerprint: String,
    pub address: String,
    pub payload: String,
    /// Lower value = higher precedence. See [`priority`].
    pub priority: i64,
    pub processed: bool,
    pub status: WorkStatus,
    pub retry_count: i64,
    /// ISO-8601 UTC timestamp (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
    pub submitted_at: String,
}

/// Insert shape for a new work item. `id` and `submitted_at` are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkItem {
    pub channel_id: String,
    pub kind: ActivityKind,
    pub fingerprint: String,
    pub address: String,
    pub payload: String,
    pub priority: i64,
}

impl NewWorkItem {
    /// Create a new item at [`priority::NORMAL`] with the fingerprint
    /// derived from its content.
    pub fn new(
        channel_id: impl Into<String>,
        kind: ActivityKind,
        address: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        let channel_id = channel_id.into();
        let address = address.into();
        let payload = payload.into();
        let fingerprint = crate::fingerprint(&channel_id, kind, &address, &payload);
        Self {
            channel_id,
            kind,
            fingerprint,
            address,
            payload,
            priority: priority::NORMAL,
        }
    }

    /// Override the default priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial update applied to a work item by the dispatcher that consumed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemPatch {
    pub processed: Option<bool>,
    pub status: Option<WorkStatus>,
    pub retry_count: Option<i64>,
}

/// One row of the append-only outcome log, keyed by
/// `(channel_id, fingerprint, kind)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    pub channel_id: String,
    pub kind: ActivityKind,
    pub fingerprint: String,
    pub address: String,
    pub status: WorkStatus,
    /// Set when a delivery report confirms hand-off, ISO-8601 UTC.
    pub delivered_at: Option<String>,
}

/// Read-only capability/routing options of a channel, owned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOptions {
    /// Lower value = preferred during terminal selection.
    pub priority: i64,
    /// Routing group; sinks and plugins are scoped to it.
    pub group: String,
    pub allow_call: bool,
    pub send_message: bool,
    pub receive_message: bool,
    /// When non-empty, outbound work (except USSD) is restricted to
    /// addresses whose resolved operator appears here.
    pub operator_allow_list: Vec<String>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            priority: priority::NORMAL,
            group: String::new(),
            allow_call: false,
            send_message: false,
            receive_message: false,
            operator_allow_list: Vec::new(),
        }
    }
}

/// Transport-level reply from a channel operation. A channel may report
/// transport success without content success; `success` is the content flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelReply {
    pub success: bool,
}

/// Channel-side delivery status for a fingerprint, used by SMS retry
/// reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub success: bool,
    pub fingerprint: String,
    pub status: WorkStatus,
}

/// Typed notification fanned out to event sinks for inbound work.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    Ring {
        fingerprint: String,
        address: String,
        time: String,
    },
    Message {
        fingerprint: String,
        address: String,
        payload: String,
        time: String,
    },
    Ussd {
        fingerprint: String,
        address: String,
        payload: String,
        time: String,
    },
}

impl Notification {
    /// Build the kind-typed notification for an inbound work item.
    /// Returns `None` for outbound kinds, which are never fanned out.
    pub fn for_item(item: &WorkItem) -> Option<Self> {
        match item.kind {
            ActivityKind::Ring => Some(Self::Ring {
                fingerprint: item.fingerprint.clone(),
                address: item.address.clone(),
                time: item.submitted_at.clone(),
            }),
            ActivityKind::Inbox => Some(Self::Message {
                fingerprint: item.fingerprint.clone(),
                address: item.address.clone(),
                payload: item.payload.clone(),
                time: item.submitted_at.clone(),
            }),
            ActivityKind::Cusd => Some(Self::Ussd {
                fingerprint: item.fingerprint.clone(),
                address: item.address.clone(),
                payload: item.payload.clone(),
                time: item.submitted_at.clone(),
            }),
            _ => None,
        }
    }
}

/// Mutable view of an inbound event handed to handler plugins.
///
/// A plugin may set `veto` to signal "stop here"; the flag is recorded and
/// logged but fan-out always completes (observed behavior of the source
/// system; the short-circuit was never effective).
#[derive(Debug, Clone, PartialEq)]
pub struct PluginEvent {
    pub kind: ActivityKind,
    pub channel_id: String,
    pub fingerprint: String,
    pub address: String,
    pub payload: String,
    pub time: String,
    pub veto: bool,
}

impl PluginEvent {
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            kind: item.kind,
            channel_id: item.channel_id.clone(),
            fingerprint: item.fingerprint.clone(),
            address: item.address.clone(),
            payload: item.payload.clone(),
            time: item.submitted_at.clone(),
            veto: false,
        }
    }
}

/// Current UTC time in the ISO-8601 shape the store writes
/// (`strftime('%Y-%m-%dT%H:%M:%fZ')` equivalent).
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn activity_kind_has_six_variants_with_stable_names() {
        let variants = [
            (ActivityKind::Call, "call"),
            (ActivityKind::Ring, "ring"),
            (ActivityKind::Sms, "sms"),
            (ActivityKind::Inbox, "inbox"),
            (ActivityKind::Ussd, "ussd"),
            (ActivityKind::Cusd, "cusd"),
        ];
        assert_eq!(variants.len(), 6, "ActivityKind must have exactly 6 variants");

        for (kind, name) in variants {
            assert_eq!(kind.to_string(), name);
            assert_eq!(ActivityKind::from_str(name).unwrap(), kind);
        }
    }

    #[test]
    fn outbound_and_inbound_partition_the_kinds() {
        for kind in [
            ActivityKind::Call,
            ActivityKind::Ring,
            ActivityKind::Sms,
            ActivityKind::Inbox,
            ActivityKind::Ussd,
            ActivityKind::Cusd,
        ] {
            assert_ne!(kind.is_outbound(), kind.is_inbound());
        }
        assert!(ActivityKind::Call.is_outbound());
        assert!(ActivityKind::Ring.is_inbound());
        assert!(ActivityKind::Cusd.is_inbound());
    }

    #[test]
    fn work_status_wire_names() {
        assert_eq!(WorkStatus::Pending.to_string(), "pending");
        assert_eq!(WorkStatus::Success.to_string(), "success");
        assert_eq!(WorkStatus::Failed.to_string(), "failed");
        assert_eq!(WorkStatus::from_str("failed").unwrap(), WorkStatus::Failed);
    }

    #[test]
    fn priority_ordering() {
        assert!(priority::ABOVE < priority::NORMAL);
        assert!(priority::NORMAL < priority::BELOW);
    }

    #[test]
    fn new_work_item_defaults_to_normal_priority() {
        let item = NewWorkItem::new("sim1", ActivityKind::Sms, "31612345678", "hello");
        assert_eq!(item.priority, priority::NORMAL);
        assert!(!item.fingerprint.is_empty());

        let above = item.clone().with_priority(priority::ABOVE);
        assert_eq!(above.priority, priority::ABOVE);
        // Priority does not participate in the fingerprint.
        assert_eq!(above.fingerprint, item.fingerprint);
    }

    fn inbound_item(kind: ActivityKind) -> WorkItem {
        WorkItem {
            id: 1,
            channel_id: "sim1".into(),
            kind,
            fingerprint: "fp".into(),
            address: "31612345678".into(),
            payload: "payload".into(),
            priority: priority::NORMAL,
            processed: false,
            status: WorkStatus::Pending,
            retry_count: 0,
            submitted_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn notification_shape_follows_kind() {
        match Notification::for_item(&inbound_item(ActivityKind::Ring)) {
            Some(Notification::Ring { address, .. }) => assert_eq!(address, "31612345678"),
            other => panic!("expected Ring notification, got {other:?}"),
        }
        match Notification::for_item(&inbound_item(ActivityKind::Inbox)) {
            Some(Notification::Message { payload, .. }) => assert_eq!(payload, "payload"),
            other => panic!("expected Message notification, got {other:?}"),
        }
        match Notification::for_item(&inbound_item(ActivityKind::Cusd)) {
            Some(Notification::Ussd { .. }) => {}
            other => panic!("expected Ussd notification, got {other:?}"),
        }
        assert!(Notification::for_item(&inbound_item(ActivityKind::Sms)).is_none());
    }

    #[test]
    fn notification_wire_shape_is_type_tagged_lowercase() {
        let n = Notification::for_item(&inbound_item(ActivityKind::Inbox)).unwrap();
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["address"], "31612345678");
        assert_eq!(json["payload"], "payload");
        assert_eq!(json["time"], "2026-01-01T00:00:00.000Z");

        let ring = Notification::for_item(&inbound_item(ActivityKind::Ring)).unwrap();
        let json = serde_json::to_value(&ring).unwrap();
        assert_eq!(json["type"], "ring");
        assert!(json.get("payload").is_none(), "ring carries no payload");
    }

    #[test]
    fn plugin_event_starts_without_veto() {
        let event = PluginEvent::from_item(&inbound_item(ActivityKind::Inbox));
        assert!(!event.veto);
        assert_eq!(event.channel_id, "sim1");
    }

    #[test]
    fn now_iso_matches_store_timestamp_shape() {
        let ts = now_iso();
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }
}
