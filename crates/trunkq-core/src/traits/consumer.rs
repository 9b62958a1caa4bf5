// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer seams: event sinks and handler plugins receiving inbound fan-out.

use async_trait::async_trait;

use crate::error::TrunkqError;
use crate::types::{Notification, PluginEvent};

/// A remote-socket-like sink receiving typed notifications for inbound
/// events. Sinks are grouped; only sinks whose group matches the owning
/// channel's group are notified.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Human-readable sink name, used in log lines.
    fn name(&self) -> &str;

    /// Routing group this sink subscribes to.
    fn group(&self) -> &str;

    /// Deliver one notification. A delivery error is logged by the
    /// dispatcher and never aborts the fan-out loop.
    async fn deliver(&self, notification: &Notification) -> Result<(), TrunkqError>;
}

/// A synchronous handler plugin invoked for every inbound event.
///
/// Plugins may set `PluginEvent::veto`; the flag is surfaced as metadata
/// but fan-out always runs every plugin to completion.
#[async_trait]
pub trait HandlerPlugin: Send + Sync + 'static {
    /// Human-readable plugin name, used in log lines.
    fn name(&self) -> &str;

    /// Optional group scope. `None` means the plugin handles all groups.
    fn group(&self) -> Option<&str>;

    /// Handle one inbound event. Errors are logged by the dispatcher and
    /// never abort the fan-out loop.
    async fn handle(&self, event: &mut PluginEvent) -> Result<(), TrunkqError>;
}
