// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the trunkq dispatch engine.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types shared across the trunkq workspace: the work item data
//! model, the queue store contract, and the channel/consumer seams the
//! dispatchers talk through.

pub mod error;
pub mod fingerprint;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TrunkqError;
pub use fingerprint::fingerprint;
pub use types::{
    ActivityKind, ChannelOptions, ChannelReply, NewWorkItem, Notification, OutcomeEntry,
    PluginEvent, StatusReport, WorkItem, WorkItemPatch, WorkStatus,
};

// Re-export all seam traits at crate root.
pub use traits::{ChannelLink, EventSink, HandlerPlugin, OperatorResolver, QueueStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        let _config = TrunkqError::Config("test".into());
        let _storage = TrunkqError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = TrunkqError::Channel {
            message: "test".into(),
            source: None,
        };
        let _consumer = TrunkqError::Consumer {
            message: "test".into(),
        };
        let _not_found = TrunkqError::ChannelNotFound {
            channel_id: "sim1".into(),
        };
        let _internal = TrunkqError::Internal("test".into());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Verifies that every seam trait compiles and is reachable through
        // the public API.
        fn _assert_queue_store<T: QueueStore>() {}
        fn _assert_channel_link<T: ChannelLink>() {}
        fn _assert_event_sink<T: EventSink>() {}
        fn _assert_handler_plugin<T: HandlerPlugin>() {}
        fn _assert_operator_resolver<T: OperatorResolver>() {}
    }
}
