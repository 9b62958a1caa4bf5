// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the trunkq dispatch engine.

use thiserror::Error;

/// The primary error type used across the trunkq seam traits and core operations.
///
/// Dispatcher entry points never surface these to the host: every failure
/// path terminates in a log line and a persisted status update. The variants
/// exist for the collaborator boundaries (store, channels, consumers).
#[derive(Debug, Error)]
pub enum TrunkqError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Queue store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel operation errors (dial/send/ussd rejection, status query failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Consumer delivery errors (sink notification or plugin handler failure).
    #[error("consumer error: {message}")]
    Consumer { message: String },

    /// A work item referenced a channel that is not registered.
    #[error("channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
