// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam trait definitions for the trunkq dispatch engine.
//!
//! The dispatchers talk to every collaborator through these traits: the
//! durable queue store, the host-owned channels, and the registered
//! consumers. All async traits use `#[async_trait]` for dynamic dispatch.

pub mod channel;
pub mod consumer;
pub mod operator;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use channel::ChannelLink;
pub use consumer::{EventSink, HandlerPlugin};
pub use operator::OperatorResolver;
pub use store::QueueStore;
