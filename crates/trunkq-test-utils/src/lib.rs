// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for trunkq: deterministic mock channels, sinks, plugins,
//! an operator resolver with a fixed table, and a temp-database harness.

pub mod harness;
pub mod mock_channel;
pub mod mock_consumer;

pub use harness::temp_store;
pub use mock_channel::{MockChannel, ScriptedReply};
pub use mock_consumer::{MockPlugin, MockSink, StaticOperatorResolver};
