// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch and scheduling engine for the trunkq work queue.
//!
//! Decides, for each pending unit of work, which channel or consumer
//! handles it, in what order, with what retry and idempotency guarantees,
//! and how inbound fan-out is scoped. Two dispatcher flavors share one
//! polling primitive:
//!
//! - [`terminal::TerminalDispatcher`] — one per channel; drains outbound
//!   call/SMS/USSD work one item at a time when its channel signals idle.
//! - [`activity::ActivityDispatcher`] — single global instance; fans
//!   inbound ring/inbox/cusd events out to registered sinks and plugins.
//!
//! All dispatcher logic runs on the owning task; the host communicates
//! through plain mpsc signal channels, so internal state needs no locking.

pub mod activity;
pub mod enqueue;
pub mod gate;
pub mod poll;
pub mod registry;
pub mod select;
pub mod terminal;

pub use activity::{ActivityDispatcher, ActivitySignal};
pub use enqueue::{enqueue_ussd, enqueue_work};
pub use gate::{AddressGate, GateVerdict};
pub use registry::DispatchRegistry;
pub use select::select_terminal;
pub use terminal::{TerminalDispatcher, TerminalSignal};
