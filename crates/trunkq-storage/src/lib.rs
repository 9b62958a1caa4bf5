// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite queue store for the trunkq dispatch engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! operations for the work queue and the outcome log. The atomic
//! check-then-insert in [`queries::queue::insert_if_absent`] is what makes
//! the dedup invariant hold under concurrent enqueuers.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteQueueStore;
