// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for the queue store.
//!
//! One async function per query, each taking `&Database` and running on the
//! single writer thread.

pub mod outcome;
pub mod queue;
