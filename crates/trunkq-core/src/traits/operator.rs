// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator lookup seam used by the terminal selection allow-list filter.

/// Resolves the mobile operator serving an address.
///
/// The lookup itself (number-plan tables, HLR dips) is host-provided; the
/// engine only compares the result against a channel's operator allow-list.
pub trait OperatorResolver: Send + Sync + 'static {
    /// Operator name for the address, or `None` when unknown.
    fn operator_for(&self, address: &str) -> Option<String>;
}
