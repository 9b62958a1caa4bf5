// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound address gate: premium-length, blacklist and numeric checks.
//!
//! Gate rejections are policy decisions, not errors: the item is marked
//! processed with a failed status and the verdict is logged.

use std::collections::HashSet;

use trunkq_config::GateConfig;

/// Outcome of evaluating an inbound address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Allowed,
    /// Address appears on the configured blacklist.
    Blacklisted,
    /// Address is not a plain numeric address.
    NotNumeric,
    /// Numeric address short enough to be a premium short number.
    Premium,
}

impl std::fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateVerdict::Allowed => write!(f, "allowed"),
            GateVerdict::Blacklisted => write!(f, "blacklisted"),
            GateVerdict::NotNumeric => write!(f, "not-numeric"),
            GateVerdict::Premium => write!(f, "premium-length"),
        }
    }
}

/// Address gate applied to ring and inbox events before fan-out.
pub struct AddressGate {
    premium_length: usize,
    blacklist: HashSet<String>,
}

impl AddressGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            premium_length: config.premium_number_length,
            blacklist: config.blacklist.iter().cloned().collect(),
        }
    }

    /// Evaluate one address. Blacklist wins over shape checks so a
    /// blacklisted alphanumeric sender id is reported as blacklisted.
    pub fn evaluate(&self, address: &str) -> GateVerdict {
        if self.blacklist.contains(address) {
            return GateVerdict::Blacklisted;
        }
        let digits = address.strip_prefix('+').unwrap_or(address);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return GateVerdict::NotNumeric;
        }
        if digits.len() <= self.premium_length {
            return GateVerdict::Premium;
        }
        GateVerdict::Allowed
    }
}
