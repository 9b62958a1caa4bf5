// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal selection for outbound work.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use trunkq_core::types::ActivityKind;
use trunkq_core::{ChannelLink, OperatorResolver};

use crate::registry::DispatchRegistry;

/// Pick a channel able to carry `kind` work to `address`.
///
/// A channel is eligible iff it is connected, matches the group filter when
/// one is given, carries the capability the kind requires (calls need
/// `allow_call`, SMS needs `send_message`), and — when it restricts
/// operators and the kind is not USSD — the address's resolved operator is
/// on its allow-list.
///
/// Eligible channels are sorted by ascending priority, but the final pick
/// is a uniform random index over the FULL eligible set, not the lowest
/// priority tier. This is deliberate load spreading across every usable
/// channel (see DESIGN.md for the flagged sort/pick discrepancy).
pub async fn select_terminal(
    registry: &DispatchRegistry,
    operators: &dyn OperatorResolver,
    kind: ActivityKind,
    address: &str,
    group: Option<&str>,
) -> Option<Arc<dyn ChannelLink>> {
    let mut eligible: Vec<Arc<dyn ChannelLink>> = Vec::new();

    for channel in registry.channels().await {
        if !channel.connected().await {
            continue;
        }
        let options = channel.options();
        if group.is_some_and(|g| options.group != g) {
            continue;
        }
        if kind == ActivityKind::Call && !options.allow_call {
            continue;
        }
        if kind == ActivityKind::Sms && !options.send_message {
            continue;
        }
        if !options.operator_allow_list.is_empty() && kind != ActivityKind::Ussd {
            match operators.operator_for(address) {
                Some(op) if options.operator_allow_list.contains(&op) => {}
                _ => continue,
            }
        }
        eligible.push(channel);
    }

    if eligible.is_empty() {
        debug!(%kind, address, ?group, "no eligible terminal");
        return None;
    }

    eligible.sort_by_key(|c| c.options().priority);
    let index = rand::thread_rng().gen_range(0..eligible.len());
    let picked = eligible.swap_remove(index);
    debug!(%kind, address, channel = picked.id(), candidates = eligible.len() + 1, "terminal selected");
    Some(picked)
}
