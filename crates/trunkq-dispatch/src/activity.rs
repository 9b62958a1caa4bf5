// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global activity dispatcher for inbound events.
//!
//! A single instance consumes channel-agnostic inbound work (ring, inbox,
//! cusd), gates addresses, and fans each event out to every registered
//! consumer scoped to the owning channel's group. Exactly one event is in
//! flight at a time; the next is only popped once fan-out completed and the
//! outcome is persisted.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use trunkq_config::{DispatchConfig, GateConfig};
use trunkq_core::types::{ActivityKind, Notification, PluginEvent, WorkItem, WorkItemPatch, WorkStatus};
use trunkq_core::{ChannelLink, OperatorResolver, QueueStore};

use crate::gate::{AddressGate, GateVerdict};
use crate::poll::PollState;
use crate::registry::DispatchRegistry;
use crate::select;

const SIGNAL_BUFFER: usize = 64;

/// Signals driving the activity dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    /// A new inbound event was recorded.
    Dirty,
    /// Re-run the check cycle (self-scheduled after each processed item).
    Poll,
    /// The one-shot fallback timer elapsed.
    TimerFired,
}

/// Single global dispatcher fanning inbound events out to consumers.
pub struct ActivityDispatcher {
    poll: PollState,
    store: Arc<dyn QueueStore>,
    registry: Arc<DispatchRegistry>,
    operators: Arc<dyn OperatorResolver>,
    gate: AddressGate,
    processing: bool,
    timer_armed: bool,
    /// Weak self-sender for Poll/TimerFired, so the dispatcher alone never
    /// keeps its own signal channel open.
    signals: mpsc::WeakSender<ActivitySignal>,
    inbox: mpsc::Receiver<ActivitySignal>,
}

impl ActivityDispatcher {
    /// Build the dispatcher plus the sender the host uses to push signals.
    /// `run` ends once every sender is dropped.
    pub fn new(
        store: Arc<dyn QueueStore>,
        registry: Arc<DispatchRegistry>,
        operators: Arc<dyn OperatorResolver>,
        dispatch: &DispatchConfig,
        gate: &GateConfig,
    ) -> (Self, mpsc::Sender<ActivitySignal>) {
        let (signals, inbox) = mpsc::channel(SIGNAL_BUFFER);
        let dispatcher = Self {
            poll: PollState::new(std::time::Duration::from_secs(dispatch.reload_interval_secs)),
            store,
            registry,
            operators,
            gate: AddressGate::new(gate),
            processing: false,
            timer_armed: false,
            signals: signals.downgrade(),
            inbox,
        };
        (dispatcher, signals)
    }

    /// Consume signals until the host drops every handle.
    pub async fn run(mut self) {
        while let Some(signal) = self.inbox.recv().await {
            match signal {
                ActivitySignal::Dirty => {
                    self.poll.mark_dirty();
                    self.check().await;
                }
                ActivitySignal::Poll => self.check().await,
                ActivitySignal::TimerFired => {
                    self.timer_armed = false;
                    self.check().await;
                }
            }
        }
        debug!("activity dispatcher stopped");
    }

    /// One check cycle: skip (with the reason logged) unless at least one
    /// channel AND one consumer is registered, refresh the snapshot if
    /// needed, then process.
    pub async fn check(&mut self) {
        let channels = self.registry.channel_count().await;
        let consumers = self.registry.consumer_count().await;
        if channels == 0 || consumers == 0 {
            debug!(channels, consumers, "activity check skipped: nothing to dispatch to");
            return;
        }
        let store = Arc::clone(&self.store);
        self.poll
            .reload_if_needed(move || async move { store.pending_inbound().await })
            .await;
        self.process().await;
    }

    /// Pop and fully resolve at most one inbound event.
    ///
    /// An empty snapshot arms the one-shot fallback timer so the store is
    /// re-polled after the reload interval even with zero external signals.
    async fn process(&mut self) {
        if self.processing {
            debug!("inbound event already in flight");
            return;
        }
        let Some(item) = self.poll.pop() else {
            self.arm_poll_timer();
            return;
        };

        self.processing = true;
        let allowed = self.process_queue(&item).await;
        let patch = WorkItemPatch {
            processed: Some(true),
            status: Some(if allowed {
                WorkStatus::Success
            } else {
                WorkStatus::Failed
            }),
            retry_count: None,
        };
        if let Err(e) = self.store.update(item.id, &patch).await {
            warn!(id = item.id, error = %e, "work item update failed");
        }
        self.processing = false;

        // Schedule the next cycle; a full buffer means one is already queued.
        if let Some(signals) = self.signals.upgrade() {
            let _ = signals.try_send(ActivitySignal::Poll);
        }
    }

    /// Gate and fan out one inbound event. Returns whether it passed the
    /// allow gate (which becomes the persisted status).
    async fn process_queue(&self, item: &WorkItem) -> bool {
        let Some(channel) = self.registry.channel(&item.channel_id).await else {
            warn!(channel = %item.channel_id, id = item.id, "inbound event for unknown channel rejected");
            return false;
        };
        let options = channel.options();

        if matches!(item.kind, ActivityKind::Ring | ActivityKind::Inbox) {
            match self.gate.evaluate(&item.address) {
                GateVerdict::Allowed => {}
                verdict => {
                    info!(address = %item.address, %verdict, id = item.id, "inbound address rejected");
                    return false;
                }
            }
        }
        if item.kind == ActivityKind::Inbox && !options.receive_message {
            info!(channel = %item.channel_id, id = item.id, "inbox event on channel without receive capability rejected");
            return false;
        }

        // Stage one: sinks in the owning channel's group get the typed
        // notification.
        if let Some(notification) = Notification::for_item(item) {
            for sink in self.registry.sinks().await {
                if sink.group() != options.group {
                    debug!(
                        sink = sink.name(),
                        sink_group = sink.group(),
                        group = %options.group,
                        "sink skipped: group mismatch"
                    );
                    continue;
                }
                if let Err(e) = sink.deliver(&notification).await {
                    warn!(sink = sink.name(), error = %e, "sink delivery failed");
                }
            }
        }

        // Stage two: plugins scoped to the group, in registration order.
        // A veto is recorded but every plugin still runs.
        let mut event = PluginEvent::from_item(item);
        for plugin in self.registry.plugins().await {
            if plugin.group().is_some_and(|g| g != options.group) {
                debug!(plugin = plugin.name(), group = %options.group, "plugin skipped: group mismatch");
                continue;
            }
            let vetoed_before = event.veto;
            if let Err(e) = plugin.handle(&mut event).await {
                warn!(plugin = plugin.name(), error = %e, "plugin handler failed");
            }
            if event.veto && !vetoed_before {
                debug!(
                    plugin = plugin.name(),
                    fingerprint = %item.fingerprint,
                    "plugin requested veto, completing fan-out regardless"
                );
            }
        }

        true
    }

    /// Pick an eligible channel for outbound work. See [`select::select_terminal`].
    pub async fn select_terminal(
        &self,
        kind: ActivityKind,
        address: &str,
        group: Option<&str>,
    ) -> Option<Arc<dyn ChannelLink>> {
        select::select_terminal(&self.registry, self.operators.as_ref(), kind, address, group)
            .await
    }

    fn arm_poll_timer(&mut self) {
        if self.timer_armed {
            return;
        }
        self.timer_armed = true;
        let signals = self.signals.clone();
        let interval = self.poll.reload_interval();
        tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(signals) = signals.upgrade() {
                let _ = signals.send(ActivitySignal::TimerFired).await;
            }
        });
        debug!(secs = interval.as_secs(), "armed one-shot poll timer");
    }
}
