// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of channels and consumers shared between the host and the
//! activity dispatcher.
//!
//! Handles are cloned out as `Arc<dyn …>` so fan-out loops never hold the
//! lock across an await.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use trunkq_core::{ChannelLink, EventSink, HandlerPlugin};

#[derive(Default)]
struct Inner {
    channels: Vec<Arc<dyn ChannelLink>>,
    sinks: Vec<Arc<dyn EventSink>>,
    plugins: Vec<Arc<dyn HandlerPlugin>>,
}

/// Host registry of channels, event sinks, and handler plugins.
///
/// The engine holds non-owning references; channel and consumer lifecycles
/// stay with the host. Registration order is preserved — plugins run in the
/// order they were added.
#[derive(Default)]
pub struct DispatchRegistry {
    inner: RwLock<Inner>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel, replacing any previous registration with the
    /// same id.
    pub async fn add_channel(&self, channel: Arc<dyn ChannelLink>) {
        let mut inner = self.inner.write().await;
        inner.channels.retain(|c| c.id() != channel.id());
        debug!(channel = channel.id(), "channel registered");
        inner.channels.push(channel);
    }

    pub async fn add_sink(&self, sink: Arc<dyn EventSink>) {
        let mut inner = self.inner.write().await;
        debug!(sink = sink.name(), group = sink.group(), "event sink registered");
        inner.sinks.push(sink);
    }

    pub async fn add_plugin(&self, plugin: Arc<dyn HandlerPlugin>) {
        let mut inner = self.inner.write().await;
        debug!(plugin = plugin.name(), "handler plugin registered");
        inner.plugins.push(plugin);
    }

    /// Look up a channel by id.
    pub async fn channel(&self, id: &str) -> Option<Arc<dyn ChannelLink>> {
        self.inner
            .read()
            .await
            .channels
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    pub async fn channels(&self) -> Vec<Arc<dyn ChannelLink>> {
        self.inner.read().await.channels.clone()
    }

    pub async fn sinks(&self) -> Vec<Arc<dyn EventSink>> {
        self.inner.read().await.sinks.clone()
    }

    pub async fn plugins(&self) -> Vec<Arc<dyn HandlerPlugin>> {
        self.inner.read().await.plugins.clone()
    }

    pub async fn channel_count(&self) -> usize {
        self.inner.read().await.channels.len()
    }

    /// Total registered consumers (sinks plus plugins).
    pub async fn consumer_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.sinks.len() + inner.plugins.len()
    }
}
