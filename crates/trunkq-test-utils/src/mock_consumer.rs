// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock consumers: event sinks, handler plugins, and a fixed-table
//! operator resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use trunkq_core::types::{Notification, PluginEvent};
use trunkq_core::{EventSink, HandlerPlugin, OperatorResolver, TrunkqError};

/// An event sink capturing every delivered notification.
pub struct MockSink {
    name: String,
    group: String,
    fail: AtomicBool,
    received: Mutex<Vec<Notification>>,
}

impl MockSink {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            fail: AtomicBool::new(false),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent delivery fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub async fn received(&self) -> Vec<Notification> {
        self.received.lock().await.clone()
    }

    pub async fn received_count(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait]
impl EventSink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> &str {
        &self.group
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), TrunkqError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TrunkqError::Consumer {
                message: format!("scripted delivery failure in {}", self.name),
            });
        }
        self.received.lock().await.push(notification.clone());
        Ok(())
    }
}

/// A handler plugin capturing every event, optionally vetoing each one.
pub struct MockPlugin {
    name: String,
    group: Option<String>,
    veto: bool,
    fail: AtomicBool,
    handled: Mutex<Vec<PluginEvent>>,
}

impl MockPlugin {
    pub fn new(name: impl Into<String>, group: Option<&str>) -> Self {
        Self {
            name: name.into(),
            group: group.map(str::to_string),
            veto: false,
            fail: AtomicBool::new(false),
            handled: Mutex::new(Vec::new()),
        }
    }

    /// Set the veto flag on every handled event.
    pub fn vetoing(mut self) -> Self {
        self.veto = true;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Events as seen by this plugin (after its own veto, if any).
    pub async fn handled(&self) -> Vec<PluginEvent> {
        self.handled.lock().await.clone()
    }

    pub async fn handled_count(&self) -> usize {
        self.handled.lock().await.len()
    }
}

#[async_trait]
impl HandlerPlugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    async fn handle(&self, event: &mut PluginEvent) -> Result<(), TrunkqError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TrunkqError::Consumer {
                message: format!("scripted handler failure in {}", self.name),
            });
        }
        if self.veto {
            event.veto = true;
        }
        self.handled.lock().await.push(event.clone());
        Ok(())
    }
}

/// Operator resolver backed by a fixed address-to-operator table.
#[derive(Default)]
pub struct StaticOperatorResolver {
    table: HashMap<String, String>,
}

impl StaticOperatorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: impl Into<String>, operator: impl Into<String>) -> Self {
        self.table.insert(address.into(), operator.into());
        self
    }
}

impl OperatorResolver for StaticOperatorResolver {
    fn operator_for(&self, address: &str) -> Option<String> {
        self.table.get(address).cloned()
    }
}
