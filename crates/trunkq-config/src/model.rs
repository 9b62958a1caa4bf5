// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the trunkq dispatch engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level trunkq configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrunkqConfig {
    /// Dispatcher polling and retry settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Inbound address gate settings.
    #[serde(default)]
    pub gate: GateConfig,

    /// Queue store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Dispatcher polling and retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Snapshot staleness fallback interval in seconds. A dispatcher whose
    /// snapshot is older than this re-polls the store even without signals.
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Maximum SMS retry count before an item is permanently failed.
    #[serde(default = "default_max_retry")]
    pub max_retry: i64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            reload_interval_secs: default_reload_interval_secs(),
            max_retry: default_max_retry(),
        }
    }
}

/// Inbound address gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Numeric addresses of this length or shorter are rejected as premium
    /// short numbers.
    #[serde(default = "default_premium_number_length")]
    pub premium_number_length: usize,

    /// Addresses rejected outright.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            premium_number_length: default_premium_number_length(),
            blacklist: Vec::new(),
        }
    }
}

/// Queue store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_reload_interval_secs() -> u64 {
    300
}

fn default_max_retry() -> i64 {
    3
}

fn default_premium_number_length() -> usize {
    5
}

fn default_database_path() -> String {
    "trunkq.db".to_string()
}
