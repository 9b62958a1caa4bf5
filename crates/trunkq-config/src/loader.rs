// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./trunkq.toml` > `~/.config/trunkq/trunkq.toml`
//! > `/etc/trunkq/trunkq.toml` with environment variable overrides via the
//! `TRUNKQ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TrunkqConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/trunkq/trunkq.toml` (system-wide)
/// 3. `~/.config/trunkq/trunkq.toml` (user XDG config)
/// 4. `./trunkq.toml` (local directory)
/// 5. `TRUNKQ_*` environment variables
pub fn load_config() -> Result<TrunkqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrunkqConfig::default()))
        .merge(Toml::file("/etc/trunkq/trunkq.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("trunkq/trunkq.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("trunkq.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<TrunkqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrunkqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TrunkqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrunkqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TRUNKQ_DISPATCH_MAX_RETRY` must map to
/// `dispatch.max_retry`, not `dispatch.max.retry`.
fn env_provider() -> Env {
    Env::prefixed("TRUNKQ_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: TRUNKQ_DISPATCH_MAX_RETRY -> "dispatch_max_retry"
        let mapped = key
            .as_str()
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("gate_", "gate.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.dispatch.reload_interval_secs, 300);
        assert_eq!(config.dispatch.max_retry, 3);
    }

    #[test]
    fn load_from_str_overrides_sections() {
        let config = load_config_from_str(
            r#"
            [dispatch]
            reload_interval_secs = 60
            max_retry = 5

            [gate]
            premium_number_length = 6
            blacklist = ["31699999999"]
            "#,
        )
        .unwrap();
        assert_eq!(config.dispatch.reload_interval_secs, 60);
        assert_eq!(config.dispatch.max_retry, 5);
        assert_eq!(config.gate.premium_number_length, 6);
        assert_eq!(config.gate.blacklist, vec!["31699999999".to_string()]);
        // Untouched section keeps its default.
        assert_eq!(config.storage.database_path, "trunkq.db");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [dispatch]
            relaod_interval_secs = 60
            "#,
        );
        assert!(result.is_err(), "typo'd key must be rejected");
    }
}
