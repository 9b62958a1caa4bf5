// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading and validation for the trunkq dispatch engine.
//!
//! Layered merging via Figment: compiled defaults, system and user TOML
//! files, a local `trunkq.toml`, and `TRUNKQ_*` environment overrides.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DispatchConfig, GateConfig, StorageConfig, TrunkqConfig};
pub use validation::{validate_config, ConfigError};
