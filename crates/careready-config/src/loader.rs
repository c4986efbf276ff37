// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./careready.toml` > `~/.config/careready/careready.toml`
//! > `/etc/careready/careready.toml`, with environment variable overrides via
//! the `CAREREADY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CarereadyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/careready/careready.toml` (system-wide)
/// 3. `~/.config/careready/careready.toml` (user XDG config)
/// 4. `./careready.toml` (local directory)
/// 5. `CAREREADY_*` environment variables
pub fn load_config() -> Result<CarereadyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarereadyConfig::default()))
        .merge(Toml::file("/etc/careready/careready.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("careready/careready.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("careready.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CarereadyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarereadyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CarereadyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarereadyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CAREREADY_QUEUE_WAIT_TIME_SECS` must map
/// to `queue.wait_time_secs`, not `queue.wait.time.secs`.
fn env_provider() -> Env {
    Env::prefixed("CAREREADY_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("inference_", "inference.", 1);
        mapped.into()
    })
}
