// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Careready coordinator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup instead of silently ignoring them.

use serde::{Deserialize, Serialize};

/// Top-level Careready configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CarereadyConfig {
    /// Service identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Queue polling and redelivery settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// External inference capability settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Service identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the service.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How long a human reply suppresses that user's digital twin.
    #[serde(default = "default_pause_cooldown_minutes")]
    pub pause_cooldown_minutes: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            pause_cooldown_minutes: default_pause_cooldown_minutes(),
        }
    }
}

fn default_agent_name() -> String {
    "careready".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pause_cooldown_minutes() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("careready").join("careready.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("careready.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Queue polling and redelivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Bounded long-poll wait before an empty receive returns.
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,

    /// Interval between broker checks inside a long poll.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Fixed delay before a poll loop retries after a transport error.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// How long a dequeued entry stays invisible before redelivery.
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            wait_time_secs: default_wait_time_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            error_backoff_secs: default_error_backoff_secs(),
            visibility_timeout_secs: default_visibility_timeout_secs(),
        }
    }
}

fn default_wait_time_secs() -> u64 {
    20
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_error_backoff_secs() -> u64 {
    5
}

fn default_visibility_timeout_secs() -> u64 {
    300
}

/// External inference capability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// API key. `None` requires the CAREREADY_INFERENCE_API_KEY variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier for both classification and reply generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Minimum confidence before a classified update is forwarded.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_confidence_threshold() -> f64 {
    0.85
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = CarereadyConfig::default();
        assert_eq!(config.agent.name, "careready");
        assert_eq!(config.agent.pause_cooldown_minutes, 30);
        assert_eq!(config.queue.wait_time_secs, 20);
        assert_eq!(config.queue.visibility_timeout_secs, 300);
        assert!((config.inference.confidence_threshold - 0.85).abs() < f64::EPSILON);
        assert!(config.storage.wal_mode);
    }
}
