// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fleetbook booking pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Fleetbook configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FleetbookConfig {
    /// Client identity and logging settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Remote API endpoints.
    #[serde(default)]
    pub api: ApiConfig,

    /// Resilient request executor settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Network status monitor settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Persistent outbox settings.
    #[serde(default)]
    pub outbox: OutboxConfig,

    /// Booking intent settings.
    #[serde(default)]
    pub intent: IntentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Client identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote API endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the booking backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the lightweight health endpoint used by heartbeat probes.
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_path: default_health_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

/// Resilient request executor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Retry budget for idempotent-safe requests.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-attempt request timeout, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            base_delay_ms: default_base_delay_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_retries() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Network status monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Seconds between heartbeat probes.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Heartbeat probe timeout, in milliseconds.
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,

    /// Consecutive probe failures before `effective_online` flips false.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

fn default_heartbeat_interval_secs() -> u64 {
    15
}

fn default_heartbeat_timeout_ms() -> u64 {
    5_000
}

fn default_failure_threshold() -> u32 {
    2
}

/// Persistent outbox configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutboxConfig {
    /// Delivery attempts before an item is retained for inspection
    /// instead of being retried.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

/// Booking intent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntentConfig {
    /// Seconds before a persisted intent expires and is purged on read.
    #[serde(default = "default_intent_expiry_secs")]
    pub expiry_secs: u64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            expiry_secs: default_intent_expiry_secs(),
        }
    }
}

fn default_intent_expiry_secs() -> u64 {
    3_600
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
        .map(|p| p.join("fleetbook").join("fleetbook.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("fleetbook.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
