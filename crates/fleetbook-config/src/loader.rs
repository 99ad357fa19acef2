// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./fleetbook.toml` > `~/.config/fleetbook/fleetbook.toml`
//! > `/etc/fleetbook/fleetbook.toml` with environment variable overrides via
//! `FLEETBOOK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FleetbookConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fleetbook/fleetbook.toml` (system-wide)
/// 3. `~/.config/fleetbook/fleetbook.toml` (user XDG config)
/// 4. `./fleetbook.toml` (local directory)
/// 5. `FLEETBOOK_*` environment variables
pub fn load_config() -> Result<FleetbookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FleetbookConfig::default()))
        .merge(Toml::file("/etc/fleetbook/fleetbook.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fleetbook/fleetbook.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fleetbook.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FleetbookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FleetbookConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FleetbookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FleetbookConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `FLEETBOOK_HTTP_BASE_DELAY_MS`
/// must map to `http.base_delay_ms`, not `http.base.delay.ms`.
fn env_provider() -> Env {
    Env::prefixed("FLEETBOOK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FLEETBOOK_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("http_", "http.", 1)
            .replacen("network_", "network.", 1)
            .replacen("outbox_", "outbox.", 1)
            .replacen("intent_", "intent.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
