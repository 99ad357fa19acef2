// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotency key generation for write operations.
//!
//! A key is generated once per logical write attempt and reused across every
//! HTTP retry of that attempt, letting the server deduplicate replays. Keys
//! are never reused across distinct user actions.

use uuid::Uuid;

/// Prefix used when the caller has no domain-specific one.
pub const DEFAULT_IDEMPOTENCY_PREFIX: &str = "idem";

/// Generate a `<prefix>_<token>` key, unique for the process lifetime.
///
/// The token is a v4 UUID, so uniqueness holds across processes too.
pub fn generate_idempotency_key(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
