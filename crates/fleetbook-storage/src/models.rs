// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `fleetbook-core::types` for use across
//! the port trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use fleetbook_core::types::{BookingIntent, OutboxItem, OutboxKind};
