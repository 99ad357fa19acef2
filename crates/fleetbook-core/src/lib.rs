// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fleetbook booking pipeline.
//!
//! This crate provides the foundational error type, domain types, port
//! traits, and the idempotency key generator used throughout the Fleetbook
//! workspace. Storage backends and the auth provider implement the traits
//! defined here.

pub mod error;
pub mod idempotency;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FleetbookError;
pub use idempotency::{generate_idempotency_key, DEFAULT_IDEMPOTENCY_PREFIX};
pub use traits::{AuthProvider, IntentStore, OutboxStore};
pub use types::{
    BookingIntent, Car, IntentKind, NetworkStatus, OutboxItem, OutboxKind, ReservationOutcome,
    ReservationRequest, UserProfile,
};
