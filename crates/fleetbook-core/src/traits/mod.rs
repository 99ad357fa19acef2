// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port traits implemented by pluggable backends.
//!
//! The outbox and intent stores are capabilities over a durable keyed store,
//! injected into the pipeline so the processing and resume logic can be unit
//! tested against in-memory fakes.

pub mod auth;
pub mod intent;
pub mod outbox;

pub use auth::AuthProvider;
pub use intent::IntentStore;
pub use outbox::OutboxStore;
