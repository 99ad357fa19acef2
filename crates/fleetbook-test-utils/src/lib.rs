// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fleetbook integration tests.
//!
//! Provides in-memory implementations of the storage ports and a
//! controllable auth provider for fast, deterministic, CI-runnable tests
//! without a real persistence engine or auth service.
//!
//! # Components
//!
//! - [`MemoryOutboxStore`] - in-memory [`OutboxStore`](fleetbook_core::OutboxStore)
//! - [`MemoryIntentStore`] - in-memory [`IntentStore`](fleetbook_core::IntentStore)
//! - [`MockAuthProvider`] - auth provider with a settable current user

pub mod memory_intent;
pub mod memory_outbox;
pub mod mock_auth;

pub use memory_intent::MemoryIntentStore;
pub use memory_outbox::MemoryOutboxStore;
pub use mock_auth::MockAuthProvider;
