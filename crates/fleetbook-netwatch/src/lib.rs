// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network status monitoring for the Fleetbook booking pipeline.
//!
//! Tracks whether the booking backend is actually reachable, as opposed to
//! what the local network interface claims. A lightweight heartbeat probe
//! runs on a fixed interval; transient probe misses are absorbed so that a
//! single dropped packet does not flip the app into offline mode.
//!
//! Consumers subscribe to a [`tokio::sync::watch`] channel and react to
//! [`NetworkStatus`](fleetbook_core::NetworkStatus) transitions.

pub mod monitor;

pub use monitor::NetworkMonitor;
