// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent outbox for write requests that failed while offline.
//!
//! Eligible writes are captured with their idempotency key and replayed
//! once connectivity returns. Replay is bounded: after the attempt ceiling
//! an item stays in the store for inspection instead of looping forever.
//!
//! Payment-shaped endpoints are never queued. Replaying a charge minutes
//! after the user walked away is worse than losing the request.

pub mod policy;
pub mod processor;

pub use policy::is_queueable;
pub use processor::{ItemOutcome, OutboxProcessor, ProcessReport};
