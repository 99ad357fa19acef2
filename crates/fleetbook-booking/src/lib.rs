// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking flow for the Fleetbook pipeline.
//!
//! Covers the interrupted-booking story end to end: a user who taps "book"
//! while signed out gets their intent persisted, is sent through auth, and
//! on return the resume coordinator picks the intent up and carries the
//! booking forward. The reservation call itself is a single atomic server
//! operation deduplicated by a per-attempt idempotency key.

pub mod cars;
pub mod intents;
pub mod reservation;
pub mod resume;

pub use cars::CarClient;
pub use intents::{BookingIntents, IntentEvent};
pub use reservation::ReservationClient;
pub use resume::ResumeCoordinator;
