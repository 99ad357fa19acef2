// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage port for the single-slot booking intent.

use async_trait::async_trait;

use crate::error::FleetbookError;
use crate::types::BookingIntent;

/// Durable single-slot store for the pending booking intent.
///
/// `put` overwrites any existing intent; at most one exists at a time.
/// Expiry is enforced by the layer above, not by implementations.
#[async_trait]
pub trait IntentStore: Send + Sync {
    async fn put(&self, intent: &BookingIntent) -> Result<(), FleetbookError>;

    async fn get(&self) -> Result<Option<BookingIntent>, FleetbookError>;

    async fn delete(&self) -> Result<(), FleetbookError>;
}
