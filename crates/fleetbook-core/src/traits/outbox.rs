// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage port for the persistent outbox.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FleetbookError;
use crate::types::OutboxItem;

/// Durable store for deferred write requests.
///
/// Implementations must survive process restarts: the outbox is the mechanism
/// by which an enqueued request completes even if the owning process dies
/// immediately after enqueue.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Persist a new item. Fails if the id already exists.
    async fn insert(&self, item: &OutboxItem) -> Result<(), FleetbookError>;

    /// Fetch a single item by id.
    async fn get(&self, id: &str) -> Result<Option<OutboxItem>, FleetbookError>;

    /// All items in creation order.
    async fn list_all(&self) -> Result<Vec<OutboxItem>, FleetbookError>;

    /// Persist an attempt bump and timestamp.
    ///
    /// Called *before* the network send so a crash mid-flight cannot
    /// under-count attempts.
    async fn record_attempt(
        &self,
        id: &str,
        attempts: u32,
        at: DateTime<Utc>,
    ) -> Result<(), FleetbookError>;

    /// Store the latest delivery error on an item, leaving it queued.
    async fn record_error(&self, id: &str, error: &str) -> Result<(), FleetbookError>;

    /// Remove an item. Only called once its request ultimately succeeded.
    async fn remove(&self, id: &str) -> Result<(), FleetbookError>;

    /// Remove every item.
    async fn clear(&self) -> Result<(), FleetbookError>;

    /// Number of items currently queued.
    async fn count(&self) -> Result<u64, FleetbookError>;
}
