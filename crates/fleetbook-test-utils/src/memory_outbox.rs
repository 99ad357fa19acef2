// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory outbox store for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use fleetbook_core::{FleetbookError, OutboxItem, OutboxStore};

/// Vec-backed store preserving insertion order, mirroring the SQLite
/// implementation's creation-order listing.
#[derive(Default)]
pub struct MemoryOutboxStore {
    items: Mutex<Vec<OutboxItem>>,
}

impl MemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutboxStore for MemoryOutboxStore {
    async fn insert(&self, item: &OutboxItem) -> Result<(), FleetbookError> {
        let mut items = self.items.lock().await;
        if items.iter().any(|i| i.id == item.id) {
            return Err(FleetbookError::Internal(format!(
                "duplicate outbox id: {}",
                item.id
            )));
        }
        items.push(item.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<OutboxItem>, FleetbookError> {
        let items = self.items.lock().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<OutboxItem>, FleetbookError> {
        Ok(self.items.lock().await.clone())
    }

    async fn record_attempt(
        &self,
        id: &str,
        attempts: u32,
        at: DateTime<Utc>,
    ) -> Result<(), FleetbookError> {
        let mut items = self.items.lock().await;
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.attempts = attempts;
            item.last_attempt_at = Some(at);
        }
        Ok(())
    }

    async fn record_error(&self, id: &str, error: &str) -> Result<(), FleetbookError> {
        let mut items = self.items.lock().await;
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), FleetbookError> {
        self.items.lock().await.retain(|i| i.id != id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), FleetbookError> {
        self.items.lock().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, FleetbookError> {
        Ok(self.items.lock().await.len() as u64)
    }
}
