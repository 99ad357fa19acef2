// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory single-slot intent store for unit tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use fleetbook_core::{BookingIntent, FleetbookError, IntentStore};

#[derive(Default)]
pub struct MemoryIntentStore {
    slot: Mutex<Option<BookingIntent>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntentStore for MemoryIntentStore {
    async fn put(&self, intent: &BookingIntent) -> Result<(), FleetbookError> {
        *self.slot.lock().await = Some(intent.clone());
        Ok(())
    }

    async fn get(&self) -> Result<Option<BookingIntent>, FleetbookError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn delete(&self) -> Result<(), FleetbookError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_and_delete_empties() {
        let store = MemoryIntentStore::new();
        store.put(&BookingIntent::book_car("car-1")).await.unwrap();
        store.put(&BookingIntent::book_car("car-2")).await.unwrap();

        assert_eq!(store.get().await.unwrap().unwrap().car_id, "car-2");

        store.delete().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }
}
