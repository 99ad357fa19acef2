// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot booking intent store with expiry and save notifications.
//!
//! A new save overwrites whatever was there; the user's latest wish wins.
//! Expiry is enforced lazily on read, so a stale intent from yesterday's
//! session cannot trigger a surprise booking today.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use fleetbook_core::{BookingIntent, FleetbookError, IntentStore};

/// Published on the intent event channel.
#[derive(Debug, Clone)]
pub enum IntentEvent {
    Saved(BookingIntent),
}

/// Wraps an [`IntentStore`] with expiry handling and a broadcast channel
/// announcing saves to interested components.
pub struct BookingIntents {
    store: Arc<dyn IntentStore>,
    expiry: Duration,
    events: broadcast::Sender<IntentEvent>,
}

impl BookingIntents {
    pub fn new(store: Arc<dyn IntentStore>, expiry_secs: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            expiry: Duration::seconds(expiry_secs as i64),
            events,
        }
    }

    /// Subscribes to intent-saved notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<IntentEvent> {
        self.events.subscribe()
    }

    /// Persists a fresh book-car intent, replacing any existing one, and
    /// notifies subscribers.
    pub async fn save(&self, car_id: &str) -> Result<BookingIntent, FleetbookError> {
        let intent = BookingIntent::book_car(car_id);
        self.store.put(&intent).await?;
        info!(car_id, "booking intent saved");
        let _ = self.events.send(IntentEvent::Saved(intent.clone()));
        Ok(intent)
    }

    /// Returns the stored intent, purging it first if it has expired.
    pub async fn get(&self) -> Result<Option<BookingIntent>, FleetbookError> {
        match self.store.get().await? {
            Some(intent) if intent.age(Utc::now()) > self.expiry => {
                debug!(car_id = %intent.car_id, "purging expired booking intent");
                self.store.delete().await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Removes the stored intent, if any.
    pub async fn clear(&self) -> Result<(), FleetbookError> {
        self.store.delete().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetbook_core::IntentKind;
    use fleetbook_test_utils::MemoryIntentStore;

    fn intents(store: Arc<MemoryIntentStore>) -> BookingIntents {
        BookingIntents::new(store, 3_600)
    }

    #[tokio::test]
    async fn save_overwrites_previous_intent() {
        let store = Arc::new(MemoryIntentStore::new());
        let intents = intents(store);

        intents.save("car-1").await.unwrap();
        intents.save("car-2").await.unwrap();

        let current = intents.get().await.unwrap().unwrap();
        assert_eq!(current.car_id, "car-2");
        assert_eq!(current.kind, IntentKind::BookCar);
    }

    #[tokio::test]
    async fn save_notifies_subscribers() {
        let store = Arc::new(MemoryIntentStore::new());
        let intents = intents(store);
        let mut rx = intents.subscribe();

        intents.save("car-3").await.unwrap();

        let IntentEvent::Saved(saved) = rx.recv().await.unwrap();
        assert_eq!(saved.car_id, "car-3");
    }

    #[tokio::test]
    async fn expired_intent_is_purged_on_read() {
        let store = Arc::new(MemoryIntentStore::new());
        let stale = BookingIntent {
            kind: IntentKind::BookCar,
            car_id: "car-9".into(),
            created_at: Utc::now() - Duration::hours(2),
        };
        store.put(&stale).await.unwrap();

        let intents = intents(store.clone());
        assert!(intents.get().await.unwrap().is_none());
        // Purged from the store, not just hidden.
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fresh_intent_survives_read() {
        let store = Arc::new(MemoryIntentStore::new());
        let intents = intents(store);

        intents.save("car-4").await.unwrap();
        assert!(intents.get().await.unwrap().is_some());
        assert!(intents.get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_removes_the_intent() {
        let store = Arc::new(MemoryIntentStore::new());
        let intents = intents(store);

        intents.save("car-5").await.unwrap();
        intents.clear().await.unwrap();
        assert!(intents.get().await.unwrap().is_none());
    }
}
