// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the storage port traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use fleetbook_config::model::StorageConfig;
use fleetbook_core::{BookingIntent, FleetbookError, IntentStore, OutboxItem, OutboxStore};

use crate::database::Database;
use crate::queries;

/// Open the database described by `config` and hand back both stores over it.
///
/// The stores share the single writer thread; cloning the [`Database`] is cheap.
pub async fn open_stores(
    config: &StorageConfig,
) -> Result<(SqliteOutboxStore, SqliteIntentStore), FleetbookError> {
    let db = Database::open_with(&config.database_path, config.wal_mode).await?;
    debug!(path = %config.database_path, "SQLite stores initialized");
    Ok((
        SqliteOutboxStore::new(db.clone()),
        SqliteIntentStore::new(db),
    ))
}

/// SQLite-backed outbox store.
#[derive(Clone)]
pub struct SqliteOutboxStore {
    db: Database,
}

impl SqliteOutboxStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The shared database handle, for lifecycle management.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl OutboxStore for SqliteOutboxStore {
    async fn insert(&self, item: &OutboxItem) -> Result<(), FleetbookError> {
        queries::outbox::insert(&self.db, item).await
    }

    async fn get(&self, id: &str) -> Result<Option<OutboxItem>, FleetbookError> {
        queries::outbox::get(&self.db, id).await
    }

    async fn list_all(&self) -> Result<Vec<OutboxItem>, FleetbookError> {
        queries::outbox::list_all(&self.db).await
    }

    async fn record_attempt(
        &self,
        id: &str,
        attempts: u32,
        at: DateTime<Utc>,
    ) -> Result<(), FleetbookError> {
        queries::outbox::record_attempt(&self.db, id, attempts, at).await
    }

    async fn record_error(&self, id: &str, error: &str) -> Result<(), FleetbookError> {
        queries::outbox::record_error(&self.db, id, error).await
    }

    async fn remove(&self, id: &str) -> Result<(), FleetbookError> {
        queries::outbox::remove(&self.db, id).await
    }

    async fn clear(&self) -> Result<(), FleetbookError> {
        queries::outbox::clear(&self.db).await
    }

    async fn count(&self) -> Result<u64, FleetbookError> {
        queries::outbox::count(&self.db).await
    }
}

/// SQLite-backed single-slot intent store.
#[derive(Clone)]
pub struct SqliteIntentStore {
    db: Database,
}

impl SqliteIntentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IntentStore for SqliteIntentStore {
    async fn put(&self, intent: &BookingIntent) -> Result<(), FleetbookError> {
        queries::intent::put(&self.db, intent).await
    }

    async fn get(&self) -> Result<Option<BookingIntent>, FleetbookError> {
        queries::intent::get(&self.db).await
    }

    async fn delete(&self) -> Result<(), FleetbookError> {
        queries::intent::delete(&self.db).await
    }
}
