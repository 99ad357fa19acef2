// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::debug;

use fleetbook_core::FleetbookError;

use crate::migrations;

/// Handle to the SQLite database backing the outbox and intent stores.
///
/// Cloning is cheap; all clones share the single writer thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` with WAL enabled.
    pub async fn open(path: &str) -> Result<Self, FleetbookError> {
        Self::open_with(path, true).await
    }

    /// Open the database, optionally skipping WAL (for constrained filesystems).
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, FleetbookError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| FleetbookError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path).await.map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5_000)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Round-trip `SELECT 1` through the writer thread.
    pub async fn health_check(&self) -> Result<(), FleetbookError> {
        let one: i64 = self
            .conn
            .call(|conn| {
                let n = conn.query_row("SELECT 1", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        if one != 1 {
            return Err(FleetbookError::Internal(
                "database health check returned unexpected value".to_string(),
            ));
        }
        Ok(())
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), FleetbookError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed after WAL checkpoint");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> FleetbookError {
    FleetbookError::Storage {
        source: Box::new(e),
    }
}
