// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbox table operations for crash-safe deferred requests.

use chrono::{DateTime, Utc};
use rusqlite::params;

use fleetbook_core::{FleetbookError, OutboxItem};

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str = "id, endpoint, method, headers, body, idempotency_key, kind,
     created_at, attempts, last_attempt_at, last_error";

/// Persist a new outbox item. Fails if the id already exists.
pub async fn insert(db: &Database, item: &OutboxItem) -> Result<(), FleetbookError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            let headers = serde_json::to_string(&item.headers)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            let body = item
                .body
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            conn.execute(
                "INSERT INTO outbox (id, endpoint, method, headers, body, idempotency_key,
                                     kind, created_at, attempts, last_attempt_at, last_error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.id,
                    item.endpoint,
                    item.method,
                    headers,
                    body,
                    item.idempotency_key,
                    item.kind.to_string(),
                    item.created_at.to_rfc3339(),
                    item.attempts,
                    item.last_attempt_at.map(|t| t.to_rfc3339()),
                    item.last_error,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single item by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<OutboxItem>, FleetbookError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM outbox WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_item);
            match result {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All items in creation order.
pub async fn list_all(db: &Database) -> Result<Vec<OutboxItem>, FleetbookError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM outbox ORDER BY created_at ASC, rowid ASC"
            ))?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Persist an attempt bump and timestamp. Written before the network send.
pub async fn record_attempt(
    db: &Database,
    id: &str,
    attempts: u32,
    at: DateTime<Utc>,
) -> Result<(), FleetbookError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE outbox SET attempts = ?1, last_attempt_at = ?2 WHERE id = ?3",
                params![attempts, at.to_rfc3339(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Store the latest delivery error on an item, leaving it queued.
pub async fn record_error(db: &Database, id: &str, error: &str) -> Result<(), FleetbookError> {
    let id = id.to_string();
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE outbox SET last_error = ?1 WHERE id = ?2",
                params![error, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a single item.
pub async fn remove(db: &Database, id: &str) -> Result<(), FleetbookError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM outbox WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every item.
pub async fn clear(db: &Database) -> Result<(), FleetbookError> {
    db.connection()
        .call(|conn| {
            conn.execute("DELETE FROM outbox", [])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Number of queued items.
pub async fn count(db: &Database) -> Result<u64, FleetbookError> {
    db.connection()
        .call(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM outbox", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<OutboxItem> {
    let headers_json: String = row.get(3)?;
    let body_json: Option<String> = row.get(4)?;
    let kind_str: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let last_attempt_at: Option<String> = row.get(9)?;

    Ok(OutboxItem {
        id: row.get(0)?,
        endpoint: row.get(1)?,
        method: row.get(2)?,
        headers: serde_json::from_str(&headers_json).map_err(|e| conv_err(3, e))?,
        body: body_json
            .map(|s| serde_json::from_str(&s).map_err(|e| conv_err(4, e)))
            .transpose()?,
        idempotency_key: row.get(5)?,
        kind: kind_str.parse().map_err(|e| conv_err(6, e))?,
        created_at: parse_ts(7, &created_at)?,
        attempts: row.get(8)?,
        last_attempt_at: last_attempt_at.map(|s| parse_ts(9, &s)).transpose()?,
        last_error: row.get(10)?,
    })
}

fn conv_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conv_err(idx, e))
}
