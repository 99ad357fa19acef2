// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot booking intent operations.
//!
//! The table holds at most one row (slot 0); writing a new intent
//! overwrites the previous one.

use chrono::{DateTime, Utc};
use rusqlite::params;

use fleetbook_core::{BookingIntent, FleetbookError};

use crate::database::{map_tr_err, Database};

/// Write the intent, replacing any existing one.
pub async fn put(db: &Database, intent: &BookingIntent) -> Result<(), FleetbookError> {
    let intent = intent.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO booking_intent (slot, kind, car_id, created_at)
                 VALUES (0, ?1, ?2, ?3)
                 ON CONFLICT(slot) DO UPDATE SET
                     kind = excluded.kind,
                     car_id = excluded.car_id,
                     created_at = excluded.created_at",
                params![
                    intent.kind.to_string(),
                    intent.car_id,
                    intent.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read the intent, if one is stored. Expiry is the caller's concern.
pub async fn get(db: &Database) -> Result<Option<BookingIntent>, FleetbookError> {
    db.connection()
        .call(|conn| {
            let result = conn.query_row(
                "SELECT kind, car_id, created_at FROM booking_intent WHERE slot = 0",
                [],
                |row| {
                    let kind_str: String = row.get(0)?;
                    let created_at: String = row.get(2)?;
                    Ok(BookingIntent {
                        kind: kind_str.parse().map_err(|e| conv_err(0, e))?,
                        car_id: row.get(1)?,
                        created_at: parse_ts(2, &created_at)?,
                    })
                },
            );
            match result {
                Ok(intent) => Ok(Some(intent)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the stored intent, if any.
pub async fn delete(db: &Database) -> Result<(), FleetbookError> {
    db.connection()
        .call(|conn| {
            conn.execute("DELETE FROM booking_intent WHERE slot = 0", [])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
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
