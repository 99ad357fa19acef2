// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Fleetbook booking pipeline.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and the SQLite implementations of
//! the outbox and booking-intent storage ports.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod stores;

pub use database::Database;
pub use models::*;
pub use stores::{open_stores, SqliteIntentStore, SqliteOutboxStore};
