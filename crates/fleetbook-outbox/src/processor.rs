// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbox capture and replay.
//!
//! Replay is crash-safe by construction: the attempt counter is persisted
//! before any network I/O, so a crash mid-send can never under-count and a
//! poison item can never replay past its ceiling.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use fleetbook_core::{
    generate_idempotency_key, FleetbookError, OutboxItem, OutboxKind, OutboxStore,
};
use fleetbook_http::RequestExecutor;

use crate::policy::is_queueable;

/// Idempotency key prefix for queued writes.
const OUTBOX_KEY_PREFIX: &str = "outbox";

/// Result of replaying a single item.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub id: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Summary of one replay pass over the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub processed: u32,
    pub succeeded: u32,
    pub failed: u32,
}

/// Captures eligible failed writes and replays them against the backend.
pub struct OutboxProcessor {
    store: Arc<dyn OutboxStore>,
    executor: RequestExecutor,
    base_url: String,
    max_attempts: u32,
}

impl OutboxProcessor {
    pub fn new(
        store: Arc<dyn OutboxStore>,
        executor: RequestExecutor,
        base_url: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            executor,
            base_url: base_url.into(),
            max_attempts,
        }
    }

    /// Queues a failed write for later replay.
    ///
    /// The idempotency key is generated here, at capture time, so every
    /// future replay of this item deduplicates against the original
    /// in-flight request as well as against other replays.
    pub async fn enqueue(
        &self,
        endpoint: &str,
        method: Method,
        headers: HashMap<String, String>,
        body: Option<serde_json::Value>,
    ) -> Result<OutboxItem, FleetbookError> {
        if !is_queueable(endpoint) {
            return Err(FleetbookError::Internal(format!(
                "endpoint is not queueable: {endpoint}"
            )));
        }

        let item = OutboxItem {
            id: Uuid::new_v4().to_string(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            headers,
            body,
            idempotency_key: generate_idempotency_key(OUTBOX_KEY_PREFIX),
            kind: OutboxKind::Queueable,
            created_at: Utc::now(),
            attempts: 0,
            last_attempt_at: None,
            last_error: None,
        };

        self.store.insert(&item).await?;
        info!(id = %item.id, endpoint, "queued write for later replay");
        Ok(item)
    }

    /// Number of items currently queued.
    pub async fn pending(&self) -> Result<u64, FleetbookError> {
        self.store.count().await
    }

    /// Items currently queued, oldest first.
    pub async fn items(&self) -> Result<Vec<OutboxItem>, FleetbookError> {
        self.store.list_all().await
    }

    /// Replays one item.
    ///
    /// Items at the attempt ceiling are refused without touching the
    /// network; they stay in the store for inspection. On success the item
    /// is removed; on failure the error is recorded and the item kept.
    pub async fn process_one(&self, id: &str) -> Result<ItemOutcome, FleetbookError> {
        let Some(item) = self.store.get(id).await? else {
            return Err(FleetbookError::Internal(format!(
                "unknown outbox item: {id}"
            )));
        };

        if item.attempts >= self.max_attempts {
            debug!(id, attempts = item.attempts, "item at attempt ceiling, skipping");
            return Ok(ItemOutcome {
                id: item.id,
                success: false,
                error: Some(format!(
                    "attempt ceiling reached ({}/{})",
                    item.attempts, self.max_attempts
                )),
            });
        }

        // Persist the bump before sending. If we crash mid-request the
        // attempt still counts.
        let attempts = item.attempts + 1;
        self.store.record_attempt(id, attempts, Utc::now()).await?;

        match self.send(&item).await {
            Ok(()) => {
                self.store.remove(id).await?;
                info!(id, attempts, endpoint = %item.endpoint, "outbox item delivered");
                Ok(ItemOutcome {
                    id: item.id,
                    success: true,
                    error: None,
                })
            }
            Err(err) => {
                let message = err.to_string();
                self.store.record_error(id, &message).await?;
                warn!(id, attempts, error = %message, "outbox replay failed");
                Ok(ItemOutcome {
                    id: item.id,
                    success: false,
                    error: Some(message),
                })
            }
        }
    }

    /// Replays every queued item below the attempt ceiling, oldest first.
    ///
    /// Operates on a snapshot of the queue taken at entry; items enqueued
    /// while a pass runs wait for the next pass.
    pub async fn process_all(&self) -> Result<ProcessReport, FleetbookError> {
        let snapshot = self.store.list_all().await?;
        let mut report = ProcessReport::default();

        for item in snapshot {
            if item.attempts >= self.max_attempts {
                continue;
            }
            let outcome = self.process_one(&item.id).await?;
            report.processed += 1;
            if outcome.success {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.processed > 0 {
            info!(
                processed = report.processed,
                succeeded = report.succeeded,
                failed = report.failed,
                "outbox pass complete"
            );
        }
        Ok(report)
    }

    /// One delivery attempt. The replay pass owns retry accounting, so the
    /// executor gets a zero retry budget here.
    async fn send(&self, item: &OutboxItem) -> Result<(), FleetbookError> {
        let method: Method = item
            .method
            .parse()
            .map_err(|_| FleetbookError::Internal(format!("invalid method: {}", item.method)))?;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), item.endpoint);
        let mut opts = self
            .executor
            .options(method)
            .with_idempotency_key(item.idempotency_key.clone())
            .with_retries(0);
        for (name, value) in &item.headers {
            opts = opts.with_header(name.clone(), value.clone());
        }
        if let Some(body) = &item.body {
            opts = opts.with_body(body.clone());
        }

        self.executor.execute(&url, opts).await?;
        Ok(())
    }
}
