// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fleetbook drain` command implementation.
//!
//! Runs one replay pass over the persistent outbox.

use std::sync::Arc;

use fleetbook_config::model::FleetbookConfig;
use fleetbook_core::FleetbookError;
use fleetbook_http::RequestExecutor;
use fleetbook_outbox::{OutboxProcessor, ProcessReport};
use fleetbook_storage::stores::open_stores;

/// Run the `fleetbook drain` command.
pub async fn run_drain(config: &FleetbookConfig, json: bool) -> Result<(), FleetbookError> {
    let (outbox, _intents) = open_stores(&config.storage).await?;
    let db = outbox.database().clone();

    let executor = RequestExecutor::new(config.http.clone())?;
    let processor = OutboxProcessor::new(
        Arc::new(outbox),
        executor,
        config.api.base_url.clone(),
        config.outbox.max_attempts,
    );

    let report = processor.process_all().await?;
    let remaining = processor.pending().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "processed": report.processed,
                "succeeded": report.succeeded,
                "failed": report.failed,
                "remaining": remaining,
            }))
            .unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{}", render_report(&report, remaining));
    }

    db.close().await?;
    Ok(())
}

fn render_report(report: &ProcessReport, remaining: u64) -> String {
    if report.processed == 0 {
        format!("outbox drain: nothing to do ({remaining} item(s) retained)")
    } else {
        format!(
            "outbox drain: {} processed, {} delivered, {} failed, {} remaining",
            report.processed, report.succeeded, report.failed, remaining
        )
    }
}
