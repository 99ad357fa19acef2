// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fleetbook status` command implementation.
//!
//! Probes the backend health endpoint once, then summarizes connectivity,
//! queued outbox items, and any pending booking intent.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use fleetbook_booking::BookingIntents;
use fleetbook_config::model::FleetbookConfig;
use fleetbook_core::{FleetbookError, OutboxStore};
use fleetbook_netwatch::NetworkMonitor;
use fleetbook_storage::stores::open_stores;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub reachable: bool,
    pub base_url: String,
    pub outbox_pending: u64,
    pub outbox_at_ceiling: u64,
    pub intent_car_id: Option<String>,
    pub intent_age_minutes: Option<i64>,
}

/// Format an age in minutes into a short human-readable string.
fn format_age(minutes: i64) -> String {
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Run the `fleetbook status` command.
pub async fn run_status(
    config: &FleetbookConfig,
    json: bool,
    plain: bool,
) -> Result<(), FleetbookError> {
    let monitor = NetworkMonitor::new(&config.api, &config.network)?;
    monitor.check_now().await;
    let network = monitor.status();

    let (outbox, intent_store) = open_stores(&config.storage).await?;
    outbox.database().health_check().await?;

    let items = outbox.list_all().await?;
    let pending = items.len() as u64;
    let at_ceiling = items
        .iter()
        .filter(|i| i.attempts >= config.outbox.max_attempts)
        .count() as u64;

    let intents = BookingIntents::new(Arc::new(intent_store), config.intent.expiry_secs);
    let intent = intents.get().await?;
    let db = outbox.database().clone();

    let response = StatusResponse {
        reachable: network.effective_online,
        base_url: config.api.base_url.clone(),
        outbox_pending: pending,
        outbox_at_ceiling: at_ceiling,
        intent_car_id: intent.as_ref().map(|i| i.car_id.clone()),
        intent_age_minutes: intent.as_ref().map(|i| i.age(Utc::now()).num_minutes()),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }

    db.close().await?;
    Ok(())
}

fn print_status(response: &StatusResponse, use_color: bool) {
    println!();
    println!("  fleetbook status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        if response.reachable {
            println!("    Network:  {} reachable ({})", "✓".green(), response.base_url);
        } else {
            println!("    Network:  {} unreachable ({})", "✗".red(), response.base_url);
        }
    } else if response.reachable {
        println!("    Network:  [OK] reachable ({})", response.base_url);
    } else {
        println!("    Network:  [FAIL] unreachable ({})", response.base_url);
    }

    if response.outbox_at_ceiling > 0 {
        println!(
            "    Outbox:   {} pending ({} at attempt ceiling)",
            response.outbox_pending, response.outbox_at_ceiling
        );
    } else {
        println!("    Outbox:   {} pending", response.outbox_pending);
    }

    match (&response.intent_car_id, response.intent_age_minutes) {
        (Some(car_id), Some(age)) => {
            println!("    Intent:   book {} (saved {} ago)", car_id, format_age(age));
        }
        _ => println!("    Intent:   none"),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_age_minutes() {
        assert_eq!(format_age(12), "12m");
    }

    #[test]
    fn format_age_hours() {
        assert_eq!(format_age(95), "1h 35m");
    }

    #[test]
    fn status_response_serializes() {
        let response = StatusResponse {
            reachable: true,
            base_url: "http://localhost:3000".to_string(),
            outbox_pending: 2,
            outbox_at_ceiling: 1,
            intent_car_id: Some("car-1".to_string()),
            intent_age_minutes: Some(5),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"reachable\":true"));
        assert!(json.contains("\"outbox_pending\":2"));
        assert!(json.contains("\"intent_car_id\":\"car-1\""));
    }

    #[test]
    fn status_response_without_intent_serializes_nulls() {
        let response = StatusResponse {
            reachable: false,
            base_url: "http://localhost:3000".to_string(),
            outbox_pending: 0,
            outbox_at_ceiling: 0,
            intent_car_id: None,
            intent_age_minutes: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"reachable\":false"));
        assert!(json.contains("\"intent_car_id\":null"));
    }
}
