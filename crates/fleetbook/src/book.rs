// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fleetbook book` command implementation.
//!
//! Looks the car up, then submits one logical reservation attempt. Running
//! the command again after a failure is a new logical attempt with a fresh
//! idempotency key; the server will not collapse it into the earlier try.

use fleetbook_booking::{CarClient, ReservationClient};
use fleetbook_config::model::FleetbookConfig;
use fleetbook_core::{FleetbookError, ReservationOutcome, ReservationRequest};
use fleetbook_http::RequestExecutor;

/// Run the `fleetbook book` command.
pub async fn run_book(
    config: &FleetbookConfig,
    car_id: &str,
    from: &str,
    to: &str,
    extras: Vec<String>,
) -> Result<(), FleetbookError> {
    let executor = RequestExecutor::new(config.http.clone())?;
    let cars = CarClient::new(executor.clone(), config.api.base_url.clone());
    let reservations = ReservationClient::new(executor, config.api.base_url.clone());

    let car = cars.get_car(car_id, None).await?;
    println!("booking {} ({} to {})", car.name, from, to);
    if !car.available {
        println!("note: car is currently listed as unavailable, trying anyway");
    }

    let request = ReservationRequest {
        car_id: car_id.to_string(),
        start_date: from.to_string(),
        end_date: to.to_string(),
        extras,
    };
    let outcome = reservations.reserve(&request, None).await?;

    println!("{}", render_outcome(&outcome));
    if outcome.success {
        Ok(())
    } else {
        Err(FleetbookError::Internal(format!(
            "reservation declined: {}",
            outcome.error.as_deref().unwrap_or("no reason given")
        )))
    }
}

fn render_outcome(outcome: &ReservationOutcome) -> String {
    if outcome.success {
        let mut line = format!(
            "reserved: booking {}",
            outcome.booking_id.as_deref().unwrap_or("(id pending)")
        );
        if let Some(amount) = outcome.hold_amount {
            line.push_str(&format!(", {amount:.2} held"));
            if let Some(until) = outcome.hold_until {
                line.push_str(&format!(" until {}", until.to_rfc3339()));
            }
        }
        line
    } else {
        format!(
            "not reserved: {}",
            outcome.error.as_deref().unwrap_or("no reason given")
        )
    }
}
