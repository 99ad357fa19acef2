// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Car lookup client.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use fleetbook_core::{Car, FleetbookError};
use fleetbook_http::RequestExecutor;

/// Thin client for the car lookup endpoint.
#[derive(Debug, Clone)]
pub struct CarClient {
    executor: RequestExecutor,
    base_url: String,
}

impl CarClient {
    pub fn new(executor: RequestExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    /// Fetches a car by id. A 404 maps to [`FleetbookError::CarNotFound`].
    pub async fn get_car(
        &self,
        car_id: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<Car, FleetbookError> {
        let url = format!(
            "{}/api/cars/{car_id}",
            self.base_url.trim_end_matches('/')
        );
        let mut opts = self.executor.options(Method::GET);
        if let Some(cancel) = cancel {
            opts = opts.with_cancel(cancel);
        }

        let response = self.executor.execute(&url, opts).await.map_err(|err| {
            match err {
                FleetbookError::Http { status: 404, .. } => FleetbookError::CarNotFound {
                    car_id: car_id.to_string(),
                },
                other => other,
            }
        })?;

        let body = response.body.ok_or_else(|| {
            FleetbookError::Internal(format!("car lookup returned no body for {car_id}"))
        })?;
        serde_json::from_value(body)
            .map_err(|e| FleetbookError::Internal(format!("malformed car payload: {e}")))
    }
}
