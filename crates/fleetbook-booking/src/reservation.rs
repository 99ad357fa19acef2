// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic reservation call.
//!
//! The server evaluates availability and commits the booking in one
//! operation under row-level mutual exclusion. The client's job is only to
//! deduplicate: each logical attempt gets a fresh idempotency key, reused
//! across that attempt's transport retries and never across attempts, so a
//! user who deliberately retries after a failure is not silently collapsed
//! into the earlier try.

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fleetbook_core::{
    generate_idempotency_key, FleetbookError, ReservationOutcome, ReservationRequest,
};
use fleetbook_http::RequestExecutor;

/// Idempotency key prefix for reservation attempts.
const BOOKING_KEY_PREFIX: &str = "booking";

/// Client for the atomic reservation endpoint.
#[derive(Debug, Clone)]
pub struct ReservationClient {
    executor: RequestExecutor,
    base_url: String,
}

impl ReservationClient {
    pub fn new(executor: RequestExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    /// Submits one logical reservation attempt.
    ///
    /// Business-rule rejections (dates taken, car archived) come back as
    /// `Ok` with `success = false` and `error` set; transport and server
    /// failures come back as `Err`.
    pub async fn reserve(
        &self,
        request: &ReservationRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<ReservationOutcome, FleetbookError> {
        let key = generate_idempotency_key(BOOKING_KEY_PREFIX);
        let body = serde_json::to_value(request)
            .map_err(|e| FleetbookError::Internal(format!("unencodable reservation: {e}")))?;

        let url = format!(
            "{}/api/bookings/reserve",
            self.base_url.trim_end_matches('/')
        );
        let mut opts = self
            .executor
            .options(Method::POST)
            .with_idempotency_key(key)
            .with_body(body);
        if let Some(cancel) = cancel {
            opts = opts.with_cancel(cancel);
        }

        let response = self.executor.execute(&url, opts).await?;
        let body = response.body.ok_or_else(|| {
            FleetbookError::Internal("reservation endpoint returned no body".to_string())
        })?;
        let outcome: ReservationOutcome = serde_json::from_value(body)
            .map_err(|e| FleetbookError::Internal(format!("malformed reservation reply: {e}")))?;

        info!(
            car_id = %request.car_id,
            success = outcome.success,
            booking_id = outcome.booking_id.as_deref().unwrap_or("-"),
            "reservation attempt finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetbook_config::model::HttpConfig;
    use fleetbook_http::IDEMPOTENCY_HEADER;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ReservationClient {
        let executor = RequestExecutor::new(HttpConfig {
            retries: 0,
            base_delay_ms: 1,
            timeout_ms: 2_000,
        })
        .unwrap();
        ReservationClient::new(executor, server.uri())
    }

    fn request() -> ReservationRequest {
        ReservationRequest {
            car_id: "car-1".into(),
            start_date: "2026-09-01".into(),
            end_date: "2026-09-04".into(),
            extras: vec!["gps".into()],
        }
    }

    #[tokio::test]
    async fn successful_reservation_parses_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bookings/reserve"))
            .and(header_exists(IDEMPOTENCY_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "booking_id": "bk-42",
                "payment_id": "pay-7",
                "hold_amount": 120.0,
            })))
            .mount(&server)
            .await;

        let outcome = client(&server).reserve(&request(), None).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.booking_id.as_deref(), Some("bk-42"));
        assert_eq!(outcome.hold_amount, Some(120.0));
    }

    #[tokio::test]
    async fn business_rejection_is_ok_with_success_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bookings/reserve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "dates no longer available",
            })))
            .mount(&server)
            .await;

        let outcome = client(&server).reserve(&request(), None).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("dates no longer available"));
    }

    #[tokio::test]
    async fn each_logical_attempt_gets_a_fresh_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bookings/reserve"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        client.reserve(&request(), None).await.unwrap();
        client.reserve(&request(), None).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let keys: Vec<&str> = requests
            .iter()
            .map(|r| r.headers.get(IDEMPOTENCY_HEADER).unwrap().to_str().unwrap())
            .collect();
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert!(keys.iter().all(|k| k.starts_with("booking_")));
    }
}
