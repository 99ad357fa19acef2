// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Fleetbook workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Classification of a deferred request held in the outbox.
///
/// Only safe-to-defer traffic is ever persisted; payment and checkout
/// requests are rejected at enqueue time and have no variant here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutboxKind {
    Queueable,
}

/// A deferred write request persisted in the outbox.
///
/// An item leaves the store only when its request ultimately succeeds, or it
/// reaches the attempts ceiling and is retained for operator inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxItem {
    /// Generator-assigned unique id.
    pub id: String,
    /// Target endpoint path, e.g. `/api/contact`.
    pub endpoint: String,
    /// HTTP method as an uppercase string.
    pub method: String,
    /// Extra request headers to replay with the request.
    pub headers: std::collections::HashMap<String, String>,
    /// Optional JSON request body.
    pub body: Option<serde_json::Value>,
    /// Key generated once at enqueue and reused on every delivery attempt,
    /// so the server can deduplicate replays.
    pub idempotency_key: String,
    pub kind: OutboxKind,
    pub created_at: DateTime<Utc>,
    /// Delivery attempts made so far. Starts at 0.
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// What kind of interrupted action a [`BookingIntent`] records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    BookCar,
}

/// A persisted record of "user wants to book car X", written before an auth
/// redirect and consumed after sign-in. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingIntent {
    pub kind: IntentKind,
    pub car_id: String,
    pub created_at: DateTime<Utc>,
}

impl BookingIntent {
    /// Create a fresh book-car intent stamped with the current time.
    pub fn book_car(car_id: impl Into<String>) -> Self {
        Self {
            kind: IntentKind::BookCar,
            car_id: car_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Age of the intent relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// Best-effort connectivity signal maintained by the network monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStatus {
    /// Raw link-state signal as last reported by the host environment.
    pub online: bool,
    /// Debounced, heartbeat-confirmed signal. Flips false only after a
    /// threshold of consecutive probe failures; flips true immediately on
    /// any probe success or online event.
    pub effective_online: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// A heartbeat probe is currently in flight.
    pub is_checking: bool,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self {
            online: true,
            effective_online: true,
            last_checked_at: None,
            is_checking: false,
        }
    }
}

/// The authenticated user as exposed by the external auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl UserProfile {
    /// A profile is usable for booking resume only once the provider has
    /// finished populating it.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && self.email.is_some()
    }
}

/// A rentable car as returned by the car lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub daily_rate: Option<f64>,
    #[serde(default)]
    pub available: bool,
}

/// Input to the atomic reservation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub car_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
}

/// Result of the atomic reservation call.
///
/// The server evaluates and commits the transition under row-level mutual
/// exclusion; a structured failure (e.g. dates no longer available) comes
/// back as `success = false` with `error` set, not as a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationOutcome {
    pub success: bool,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Amount held now for partial-payment flows.
    #[serde(default)]
    pub hold_amount: Option<f64>,
    /// When the hold lapses if payment is not completed.
    #[serde(default)]
    pub hold_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&OutboxKind::Queueable).unwrap();
        assert_eq!(json, r#""queueable""#);
        let parsed: OutboxKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, OutboxKind::Queueable);
    }

    #[test]
    fn intent_kind_uses_screaming_snake_case() {
        assert_eq!(IntentKind::BookCar.to_string(), "BOOK_CAR");
        let parsed: IntentKind = serde_json::from_str(r#""BOOK_CAR""#).unwrap();
        assert_eq!(parsed, IntentKind::BookCar);
    }

    #[test]
    fn fresh_intent_has_near_zero_age() {
        let intent = BookingIntent::book_car("car-7");
        assert_eq!(intent.car_id, "car-7");
        assert!(intent.age(Utc::now()).num_seconds() < 5);
    }

    #[test]
    fn profile_completeness_requires_email() {
        let mut profile = UserProfile {
            id: "u-1".into(),
            email: None,
            full_name: Some("Ada".into()),
        };
        assert!(!profile.is_complete());
        profile.email = Some("ada@example.com".into());
        assert!(profile.is_complete());
    }

    #[test]
    fn reservation_outcome_tolerates_missing_optional_fields() {
        let outcome: ReservationOutcome =
            serde_json::from_str(r#"{"success":false,"error":"not available"}"#).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("not available"));
        assert!(outcome.booking_id.is_none());
        assert!(outcome.hold_until.is_none());
    }

    #[test]
    fn network_status_defaults_optimistic() {
        let status = NetworkStatus::default();
        assert!(status.online);
        assert!(status.effective_online);
        assert!(!status.is_checking);
    }
}
