// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fleetbook booking pipeline.

use thiserror::Error;

/// The primary error type used across all Fleetbook crates.
#[derive(Debug, Error)]
pub enum FleetbookError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An HTTP response outside the 2xx range, classified for retry eligibility.
    ///
    /// `body` carries the parsed JSON error payload when the server sent one,
    /// so callers receive the final failure verbatim after retry exhaustion.
    #[error("http error ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        retryable: bool,
        body: Option<serde_json::Value>,
    },

    /// Network-level failure (connection refused, DNS, aborted transfer).
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The in-flight request was cancelled by its owner's teardown.
    #[error("request cancelled")]
    Cancelled,

    /// The requested car does not exist or is no longer visible.
    #[error("car not found: {car_id}")]
    CarNotFound { car_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetbookError {
    /// Whether a fresh attempt of the same request could plausibly succeed.
    ///
    /// This is the failure classification only; the executor additionally
    /// requires the request itself to be idempotent-safe before retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            FleetbookError::Http { retryable, .. } => *retryable,
            FleetbookError::Network { .. } | FleetbookError::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_network_are_retryable() {
        let timeout = FleetbookError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        assert!(timeout.is_retryable());

        let network = FleetbookError::Network {
            message: "connection refused".into(),
            source: None,
        };
        assert!(network.is_retryable());
    }

    #[test]
    fn http_retryability_follows_classification() {
        let transient = FleetbookError::Http {
            status: 503,
            message: "service unavailable".into(),
            retryable: true,
            body: None,
        };
        assert!(transient.is_retryable());

        let permanent = FleetbookError::Http {
            status: 422,
            message: "validation failed".into(),
            retryable: false,
            body: None,
        };
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn cancellation_is_never_retryable() {
        assert!(!FleetbookError::Cancelled.is_retryable());
        assert!(
            !FleetbookError::CarNotFound {
                car_id: "car-1".into()
            }
            .is_retryable()
        );
    }
}
