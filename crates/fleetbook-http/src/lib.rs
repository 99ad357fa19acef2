// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilient HTTP layer for the Fleetbook booking pipeline.
//!
//! Provides [`RequestExecutor`], which wraps a single HTTP call with a
//! per-attempt timeout, classification of retryable failures, exponential
//! backoff with jitter, and idempotency-header injection.

pub mod executor;

pub use executor::{
    ExecutedResponse, RequestExecutor, RequestOptions, RetryCallback, IDEMPOTENCY_HEADER,
};
