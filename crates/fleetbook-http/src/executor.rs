// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrying request executor with timeout and failure classification.
//!
//! A request is idempotent-safe to retry only if its method is read-only
//! (GET/HEAD) or the caller supplied an idempotency key. Non-idempotent
//! writes without a key execute exactly once regardless of failure class.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use fleetbook_config::model::HttpConfig;
use fleetbook_core::FleetbookError;

/// Header carrying the client-generated deduplication token.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Upper bound of the random jitter added to each backoff delay.
const JITTER_MS: u64 = 100;

/// Callback invoked before each retry with the 1-based number of the
/// forthcoming attempt and the error that triggered it.
pub type RetryCallback = Arc<dyn Fn(u32, &FleetbookError) + Send + Sync>;

/// Per-call options for [`RequestExecutor::execute`].
///
/// Build via [`RequestExecutor::options`] to pick up configured defaults,
/// then override what the call needs.
#[derive(Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Retry budget for idempotent-safe requests.
    pub retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Generated once per logical write attempt and reused across retries.
    pub idempotency_key: Option<String>,
    pub on_retry: Option<RetryCallback>,
    /// Cancels the in-flight request when the owning component is torn down.
    pub cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("retries", &self.retries)
            .field("base_delay", &self.base_delay)
            .field("timeout", &self.timeout)
            .field("idempotency_key", &self.idempotency_key)
            .finish_non_exhaustive()
    }
}

impl RequestOptions {
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_on_retry(mut self, on_retry: RetryCallback) -> Self {
        self.on_retry = Some(on_retry);
        self
    }
}

/// A successful (2xx) response with its JSON body, if any.
#[derive(Debug, Clone)]
pub struct ExecutedResponse {
    pub status: u16,
    /// Parsed JSON body; `None` for non-JSON content types or empty bodies.
    pub body: Option<serde_json::Value>,
}

/// HTTP executor shared by every remote call the pipeline makes.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    defaults: HttpConfig,
}

impl RequestExecutor {
    /// Create a new executor. Timeouts are applied per attempt, not on the
    /// client, so each call can override them.
    pub fn new(defaults: HttpConfig) -> Result<Self, FleetbookError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            FleetbookError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        Ok(Self { client, defaults })
    }

    /// Options seeded with the configured defaults.
    pub fn options(&self, method: Method) -> RequestOptions {
        RequestOptions {
            method,
            headers: Vec::new(),
            body: None,
            retries: self.defaults.retries,
            base_delay: Duration::from_millis(self.defaults.base_delay_ms),
            timeout: Duration::from_millis(self.defaults.timeout_ms),
            idempotency_key: None,
            on_retry: None,
            cancel: None,
        }
    }

    /// Execute the request, retrying transient failures when the request is
    /// idempotent-safe and budget remains.
    ///
    /// After exhaustion the last classified error is returned verbatim, with
    /// status and parsed body attached where available.
    pub async fn execute(
        &self,
        url: &str,
        opts: RequestOptions,
    ) -> Result<ExecutedResponse, FleetbookError> {
        let idempotent_safe = opts.method == Method::GET
            || opts.method == Method::HEAD
            || opts.idempotency_key.is_some();

        let mut attempt: u32 = 0;
        loop {
            match self.attempt_once(url, &opts).await {
                Ok(response) => {
                    debug!(status = response.status, attempt, url, "request succeeded");
                    return Ok(response);
                }
                Err(err) => {
                    let budget_left = attempt < opts.retries;
                    if !idempotent_safe || !budget_left || !err.is_retryable() {
                        return Err(err);
                    }

                    attempt += 1;
                    if let Some(on_retry) = &opts.on_retry {
                        on_retry(attempt, &err);
                    }
                    let delay = backoff_delay(attempt, opts.base_delay);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        url,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Issue one attempt bounded by the timeout and cancellation signal.
    async fn attempt_once(
        &self,
        url: &str,
        opts: &RequestOptions,
    ) -> Result<ExecutedResponse, FleetbookError> {
        let mut request = self.client.request(opts.method.clone(), url);
        for (name, value) in &opts.headers {
            request = request.header(name, value);
        }
        if let Some(key) = &opts.idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        if let Some(body) = &opts.body {
            request = request.json(body);
        }

        // The timeout and cancellation signal bound the whole exchange,
        // body included. A server that answers promptly but stalls mid-body
        // must not hold the attempt open past the budget.
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = parse_json_body(response).await;
            Ok::<_, reqwest::Error>((status, body))
        };
        let timed = tokio::time::timeout(opts.timeout, exchange);
        let outcome = match &opts.cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => return Err(FleetbookError::Cancelled),
                outcome = timed => outcome,
            },
            None => timed.await,
        };

        let (status, body) = match outcome {
            Err(_) => {
                return Err(FleetbookError::Timeout {
                    duration: opts.timeout,
                })
            }
            Ok(Err(e)) => {
                return Err(FleetbookError::Network {
                    message: format!("request failed: {e}"),
                    source: Some(Box::new(e)),
                })
            }
            Ok(Ok(pair)) => pair,
        };

        if status.is_success() {
            return Ok(ExecutedResponse {
                status: status.as_u16(),
                body,
            });
        }

        // A structured `retryable: false` from the server overrides status
        // classification; anything else falls back to the status code.
        let server_flag = body
            .as_ref()
            .and_then(|b| b.get("retryable"))
            .and_then(|v| v.as_bool());
        let retryable = match server_flag {
            Some(false) => false,
            _ => is_transient_status(status.as_u16()),
        };

        let message = body
            .as_ref()
            .and_then(|b| b.get("error").or_else(|| b.get("message")))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("server returned {status}"));

        Err(FleetbookError::Http {
            status: status.as_u16(),
            message,
            retryable,
            body,
        })
    }
}

/// Parse the body as JSON when the content type says so; `None` otherwise.
async fn parse_json_body(response: reqwest::Response) -> Option<serde_json::Value> {
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));
    if !is_json {
        return None;
    }
    response.json().await.ok()
}

/// Status codes worth retrying when the request is idempotent-safe.
fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

/// Delay before retry `attempt` (1-based): `2^attempt * base + jitter(0..100ms)`.
fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
    exponential + Duration::from_millis(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> HttpConfig {
        HttpConfig {
            retries: 4,
            base_delay_ms: 1,
            timeout_ms: 2_000,
        }
    }

    fn executor() -> RequestExecutor {
        RequestExecutor::new(fast_config()).unwrap()
    }

    #[test]
    fn backoff_delay_is_within_exponential_bounds() {
        let base = Duration::from_millis(100);
        for attempt in 1..=4u32 {
            let expected = Duration::from_millis(100 * 2u64.pow(attempt));
            for _ in 0..20 {
                let delay = backoff_delay(attempt, base);
                assert!(delay >= expected, "attempt {attempt}: {delay:?}");
                assert!(
                    delay < expected + Duration::from_millis(JITTER_MS),
                    "attempt {attempt}: {delay:?}"
                );
            }
        }
    }

    #[test]
    fn transient_status_classification() {
        assert!(is_transient_status(500));
        assert!(is_transient_status(503));
        assert!(is_transient_status(408));
        assert!(is_transient_status(429));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(404));
        assert!(!is_transient_status(422));
    }

    #[tokio::test]
    async fn get_5xx_is_retried_up_to_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec.options(Method::GET).with_retries(2);
        let err = exec
            .execute(&format!("{}/api/cars/1", server.uri()), opts)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetbookError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn post_without_key_fails_after_exactly_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec
            .options(Method::POST)
            .with_body(serde_json::json!({"msg": "hi"}));
        let err = exec
            .execute(&format!("{}/api/contact", server.uri()), opts)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetbookError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn post_with_key_retries_and_sends_the_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bookings/reserve"))
            .and(header(IDEMPOTENCY_HEADER, "booking_abc123"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/bookings/reserve"))
            .and(header(IDEMPOTENCY_HEADER, "booking_abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec
            .options(Method::POST)
            .with_body(serde_json::json!({"car_id": "car-1"}))
            .with_idempotency_key("booking_abc123");
        let response = exec
            .execute(&format!("{}/api/bookings/reserve", server.uri()), opts)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.unwrap()["success"], true);
    }

    #[tokio::test]
    async fn other_4xx_fails_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec.options(Method::GET);
        let err = exec
            .execute(&format!("{}/api/cars/missing", server.uri()), opts)
            .await
            .unwrap_err();
        match err {
            FleetbookError::Http {
                status, retryable, ..
            } => {
                assert_eq!(status, 404);
                assert!(!retryable);
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_retryable_false_stops_retries_even_on_5xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({"error": "car archived", "retryable": false}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec.options(Method::GET);
        let err = exec
            .execute(&format!("{}/api/cars/1", server.uri()), opts)
            .await
            .unwrap_err();
        match err {
            FleetbookError::Http {
                retryable, message, ..
            } => {
                assert!(!retryable);
                assert_eq!(message, "car archived");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_with_non_json_body_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec.options(Method::GET);
        let response = exec
            .execute(&format!("{}/plain", server.uri()), opts)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn timeout_is_classified_as_retryable_and_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .expect(2)
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec
            .options(Method::GET)
            .with_retries(1)
            .with_timeout(Duration::from_millis(30));
        let err = exec
            .execute(&format!("{}/slow", server.uri()), opts)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetbookError::Timeout { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn stalled_body_is_bounded_by_the_timeout() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // wiremock delays the whole response, so a raw socket is needed to
        // answer with headers promptly and then stall the body.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\n\
                              content-type: application/json\r\n\
                              content-length: 64\r\n\r\n{",
                        )
                        .await;
                    // Never deliver the rest of the promised body.
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });

        let exec = executor();
        let opts = exec
            .options(Method::GET)
            .with_retries(0)
            .with_timeout(Duration::from_millis(100));
        let start = std::time::Instant::now();
        let err = exec
            .execute(&format!("http://{addr}/slow-body"), opts)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetbookError::Timeout { .. }));
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "stalled body held the attempt open: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn on_retry_fires_with_one_based_attempt_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicU32::new(0));
        let seen_max = Arc::new(AtomicU32::new(0));
        let calls_cb = calls.clone();
        let seen_cb = seen_max.clone();

        let exec = executor();
        let opts = exec
            .options(Method::GET)
            .with_retries(3)
            .with_on_retry(Arc::new(move |attempt, err| {
                calls_cb.fetch_add(1, Ordering::SeqCst);
                seen_cb.fetch_max(attempt, Ordering::SeqCst);
                assert!(err.is_retryable());
            }));
        let _ = exec
            .execute(&format!("{}/flaky", server.uri()), opts)
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(seen_max.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let exec = executor();
        let opts = exec.options(Method::GET).with_cancel(cancel.clone());

        let url = format!("{}/slow", server.uri());
        let handle = tokio::spawn(async move { exec.execute(&url, opts).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, FleetbookError::Cancelled));
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error_with_body_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cars/1"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"error": "maintenance window"})),
            )
            .mount(&server)
            .await;

        let exec = executor();
        let opts = exec.options(Method::GET).with_retries(1);
        let err = exec
            .execute(&format!("{}/api/cars/1", server.uri()), opts)
            .await
            .unwrap_err();
        match err {
            FleetbookError::Http {
                status,
                message,
                body,
                ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance window");
                assert_eq!(body.unwrap()["error"], "maintenance window");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
