// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heartbeat-driven network status monitor.
//!
//! The monitor distinguishes the OS-reported link state (`online`) from
//! backend reachability (`effective_online`). Probes are HEAD requests to a
//! lightweight health endpoint with a cache-busting query parameter, so
//! intermediate caches can never answer on the backend's behalf.
//!
//! `effective_online` only flips to `false` after `failure_threshold`
//! consecutive probe misses; a single miss on a flaky connection is absorbed.
//! Any successful probe resets the failure counter and restores
//! `effective_online` immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fleetbook_config::model::{ApiConfig, NetworkConfig};
use fleetbook_core::{FleetbookError, NetworkStatus};

/// Monitors backend reachability and publishes [`NetworkStatus`] updates
/// over a watch channel.
pub struct NetworkMonitor {
    client: reqwest::Client,
    probe_url: String,
    interval: Duration,
    probe_timeout: Duration,
    failure_threshold: u32,
    tx: watch::Sender<NetworkStatus>,
    failures: AtomicU32,
    /// Reentrancy guard: a slow probe must not overlap the next tick.
    checking: AtomicBool,
}

impl NetworkMonitor {
    /// Creates a monitor probing `{base_url}{health_path}`.
    ///
    /// The initial status is optimistic (online) until the first probe
    /// says otherwise.
    pub fn new(api: &ApiConfig, network: &NetworkConfig) -> Result<Self, FleetbookError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FleetbookError::Network {
                message: "failed to build heartbeat HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        let probe_url = format!(
            "{}{}",
            api.base_url.trim_end_matches('/'),
            api.health_path
        );

        let (tx, _) = watch::channel(NetworkStatus::default());

        Ok(Self {
            client,
            probe_url,
            interval: Duration::from_secs(network.heartbeat_interval_secs),
            probe_timeout: Duration::from_millis(network.heartbeat_timeout_ms),
            failure_threshold: network.failure_threshold,
            tx,
            failures: AtomicU32::new(0),
            checking: AtomicBool::new(false),
        })
    }

    /// Subscribes to status updates.
    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }

    /// Current status snapshot.
    pub fn status(&self) -> NetworkStatus {
        self.tx.borrow().clone()
    }

    /// Reports that the platform lost its network link.
    ///
    /// Takes effect immediately: no probe can succeed without a link, so
    /// there is nothing to debounce.
    pub fn notify_offline(&self) {
        info!("network link lost, marking offline");
        self.tx.send_modify(|s| {
            s.online = false;
            s.effective_online = false;
        });
    }

    /// Reports that the platform regained its network link.
    ///
    /// The platform signal is trusted immediately: `effective_online` flips
    /// true here, the failure counter resets, and a confirming heartbeat
    /// runs. A fresh miss streak still has to reach the threshold before
    /// the status is demoted again.
    pub async fn notify_online(&self) {
        info!("network link restored, confirming with probe");
        self.failures.store(0, Ordering::SeqCst);
        self.tx.send_modify(|s| {
            s.online = true;
            s.effective_online = true;
        });
        self.check_now().await;
    }

    /// Runs a single heartbeat probe and updates the published status.
    ///
    /// If a probe is already in flight this is a no-op.
    pub async fn check_now(&self) {
        if self.checking.swap(true, Ordering::SeqCst) {
            debug!("heartbeat already in flight, skipping");
            return;
        }
        self.tx.send_modify(|s| s.is_checking = true);

        let result = self.probe().await;
        let now = Utc::now();

        match result {
            Ok(()) => {
                let had_failures = self.failures.swap(0, Ordering::SeqCst) > 0;
                self.tx.send_modify(|s| {
                    if !s.effective_online || had_failures {
                        info!("backend reachable again");
                    }
                    s.online = true;
                    s.effective_online = true;
                    s.last_checked_at = Some(now);
                    s.is_checking = false;
                });
            }
            Err(message) => {
                let misses = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                let exceeded = misses >= self.failure_threshold;
                warn!(
                    misses,
                    threshold = self.failure_threshold,
                    %message,
                    "heartbeat probe failed"
                );
                self.tx.send_modify(|s| {
                    if exceeded {
                        s.effective_online = false;
                    }
                    s.last_checked_at = Some(now);
                    s.is_checking = false;
                });
            }
        }

        self.checking.store(false, Ordering::SeqCst);
    }

    /// Probes the health endpoint once.
    ///
    /// Any HTTP response counts as reachable, even an error status: a 500
    /// from the backend still proves the network path works.
    async fn probe(&self) -> Result<(), String> {
        let url = format!(
            "{}?t={}",
            self.probe_url,
            Utc::now().timestamp_millis()
        );
        let request = self.client.head(&url).send();

        match tokio::time::timeout(self.probe_timeout, request).await {
            Ok(Ok(_response)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("probe timed out after {:?}", self.probe_timeout)),
        }
    }

    /// Runs the heartbeat loop until `cancel` fires.
    ///
    /// Probes once at startup, then on every interval tick. Probing is
    /// suspended while the platform reports the link down; there is no
    /// point hammering a dead interface.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(url = %self.probe_url, interval = ?self.interval, "network monitor started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("network monitor stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if self.tx.borrow().online {
                        self.check_now().await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(interval_secs: u64, timeout_ms: u64) -> NetworkConfig {
        NetworkConfig {
            heartbeat_interval_secs: interval_secs,
            heartbeat_timeout_ms: timeout_ms,
            failure_threshold: 2,
        }
    }

    fn api_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: server.uri(),
            health_path: "/api/health".to_string(),
        }
    }

    async fn mount_healthy(server: &MockServer) {
        Mock::given(method("HEAD"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    async fn mount_stalled(server: &MockServer) {
        Mock::given(method("HEAD"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn successful_probe_keeps_online() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 5_000)).unwrap();
        monitor.check_now().await;

        let status = monitor.status();
        assert!(status.online);
        assert!(status.effective_online);
        assert!(status.last_checked_at.is_some());
        assert!(!status.is_checking);
    }

    #[tokio::test]
    async fn single_miss_does_not_flip_effective_online() {
        let server = MockServer::start().await;
        mount_stalled(&server).await;

        // 50ms timeout against a 500ms stall: every probe misses.
        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 50)).unwrap();
        monitor.check_now().await;

        let status = monitor.status();
        assert!(status.effective_online, "one miss must be absorbed");
        assert!(status.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn consecutive_misses_flip_effective_online() {
        let server = MockServer::start().await;
        mount_stalled(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 50)).unwrap();
        monitor.check_now().await;
        monitor.check_now().await;

        assert!(!monitor.status().effective_online);
    }

    #[tokio::test]
    async fn successful_probe_resets_failure_streak() {
        let server = MockServer::start().await;
        mount_stalled(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 50)).unwrap();
        monitor.check_now().await;
        monitor.check_now().await;
        assert!(!monitor.status().effective_online);

        // Backend recovers.
        server.reset().await;
        mount_healthy(&server).await;

        monitor.check_now().await;
        assert!(monitor.status().effective_online);

        // The streak restarted: one fresh miss must be absorbed again.
        server.reset().await;
        mount_stalled(&server).await;
        monitor.check_now().await;
        assert!(monitor.status().effective_online);
    }

    #[tokio::test]
    async fn error_status_still_counts_as_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 5_000)).unwrap();
        monitor.check_now().await;

        assert!(monitor.status().effective_online);
    }

    #[tokio::test]
    async fn notify_offline_takes_effect_immediately() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 5_000)).unwrap();
        monitor.notify_offline();

        let status = monitor.status();
        assert!(!status.online);
        assert!(!status.effective_online);
    }

    #[tokio::test]
    async fn notify_online_confirms_with_probe() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 5_000)).unwrap();
        monitor.notify_offline();
        monitor.notify_online().await;

        let status = monitor.status();
        assert!(status.online);
        assert!(status.effective_online);
        assert!(status.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn online_event_restores_effective_online_before_confirmation() {
        let server = MockServer::start().await;
        mount_stalled(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 50)).unwrap();
        monitor.notify_offline();
        monitor.notify_online().await;

        // The confirming probe missed once, which is under the threshold,
        // so the platform's link-up signal stands.
        let status = monitor.status();
        assert!(status.online);
        assert!(status.effective_online);
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        let monitor = NetworkMonitor::new(&api_for(&server), &test_config(15, 5_000)).unwrap();
        let mut rx = monitor.subscribe();

        monitor.notify_offline();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().effective_online);
    }

    #[tokio::test]
    async fn run_loop_stops_on_cancel() {
        let server = MockServer::start().await;
        mount_healthy(&server).await;

        let monitor =
            Arc::new(NetworkMonitor::new(&api_for(&server), &test_config(1, 5_000)).unwrap());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&monitor).run(cancel.clone()));

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(monitor.status().last_checked_at.is_some());

        cancel.cancel();
        handle.await.unwrap();
    }
}
