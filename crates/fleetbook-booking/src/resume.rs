// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resume coordination for interrupted bookings.
//!
//! A resume can be triggered from several directions at nearly the same
//! moment (intent just saved, auth state just restored), so all triggers
//! funnel through one coordinator guarded by a single-permit semaphore.
//! The intent is cleared whether the resume succeeds or fails; a broken
//! resume must not re-fire on every auth event forever.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fleetbook_core::{AuthProvider, Car, FleetbookError};

use crate::cars::CarClient;
use crate::intents::{BookingIntents, IntentEvent};

/// Serializes resume attempts and reacts to intent and auth triggers.
pub struct ResumeCoordinator {
    intents: Arc<BookingIntents>,
    auth: Arc<dyn AuthProvider>,
    cars: CarClient,
    /// Single-flight guard. Losers of the race skip; there is at most one
    /// intent, so the winner handles it.
    lock: Semaphore,
    auth_changed: Notify,
    resumed: mpsc::Sender<Car>,
    cancel: CancellationToken,
}

impl ResumeCoordinator {
    /// Returns the coordinator and the channel on which resumed cars are
    /// delivered to the UI layer.
    pub fn new(
        intents: Arc<BookingIntents>,
        auth: Arc<dyn AuthProvider>,
        cars: CarClient,
        cancel: CancellationToken,
    ) -> (Arc<Self>, mpsc::Receiver<Car>) {
        let (resumed, rx) = mpsc::channel(4);
        let coordinator = Arc::new(Self {
            intents,
            auth,
            cars,
            lock: Semaphore::new(1),
            auth_changed: Notify::new(),
            resumed,
            cancel,
        });
        (coordinator, rx)
    }

    /// Signals that the auth state changed (sign-in, sign-out, profile
    /// load). The run loop will attempt a resume.
    pub fn notify_auth_changed(&self) {
        self.auth_changed.notify_one();
    }

    /// Attempts one resume pass.
    ///
    /// Returns the car the booking should continue with, or `None` when
    /// there is nothing to do: no intent, intent expired, user signed out
    /// or profile still loading, or another pass already in flight.
    pub async fn try_resume(&self) -> Result<Option<Car>, FleetbookError> {
        let Ok(_permit) = self.lock.try_acquire() else {
            debug!("resume already in flight, skipping");
            return Ok(None);
        };

        let Some(intent) = self.intents.get().await? else {
            return Ok(None);
        };

        let Some(user) = self.auth.current_user().await else {
            debug!("signed out, leaving intent for after sign-in");
            return Ok(None);
        };
        if !user.is_complete() {
            debug!(user_id = %user.id, "profile incomplete, leaving intent for later");
            return Ok(None);
        }

        let result = self
            .cars
            .get_car(&intent.car_id, Some(self.cancel.clone()))
            .await;

        // Teardown mid-lookup: keep the intent so the next session can
        // resume it.
        if matches!(result, Err(FleetbookError::Cancelled)) {
            return Err(FleetbookError::Cancelled);
        }

        // Any other outcome consumes the intent.
        self.intents.clear().await?;

        match result {
            Ok(car) => {
                info!(car_id = %car.id, "resuming interrupted booking");
                let _ = self.resumed.send(car.clone()).await;
                Ok(Some(car))
            }
            Err(err) => {
                warn!(car_id = %intent.car_id, error = %err, "resume failed, intent dropped");
                Err(err)
            }
        }
    }

    /// Runs the trigger loop until the cancellation token fires.
    pub async fn run(self: Arc<Self>) {
        let mut intent_events = self.intents.subscribe();
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("resume coordinator stopped");
                    return;
                }
                event = intent_events.recv() => {
                    match event {
                        Ok(IntentEvent::Saved(_)) => self.resume_and_log().await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "intent events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
                _ = self.auth_changed.notified() => {
                    self.resume_and_log().await;
                }
            }
        }
    }

    async fn resume_and_log(&self) {
        match self.try_resume().await {
            Ok(_) => {}
            Err(FleetbookError::Cancelled) => {}
            Err(err) => warn!(error = %err, "resume attempt failed"),
        }
    }
}
