// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Tracking session of a bus driver
//!
//! While a session is running the current position is sampled once per
//! report period and sent to the location update endpoint.

use async_trait::async_trait;
use common::{position::LocationReport, tracking::TrackingState};
use geolocation::GeolocationSource;
use location_api::LocationReporter;
use module_core::{Event, EventKind, Module, ModuleCtx};
use std::{
    io::{Error, ErrorKind},
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::broadcast::error::RecvError,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, error, info, warn};

pub mod ui;

use ui::{Notification, TrackButton, TrackingUi};

/// Everything a single tick needs, cloned into every tick task.
#[derive(Clone)]
struct TrackingTickRuntime {
    bus_id: Arc<str>,
    geolocation: Arc<dyn GeolocationSource>,
    reporter: Arc<dyn LocationReporter>,
    sender: tokio::sync::broadcast::Sender<Event>,
}

impl TrackingTickRuntime {
    /// Samples one position and reports it.
    ///
    /// Failures are logged and published, they never reach the session state.
    async fn handle_tick(self) {
        let position = match self.geolocation.current_position().await {
            Ok(position) => position,
            Err(e) => {
                error!("Error getting location: {e}");
                let _ = self.sender.send(Event {
                    kind: EventKind::PositionFixFailedEvent,
                });
                return;
            }
        };

        let report = Arc::new(LocationReport::new(&self.bus_id, &position));
        match self.reporter.report(&report).await {
            Ok(response) => {
                info!("Location of bus {} reported: {response}", self.bus_id);
                let _ = self.sender.send(Event {
                    kind: EventKind::LocationReportedEvent(report),
                });
            }
            Err(e) => {
                error!("Failed to report location of bus {}. Error: {e}", self.bus_id);
                let _ = self.sender.send(Event {
                    kind: EventKind::ReportFailedEvent(report),
                });
            }
        }
    }
}

/// Fires once per `period`, the first time one period after the start.
///
/// Every tick runs in its own detached task, so a slow report never delays
/// the next tick and stopping the timer leaves running ticks alone.
async fn tracking_timer_task(runtime: TrackingTickRuntime, period: Duration) {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        timer.tick().await;
        debug!("Tracking tick for bus {}", runtime.bus_id);
        tokio::spawn(runtime.clone().handle_tick());
    }
}

/// A running session: the captured bus and the timer reporting it.
struct ActiveTracking {
    bus_id: Arc<str>,
    timer_handle: tokio::task::JoinHandle<()>,
}

/// Controller of the tracking session.
///
/// The session is either stopped or running. A running session owns exactly
/// one timer task, the state is derived from the presence of that task so
/// both can never disagree.
pub struct TrackingSession {
    ctx: ModuleCtx,
    geolocation: Arc<dyn GeolocationSource>,
    reporter: Arc<dyn LocationReporter>,
    ui: Arc<dyn TrackingUi>,
    report_period: Duration,
    active: Option<ActiveTracking>,
}

impl TrackingSession {
    /// Creates a stopped session.
    ///
    /// Fails if `report_period` is zero.
    pub fn new(
        ctx: ModuleCtx,
        geolocation: Arc<dyn GeolocationSource>,
        reporter: Arc<dyn LocationReporter>,
        ui: Arc<dyn TrackingUi>,
        report_period: Duration,
    ) -> Result<Self, Error> {
        if report_period.is_zero() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "report period must not be zero",
            ));
        }
        Ok(TrackingSession {
            ctx,
            geolocation,
            reporter,
            ui,
            report_period,
            active: None,
        })
    }

    pub fn state(&self) -> TrackingState {
        match self.active {
            Some(_) => TrackingState::Running,
            None => TrackingState::Stopped,
        }
    }

    /// The bus captured when the running session was started.
    pub fn bus_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.bus_id.as_ref())
    }

    /// Starts a stopped session or stops a running one.
    ///
    /// Must be called from within a tokio runtime, starting spawns the timer task.
    pub fn toggle(&mut self) -> TrackingState {
        match self.state() {
            TrackingState::Running => self.stop(),
            TrackingState::Stopped => self.start(),
        }
    }

    fn start(&mut self) -> TrackingState {
        if !self.geolocation.is_available() {
            warn!("Tracking not started, geolocation is unavailable");
            self.ui.notify(Notification::GeolocationUnavailable);
            return self.state();
        }

        self.ui.set_track_button(TrackButton::STOP);
        let bus_id: Arc<str> = Arc::from(self.ui.selected_bus_id());
        let runtime = TrackingTickRuntime {
            bus_id: bus_id.clone(),
            geolocation: self.geolocation.clone(),
            reporter: self.reporter.clone(),
            sender: self.ctx.sender.clone(),
        };
        let period = self.report_period;
        let timer_handle = tokio::spawn(tracking_timer_task(runtime, period));
        info!("Live tracking started for bus {bus_id} every {period:?}");
        self.active = Some(ActiveTracking {
            bus_id,
            timer_handle,
        });
        self.ui.notify(Notification::TrackingStarted);
        self.publish_state();
        self.state()
    }

    fn stop(&mut self) -> TrackingState {
        if let Some(active) = self.cancel_timer() {
            info!("Live tracking stopped for bus {}", active.bus_id);
        }
        self.ui.set_track_button(TrackButton::START);
        self.ui.notify(Notification::TrackingStopped);
        self.publish_state();
        self.state()
    }

    /// Aborts the timer of a running session. Ticks already in flight finish.
    fn cancel_timer(&mut self) -> Option<ActiveTracking> {
        let active = self.active.take()?;
        active.timer_handle.abort();
        Some(active)
    }

    fn publish_state(&self) {
        let _ = self
            .ctx
            .publish_event(EventKind::TrackingStateEvent(self.state()));
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[async_trait]
impl Module for TrackingSession {
    async fn run(&mut self) -> Result<(), ()> {
        info!("Tracking session module started");
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => match event.kind {
                            EventKind::QuitEvent => {
                                if self.cancel_timer().is_some() {
                                    debug!("Timer of running session aborted on quit");
                                }
                                run = false;
                            }
                            EventKind::ToggleTrackingEvent => {
                                self.toggle();
                            }
                            _ => (),
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Tracking session missed {skipped} events");
                        }
                        Err(RecvError::Closed) => {
                            error!("Event bus closed, stopping tracking session module");
                            self.cancel_timer();
                            run = false;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
