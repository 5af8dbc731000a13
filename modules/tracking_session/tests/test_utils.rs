// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

#![allow(dead_code)]

use async_trait::async_trait;
use common::position::{LocationReport, Position};
use geolocation::{GeolocationError, GeolocationSource};
use location_api::{ApiError, LocationReporter};
use module_core::{EventBus, Module, ModuleCtx};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracking_session::{
    TrackingSession,
    ui::{Notification, TrackButton, TrackingUi},
};

pub const PERIOD: Duration = Duration::from_millis(5000);

/// Records everything the session shows to the user.
pub struct FakeUi {
    pub bus_id: Mutex<String>,
    pub buttons: Mutex<Vec<TrackButton>>,
    pub notifications: Mutex<Vec<Notification>>,
}

impl FakeUi {
    pub fn new(bus_id: &str) -> Arc<Self> {
        Arc::new(FakeUi {
            bus_id: Mutex::new(bus_id.to_string()),
            buttons: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        })
    }

    pub fn select_bus(&self, bus_id: &str) {
        *self.bus_id.lock().unwrap() = bus_id.to_string();
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn buttons(&self) -> Vec<TrackButton> {
        self.buttons.lock().unwrap().clone()
    }
}

impl TrackingUi for FakeUi {
    fn selected_bus_id(&self) -> String {
        self.bus_id.lock().unwrap().clone()
    }

    fn set_track_button(&self, button: TrackButton) {
        self.buttons.lock().unwrap().push(button);
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Geolocation that hands out scripted results, then a fallback fix.
pub struct FakeGeolocation {
    available: bool,
    scripted: Mutex<VecDeque<Result<Position, GeolocationError>>>,
    fallback: Result<Position, GeolocationError>,
    pub requests: AtomicUsize,
}

impl FakeGeolocation {
    pub fn with_fix(position: Position) -> Arc<Self> {
        Arc::new(FakeGeolocation {
            available: true,
            scripted: Mutex::new(VecDeque::new()),
            fallback: Ok(position),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: GeolocationError) -> Arc<Self> {
        Arc::new(FakeGeolocation {
            available: true,
            scripted: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(FakeGeolocation {
            available: false,
            scripted: Mutex::new(VecDeque::new()),
            fallback: Err(GeolocationError::Unavailable),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn script(&self, result: Result<Position, GeolocationError>) {
        self.scripted.lock().unwrap().push_back(result);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeolocationSource for FakeGeolocation {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn current_position(&self) -> Result<Position, GeolocationError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.scripted.lock().unwrap().pop_front() {
            return result;
        }
        self.fallback.clone()
    }
}

/// Reporter that records delivered reports.
///
/// A delay simulates a slow server, `fail` simulates an unreachable one.
pub struct FakeReporter {
    pub delay: Duration,
    pub fail: bool,
    pub attempts: AtomicUsize,
    pub delivered: Mutex<Vec<LocationReport>>,
}

impl FakeReporter {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(FakeReporter {
            delay,
            fail: false,
            attempts: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(FakeReporter {
            delay: Duration::ZERO,
            fail: true,
            attempts: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        })
    }

    pub fn delivered(&self) -> Vec<LocationReport> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationReporter for FakeReporter {
    async fn report(&self, report: &LocationReport) -> Result<serde_json::Value, ApiError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ApiError::InvalidUrl("http://unreachable".to_string()));
        }
        self.delivered.lock().unwrap().push(report.clone());
        Ok(serde_json::json!({ "status": "success" }))
    }
}

pub fn create_session(
    ctx: ModuleCtx,
    geolocation: Arc<FakeGeolocation>,
    reporter: Arc<FakeReporter>,
    ui: Arc<FakeUi>,
) -> TrackingSession {
    TrackingSession::new(ctx, geolocation, reporter, ui, PERIOD)
        .expect("Failed to create tracking session")
}

/// Creates and runs the tracking session module in a separate Tokio task.
pub fn create_module(
    eb: &EventBus,
    geolocation: Arc<FakeGeolocation>,
    reporter: Arc<FakeReporter>,
    ui: Arc<FakeUi>,
) -> JoinHandle<Result<(), ()>> {
    let session = create_session(eb.context(), geolocation, reporter, ui);
    tokio::spawn(async move {
        let mut session = session;
        session.run().await
    })
}
