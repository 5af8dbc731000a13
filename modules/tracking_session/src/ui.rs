// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use std::fmt;

/// Label and enabled flag of the track button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackButton {
    pub label: &'static str,
    pub enabled: bool,
}

impl TrackButton {
    /// Shown while no session is running.
    pub const START: TrackButton = TrackButton {
        label: "Start Tracking",
        enabled: true,
    };

    /// Shown while a session is running, the button stays enabled to allow stopping.
    pub const STOP: TrackButton = TrackButton {
        label: "Stop Tracking",
        enabled: true,
    };
}

/// User facing notifications of the tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    TrackingStarted,
    TrackingStopped,
    GeolocationUnavailable,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::TrackingStarted => write!(f, "Live tracking started for your bus!"),
            Notification::TrackingStopped => write!(f, "Live tracking stopped for your bus!"),
            Notification::GeolocationUnavailable => {
                write!(f, "Geolocation is not supported by your browser")
            }
        }
    }
}

/// The user interface the tracking session is operated from.
///
/// It provides the selected bus and shows the session state to the user.
pub trait TrackingUi: Send + Sync {
    /// Returns the identifier of the bus currently selected by the user.
    fn selected_bus_id(&self) -> String;

    /// Updates the track button.
    fn set_track_button(&self, button: TrackButton);

    /// Shows a notification to the user.
    fn notify(&self, notification: Notification);
}
