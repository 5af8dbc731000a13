// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a tracking session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    /// No timer is armed, nothing is reported.
    #[default]
    Stopped,
    /// The report timer is armed and fires periodically.
    Running,
}

impl TrackingState {
    pub fn is_running(&self) -> bool {
        *self == TrackingState::Running
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingState::Stopped => write!(f, "stopped"),
            TrackingState::Running => write!(f, "running"),
        }
    }
}

/// New position of a bus observed while polling the location endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusPositionUpdate {
    pub bus_number: String,
    pub position: Position,
}
