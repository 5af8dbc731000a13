// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::serde::coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude.
///
/// The `Position` struct is used for every position fix in the system.
/// Latitude values range from -90.0 to 90.0, and longitude values range
/// from -180.0 to 180.0, both in decimal degrees.
///
/// # Example
///
/// ```rust
/// use common::position::Position;
///
/// let pos = Position {
///     latitude: 28.6139,
///     longitude: 77.2090,
/// };
///
/// println!("{:?}", pos);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Creates a new [`Position`] with the given latitude and longitude.
    ///
    /// # Example
    ///
    /// ```rust
    /// use common::position::Position;
    ///
    /// let pos = Position::new(28.61, 77.23);
    /// assert_eq!(pos.latitude, 28.61);
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Position {
            latitude,
            longitude,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A single location update of a bus, as it is sent to the update endpoint.
///
/// The target identifier is serialized as `bus_id`, the name the server
/// expects in the request body.
///
/// # Example
///
/// ```rust
/// use common::position::{LocationReport, Position};
///
/// let report = LocationReport::new("B12", &Position::new(28.61, 77.23));
/// assert_eq!(
///     report.to_json().unwrap(),
///     r#"{"bus_id":"B12","latitude":28.61,"longitude":77.23}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub bus_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationReport {
    /// Builds a report for `bus_id` from a position fix.
    pub fn new(bus_id: &str, position: &Position) -> Self {
        LocationReport {
            bus_id: bus_id.to_string(),
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Latest known location of a bus as returned by the location endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusLocation {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub longitude: f64,
    /// Time the server stored the location, if it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl BusLocation {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A bus entry of the bus map, used to seed the marker board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusInfo {
    pub bus_number: String,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub longitude: f64,
}

impl BusInfo {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    /// Parses the bus list the map page is rendered with.
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<BusInfo>> {
        serde_json::from_str(json)
    }
}
