// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::{DateTime, Utc};
use common::position::{BusInfo, Position};
use std::collections::BTreeMap;

/// Map marker of a single bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// The bus number, shown as marker title.
    pub title: String,
    pub position: Position,
    /// Time the server stored the shown position, if known.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Marker {
    /// Text of the info window opened by a click on the marker.
    pub fn popup(&self) -> String {
        format!("Bus Number: {}", self.title)
    }
}

/// Latest known position of every monitored bus, keyed by bus number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerBoard {
    markers: BTreeMap<String, Marker>,
}

impl MarkerBoard {
    /// Places one marker per bus at its initial position.
    ///
    /// A bus number listed twice keeps the last entry.
    pub fn from_buses(buses: &[BusInfo]) -> Self {
        let markers = buses
            .iter()
            .map(|bus| {
                (
                    bus.bus_number.clone(),
                    Marker {
                        title: bus.bus_number.clone(),
                        position: bus.position(),
                        updated_at: None,
                    },
                )
            })
            .collect();
        MarkerBoard { markers }
    }

    pub fn bus_numbers(&self) -> Vec<String> {
        self.markers.keys().cloned().collect()
    }

    pub fn marker(&self, bus_number: &str) -> Option<&Marker> {
        self.markers.get(bus_number)
    }

    /// Moves the marker of `bus_number`.
    ///
    /// Returns `false` if the bus is not on the board, unknown buses are never added.
    pub fn set_position(
        &mut self,
        bus_number: &str,
        position: Position,
        updated_at: Option<DateTime<Utc>>,
    ) -> bool {
        match self.markers.get_mut(bus_number) {
            Some(marker) => {
                marker.position = position;
                marker.updated_at = updated_at;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
