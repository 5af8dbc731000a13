// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Fleet monitor for the bus map
//!
//! Polls the latest location of every bus on the map and keeps the marker
//! board up to date.

use async_trait::async_trait;
use common::{
    position::{BusInfo, Position},
    tracking::BusPositionUpdate,
};
use location_api::BusLocationFetcher;
use module_core::{Event, EventKind, Module, ModuleCtx};
use std::{
    io::{Error, ErrorKind},
    sync::{Arc, RwLock},
    time::Duration,
};
use tokio::{
    sync::broadcast::error::RecvError,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, error, info, warn};

pub mod marker_board;

use marker_board::MarkerBoard;

/// Centre of the map before any bus is shown.
pub const DEFAULT_MAP_CENTER: Position = Position {
    latitude: 28.6139,
    longitude: 77.2090,
};

/// Zoom level of the map on load.
pub const DEFAULT_MAP_ZOOM: u8 = 12;

/// Shared handle to the marker board.
pub type MarkerBoardPtr = Arc<RwLock<MarkerBoard>>;

/// Fetches the location of one bus and moves its marker.
async fn update_bus_location(
    fetcher: Arc<dyn BusLocationFetcher>,
    board: MarkerBoardPtr,
    sender: tokio::sync::broadcast::Sender<Event>,
    bus_number: String,
) {
    let location = match fetcher.fetch_location(&bus_number).await {
        Ok(location) => location,
        Err(e) => {
            error!("Error updating location of bus {bus_number}. Error: {e}");
            return;
        }
    };
    let position = location.position();
    let moved = board
        .write()
        .unwrap_or_else(|board| board.into_inner())
        .set_position(&bus_number, position, location.timestamp);
    if !moved {
        warn!("Bus {bus_number} is no longer on the marker board");
        return;
    }
    debug!("Marker of bus {bus_number} moved to {position:?}");
    let _ = sender.send(Event {
        kind: EventKind::BusLocationEvent(Arc::new(BusPositionUpdate {
            bus_number,
            position,
        })),
    });
}

/// Polls the bus locations in a fixed period.
///
/// Every bus is fetched in its own task, one slow or failing bus doesn't hold
/// back the others.
pub struct FleetMonitor {
    ctx: ModuleCtx,
    fetcher: Arc<dyn BusLocationFetcher>,
    board: MarkerBoardPtr,
    poll_period: Duration,
}

impl FleetMonitor {
    /// Creates the monitor with one marker per bus in `buses`.
    ///
    /// Fails if `poll_period` is zero.
    pub fn new(
        ctx: ModuleCtx,
        fetcher: Arc<dyn BusLocationFetcher>,
        buses: &[BusInfo],
        poll_period: Duration,
    ) -> Result<Self, Error> {
        if poll_period.is_zero() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "poll period must not be zero",
            ));
        }
        Ok(FleetMonitor {
            ctx,
            fetcher,
            board: Arc::new(RwLock::new(MarkerBoard::from_buses(buses))),
            poll_period,
        })
    }

    /// Returns the shared marker board.
    pub fn board(&self) -> MarkerBoardPtr {
        self.board.clone()
    }

    /// Starts one location fetch per bus on the board.
    pub fn poll(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let bus_numbers = self
            .board
            .read()
            .unwrap_or_else(|board| board.into_inner())
            .bus_numbers();
        bus_numbers
            .into_iter()
            .map(|bus_number| {
                tokio::spawn(update_bus_location(
                    self.fetcher.clone(),
                    self.board.clone(),
                    self.ctx.sender.clone(),
                    bus_number,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl Module for FleetMonitor {
    async fn run(&mut self) -> Result<(), ()> {
        info!(
            "Fleet monitor started for {} buses",
            self.board
                .read()
                .unwrap_or_else(|board| board.into_inner())
                .len()
        );
        let mut timer = interval_at(Instant::now() + self.poll_period, self.poll_period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut run = true;
        while run {
            tokio::select! {
                _ = timer.tick() => {
                    self.poll();
                }
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => {
                            if let EventKind::QuitEvent = event.kind {
                                run = false;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("Fleet monitor skipped {skipped} events");
                        }
                        Err(RecvError::Closed) => run = false,
                    }
                }
            }
        }
        Ok(())
    }
}
