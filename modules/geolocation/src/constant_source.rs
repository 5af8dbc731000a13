// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{GeolocationError, GeolocationSource};
use common::position::Position;
use std::{
    io::{Error, ErrorKind},
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::debug;

/// A geolocation source that replays a fixed list of positions.
///
/// Every request returns the next position of the list, after the last one
/// the source starts over with the first position.
#[derive(Debug)]
pub struct ConstantGeolocation {
    positions: Vec<Position>,
    next_position: AtomicUsize,
}

impl ConstantGeolocation {
    /// Creates the source, fails if `positions` is empty.
    pub fn new(positions: &[Position]) -> Result<Self, Error> {
        if positions.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "positions parameter is empty",
            ));
        }
        Ok(ConstantGeolocation {
            positions: positions.to_vec(),
            next_position: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl GeolocationSource for ConstantGeolocation {
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Position, GeolocationError> {
        let index = self.next_position.fetch_add(1, Ordering::Relaxed) % self.positions.len();
        let position = self.positions[index];
        debug!("Constant geolocation position {index}: {position:?}");
        Ok(position)
    }
}
