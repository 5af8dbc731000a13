// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Geolocation Modul for the bus tracker
//!
//! Provides the interface to request a position fix and the sources that
//! implement it.

use async_trait::async_trait;
use common::position::Position;
use std::fmt;

pub mod constant_source;
pub mod gpsd_source;

/// Common interface that every geolocation source must support.
///
/// A source can be missing entirely, which is checked with
/// [`is_available`](GeolocationSource::is_available) before the first request.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Returns `true` if the source is able to deliver position fixes at all.
    fn is_available(&self) -> bool;

    /// Requests one position fix.
    async fn current_position(&self) -> Result<Position, GeolocationError>;
}

/// Reasons why a position fix request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    /// The device has no geolocation capability.
    Unavailable,
    /// The capability exists but no position could be determined.
    PositionUnavailable,
    /// The last known position is older than the accepted age.
    Timeout,
    /// Access to the position was refused.
    PermissionDenied,
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationError::Unavailable => write!(f, "geolocation is not supported"),
            GeolocationError::PositionUnavailable => write!(f, "position unavailable"),
            GeolocationError::Timeout => write!(f, "timed out waiting for a position fix"),
            GeolocationError::PermissionDenied => write!(f, "permission to the position denied"),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// A geolocation source for devices without any positioning capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableGeolocation;

#[async_trait]
impl GeolocationSource for UnavailableGeolocation {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Position, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}
