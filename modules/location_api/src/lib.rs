// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Location API Modul for the bus tracker
//!
//! Client side of the bus tracking server: submitting location reports and
//! fetching the latest location of a bus.

use async_trait::async_trait;
use common::position::{BusLocation, LocationReport};
use std::{fmt, time::Duration};
use tracing::debug;

/// Upper bound for a single request to the tracking server.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sink for location reports of a tracking session.
#[async_trait]
pub trait LocationReporter: Send + Sync {
    /// Sends one report and returns the decoded JSON response of the server.
    async fn report(&self, report: &LocationReport) -> Result<serde_json::Value, ApiError>;
}

/// Source of the latest location of a bus.
#[async_trait]
pub trait BusLocationFetcher: Send + Sync {
    async fn fetch_location(&self, bus_number: &str) -> Result<BusLocation, ApiError>;
}

/// Errors of a request to the tracking server.
#[derive(Debug)]
pub enum ApiError {
    /// The server URL can't be used as base for the endpoints.
    InvalidUrl(String),
    /// The request could not be sent or no response was received.
    Transport(reqwest::Error),
    /// The server answered with a non success status.
    Status(reqwest::StatusCode),
    /// The response body is not the expected JSON.
    Decode(reqwest::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidUrl(url) => write!(f, "Invalid server url \"{url}\""),
            ApiError::Transport(e) => write!(f, "Request failed. Error: {e}"),
            ApiError::Status(status) => write!(f, "Server responded with status {status}"),
            ApiError::Decode(e) => write!(f, "Failed to decode response. Error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) | ApiError::Decode(e) => Some(e),
            ApiError::InvalidUrl(_) | ApiError::Status(_) => None,
        }
    }
}

/// HTTP client for the tracking server endpoints.
///
/// - `POST /api/update-location/` with a [`LocationReport`] as JSON body.
/// - `GET /api/location/<bus_number>/` returning a [`BusLocation`].
#[derive(Debug, Clone)]
pub struct HttpLocationApi {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpLocationApi {
    /// Creates a client for the server at `server_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(server_url: &str) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(server_url)
            .map_err(|_| ApiError::InvalidUrl(server_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(server_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(HttpLocationApi { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .clear()
            .extend(segments)
            // Endpoint paths end with a slash.
            .push("");
        Ok(url)
    }

    pub fn update_location_url(&self) -> Result<reqwest::Url, ApiError> {
        self.endpoint(&["api", "update-location"])
    }

    pub fn location_url(&self, bus_number: &str) -> Result<reqwest::Url, ApiError> {
        self.endpoint(&["api", "location", bus_number])
    }
}

#[async_trait]
impl LocationReporter for HttpLocationApi {
    async fn report(&self, report: &LocationReport) -> Result<serde_json::Value, ApiError> {
        let url = self.update_location_url()?;
        debug!("POST {url} {report:?}");
        let response = self
            .client
            .post(url)
            .json(report)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        response
            .json::<serde_json::Value>()
            .await
            .map_err(ApiError::Decode)
    }
}

#[async_trait]
impl BusLocationFetcher for HttpLocationApi {
    async fn fetch_location(&self, bus_number: &str) -> Result<BusLocation, ApiError> {
        let url = self.location_url(bus_number)?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        response.json::<BusLocation>().await.map_err(ApiError::Decode)
    }
}
