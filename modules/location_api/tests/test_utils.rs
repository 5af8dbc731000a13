// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use common::position::LocationReport;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

/// In-memory stand in for the tracking server.
#[derive(Clone, Default)]
pub struct FakeServerState {
    pub reports: Arc<Mutex<Vec<LocationReport>>>,
    pub locations: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

async fn update_location(
    State(state): State<FakeServerState>,
    Json(report): Json<LocationReport>,
) -> Json<serde_json::Value> {
    let bus_id = report.bus_id.clone();
    state.reports.lock().unwrap().push(report);
    Json(serde_json::json!({ "status": "success", "bus_id": bus_id }))
}

async fn get_location(
    State(state): State<FakeServerState>,
    Path(bus_number): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .locations
        .lock()
        .unwrap()
        .get(&bus_number)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Starts the fake server on a random local port and returns its base url.
pub async fn start_fake_server(state: FakeServerState) -> String {
    let app = Router::new()
        .route("/api/update-location/", post(update_location))
        .route("/api/location/{bus_number}/", get(get_location))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake server");
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Returns the url of a local port nobody listens on.
pub async fn unused_server_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
