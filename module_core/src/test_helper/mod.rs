// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{Event, EventBus, EventKind, EventKindType};
use tokio::time::timeout;
use tracing::debug;

/// Sends a quit signal to a running module and waits for it to stop gracefully.
///
/// This function publishes a [`QuitEvent`](EventKind::QuitEvent) through the given [`EventBus`],
/// signaling the target module to terminate. It then waits for the module's task
/// to complete within a fixed timeout.
///
/// # Panics
/// This function panics if:
/// - The module does not stop within the timeout duration.
/// - The task returns an error (`Err(())`).
pub async fn stop_module(
    event_bus: &EventBus,
    handle: &mut tokio::task::JoinHandle<Result<(), ()>>,
) {
    event_bus.publish(&Event {
        kind: EventKind::QuitEvent,
    });
    timeout(std::time::Duration::from_millis(100), handle)
        .await
        .expect("Module doesn't handle quit event in timeout")
        .expect("Module task panicked")
        .expect("Module returned an error");
}

/// Waits asynchronously for a specific type of [`Event`] to be received on a
/// [`tokio::sync::broadcast::Receiver`] within a given duration.
///
/// Events of other types are skipped.
///
/// # Panics
///
/// This function panics if no matching event is received within the specified
/// `duration`.
pub async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    duration: std::time::Duration,
    exp_event: EventKindType,
) -> Event {
    let deadline = tokio::time::Instant::now() + duration;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(event)) if event.event_type() == exp_event => return event,
            Ok(Ok(event)) => debug!("Skipping event {:?}", event.event_type()),
            Ok(Err(e)) => debug!("Receive error while waiting for event: {e}"),
            Err(_) => break,
        }
    }
    panic!("Failed to receive event of type {:?}", exp_event);
}

/// Collects every event of type `exp_event` received within `duration`.
///
/// Unlike [`wait_for_event`] this never panics, an empty vector means that no
/// matching event arrived.
pub async fn collect_events(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    duration: std::time::Duration,
    exp_event: EventKindType,
) -> Vec<Event> {
    let deadline = tokio::time::Instant::now() + duration;
    let mut events = Vec::new();
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(event)) => {
                if event.event_type() == exp_event {
                    events.push(event);
                }
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Lagged(n))) => {
                debug!("Receiver lagged behind by {n} events");
            }
            Ok(Err(tokio::sync::broadcast::error::RecvError::Closed)) | Err(_) => break,
        }
    }
    events
}
