// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{position::LocationReport, tracking::BusPositionUpdate, tracking::TrackingState};
use strum_macros::EnumDiscriminants;

/// Represents a high-level event in the system.
///
/// Each `Event` wraps an [`EventKind`], which defines the actual type
/// and data carried by the event.
///
/// This structure is designed to be passed through an [`EventBus`]
/// between asynchronous modules.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The inner event type and associated data.
    pub kind: EventKind,
}

impl Event {
    /// Returns the discriminant of the wrapped [`EventKind`].
    pub fn event_type(&self) -> EventKindType {
        EventKindType::from(&self.kind)
    }
}

/// A thread-safe, reference-counted pointer to a [`LocationReport`].
///
/// Reports are shared between the reporting task and every subscriber
/// of the bus without copying the bus identifier.
pub type LocationReportPtr = std::sync::Arc<LocationReport>;

/// A thread-safe, reference-counted pointer to a [`BusPositionUpdate`].
pub type BusPositionUpdatePtr = std::sync::Arc<BusPositionUpdate>;

/// Enumerates the different kinds of events that can be emitted
/// and transmitted via the [`EventBus`].
///
/// The discriminants are available as [`EventKindType`], which allows
/// matching on the event type without looking at the payload.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKindType), derive(Hash))]
pub enum EventKind {
    /// Indicates that a module shall terminate.
    QuitEvent,

    /// The user pressed the track button.
    ToggleTrackingEvent,

    /// The tracking session changed its state.
    TrackingStateEvent(TrackingState),

    /// A location report was accepted by the update endpoint.
    LocationReportedEvent(LocationReportPtr),

    /// A location report could not be delivered.
    ReportFailedEvent(LocationReportPtr),

    /// The geolocation source could not provide a fix for a tick.
    PositionFixFailedEvent,

    /// The polled location of a bus changed the marker position.
    BusLocationEvent(BusPositionUpdatePtr),
}

/// Returns a reference to the payload of an event kind if it matches the
/// given variant, `None` otherwise.
///
/// ```rust
/// use module_core::{EventKind, payload_ref};
/// use common::tracking::TrackingState;
///
/// let kind = EventKind::TrackingStateEvent(TrackingState::Running);
/// assert_eq!(
///     payload_ref!(kind, EventKind::TrackingStateEvent),
///     Some(&TrackingState::Running)
/// );
/// ```
#[macro_export]
macro_rules! payload_ref {
    ($kind:expr, $variant:path) => {
        match &$kind {
            $variant(payload) => Some(payload),
            _ => None,
        }
    };
}

/// A simple asynchronous event bus for publishing and subscribing to [`Event`]s.
///
/// The event bus uses a [`tokio::sync::broadcast::channel`] under the hood,
/// allowing multiple receivers to listen for the same stream of events.
///
/// Each published event is cloned and distributed to all active subscribers.
/// If no subscribers exist at the time of publication, the event is discarded silently.
pub struct EventBus {
    /// The broadcast sender used internally to distribute events.
    sender: tokio::sync::broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new [`EventBus`] with a fixed buffer capacity of 100 messages.
    ///
    /// When the buffer is full, the oldest messages are dropped automatically
    /// as new ones are published.
    pub fn new() -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(100);
        EventBus { sender }
    }

    /// Subscribes to the event bus and returns a [`tokio::sync::broadcast::Receiver`].
    ///
    /// The returned receiver will receive all future events published after the
    /// subscription is created.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publishes an [`Event`] to all active subscribers.
    ///
    /// If no subscribers exist, the event is discarded silently.
    pub fn publish(&self, event: &Event) {
        let _ = self.sender.send(event.clone());
    }

    /// Returns a sender that can publish into this bus from outside of a module,
    /// e.g. from a signal handler.
    pub fn sender(&self) -> tokio::sync::broadcast::Sender<Event> {
        self.sender.clone()
    }

    /// Creates a [`ModuleCtx`] bound to this [`EventBus`].
    ///
    /// The returned context can be used by modules implementing [`Module`]
    /// to send and receive events within their execution scope.
    pub fn context(&self) -> ModuleCtx {
        ModuleCtx::new(self)
    }
}

/// Provides a default instance of [`EventBus`].
impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Defines the common interface for an asynchronous module
/// that can be executed and communicate via the [`EventBus`].
#[async_trait::async_trait]
pub trait Module {
    /// Runs the module asynchronously until completion.
    ///
    /// This function typically contains the module's main event loop,
    /// reacting to messages received through the [`ModuleCtx`].
    async fn run(&mut self) -> Result<(), ()>;
}

/// Provides a module-scoped context for interacting with the [`EventBus`].
///
/// Each `ModuleCtx` owns both a sender and a receiver, allowing the module
/// to both publish and listen for events concurrently.
pub struct ModuleCtx {
    /// The broadcast sender used to publish events.
    pub sender: tokio::sync::broadcast::Sender<Event>,

    /// The broadcast receiver used to listen for events.
    ///
    /// The receiver is subscribed when the context is created, so events
    /// published before the module runs are not lost.
    pub receiver: tokio::sync::broadcast::Receiver<Event>,
}

impl ModuleCtx {
    /// Constructs a new [`ModuleCtx`] from the given [`EventBus`].
    ///
    /// Clones the internal broadcast sender and creates a new receiver.
    pub fn new(event_bus: &EventBus) -> Self {
        ModuleCtx {
            sender: event_bus.sender.clone(),
            receiver: event_bus.subscribe(),
        }
    }

    /// Publishes an event of the given kind to all subscribers of the bus.
    ///
    /// Returns the number of receivers the event was delivered to.
    pub fn publish_event(
        &self,
        kind: EventKind,
    ) -> Result<usize, tokio::sync::broadcast::error::SendError<Event>> {
        self.sender.send(Event { kind })
    }
}

pub mod test_helper;
