// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{
    address::PageAddress,
    position::{PositionError, PositionSample, WatchId},
};
use std::sync::Arc;
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
    /// Returns the discriminant of the carried [`EventKind`].
    pub fn event_type(&self) -> EventKindType {
        EventKindType::from(&self.kind)
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event { kind }
    }
}

/// A sample delivered by a position watch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionUpdate {
    /// The watch that produced the sample.
    pub watch_id: WatchId,
    pub sample: PositionSample,
}

/// A failure reported by a position watch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionFailure {
    /// The watch that reported the failure.
    pub watch_id: WatchId,
    pub error: PositionError,
}

pub type PositionUpdatePtr = Arc<PositionUpdate>;
pub type PositionFailurePtr = Arc<PositionFailure>;
pub type PageAddressPtr = Arc<PageAddress>;

/// Identifier of a clicked page element.
pub type ElementIdPtr = Arc<str>;

/// Enumerates the different kinds of events that can be emitted
/// and transmitted via the [`EventBus`].
///
/// The derived [`EventKindType`] carries only the variant and is used to
/// wait for or filter specific events.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKindType), derive(Hash))]
pub enum EventKind {
    /// Indicates that a module shall terminate.
    QuitEvent,

    /// The page finished loading its document.
    PageReadyEvent,

    /// The user clicked an element. Carries the element identifier, which is
    /// empty for elements without one.
    ElementClickedEvent(ElementIdPtr),

    /// Asks the location mirror to start tracking.
    StartTrackingRequestEvent,

    /// Asks the location mirror to stop tracking.
    StopTrackingRequestEvent,

    /// A position watch was registered.
    TrackingStartedEvent(WatchId),

    /// The active position watch was cleared.
    TrackingStoppedEvent(WatchId),

    /// Tracking was requested but the host offers no location capability.
    CapabilityUnavailableEvent,

    /// A new position sample of a watch.
    PositionEvent(PositionUpdatePtr),

    /// A watch failed to deliver a sample.
    PositionErrorEvent(PositionFailurePtr),

    /// The page address was replaced with the carried address.
    AddressChangedEvent(PageAddressPtr),
}

/// Borrows the payload of an [`EventKind`] variant.
///
/// Evaluates to `Some(&payload)` if `kind` is the given variant and `None`
/// otherwise.
///
/// ```
/// use module_core::{EventKind, payload_ref};
/// use common::position::WatchId;
///
/// let kind = EventKind::TrackingStartedEvent(WatchId(1));
/// assert_eq!(payload_ref!(kind, EventKind::TrackingStartedEvent), Some(&WatchId(1)));
/// ```
#[macro_export]
macro_rules! payload_ref {
    ($kind:expr, $variant:path) => {
        match &$kind {
            $variant(payload) => Some(payload),
            #[allow(unreachable_patterns)]
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

    /// Returns a clone of the sender, for producers that live outside of a
    /// module such as platform callbacks or signal handlers.
    pub fn sender(&self) -> tokio::sync::broadcast::Sender<Event> {
        self.sender.clone()
    }

    /// Creates a [`ModuleCtx`] bound to this [`EventBus`].
    ///
    /// The context subscribes immediately, so it receives every event
    /// published after this call even if the module runs later.
    pub fn context(&self) -> ModuleCtx {
        ModuleCtx::new(self)
    }
}

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

    /// Publishes an event of the given kind.
    ///
    /// Fails only if no receiver is subscribed to the bus.
    pub fn publish_event(
        &self,
        kind: EventKind,
    ) -> Result<(), tokio::sync::broadcast::error::SendError<Event>> {
        self.sender.send(Event { kind }).map(|_| ())
    }
}

pub mod test_helper;
