//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from the core engine to any UI
//! layer. Back-pressure is handled at the emission site (callers throttle
//! intra-phase ticks to a fixed cadence, see `core::detector`), not by
//! dropping messages in the channel itself - phase-boundary events are
//! always delivered, and a bounded throttle keeps ticks from flooding a
//! slow subscriber.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core engine.
///
/// This is a thin wrapper around crossbeam's Sender that can be cloned and
/// sent across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Create a new EventSender from a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event. If the receiver is dropped, the event is silently
    /// discarded - progress reporting is always optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core engine.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// A single producer/multi-subscriber event channel.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel. Use this for most cases -
    /// events are small and this is the channel the engine itself emits
    /// into; fan-out to multiple UI subscribers is `ProgressHub`'s job.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded event channel with the specified capacity.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A no-op event sender for when you don't need progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

/// Fans a single stream of engine events out to every subscriber.
///
/// Each subscriber gets its own unbounded channel, so one slow subscriber
/// can never block another or cause boundary events to be dropped -
/// multiple subscribers each receive every event, per the progress-reporter
/// contract.
#[derive(Clone, Default)]
pub struct ProgressHub {
    subscribers: std::sync::Arc<std::sync::Mutex<Vec<EventSender>>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiver.
    pub fn subscribe(&self) -> EventReceiver {
        let (sender, receiver) = EventChannel::new();
        self.subscribers.lock().unwrap().push(sender);
        receiver
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: Event) {
        let subscribers = self.subscribers.lock().unwrap();
        for sender in subscribers.iter() {
            sender.send(event.clone());
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}
