//! Engine events
//!
//! The decode loop publishes every recognized notification to an
//! [`EventBus`]. Delivery is best-effort: the bus is bounded and a full bus
//! drops the newest event instead of blocking the loop. Consumers that need
//! authoritative state poll [`crate::Player::state`].

use crate::protocol::{EndFileReason, PropertyUpdate};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Events decoded from the control socket
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// An observed property changed (already applied to the state)
    PropertyChange(PropertyUpdate),

    /// A property change the state could not take: an unobserved name or a
    /// value of the wrong JSON type. Published as-is, never applied.
    UntypedPropertyChange {
        /// Property name as sent by the engine
        name: String,
        /// Raw value (`null` when absent)
        data: Value,
    },

    /// The engine finished with the current file
    EndOfFile {
        /// Why playback ended
        reason: EndFileReason,
    },

    /// The engine has nothing loaded
    Idle,
}

/// Producer side of the bounded event queue
///
/// Overflow policy: drop-newest. When the queue holds `capacity` undelivered
/// events, [`publish`](Self::publish) discards the new event, counts it and
/// returns immediately.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Sender<ControlEvent>,
    dropped: Arc<AtomicU64>,
}

/// Consumer side of the event queue (single logical consumer)
#[derive(Debug)]
pub struct EventStream {
    receiver: Receiver<ControlEvent>,
}

impl EventBus {
    /// Create a bus holding at most `capacity` undelivered events
    ///
    /// A capacity of 0 is raised to 1.
    pub fn bounded(capacity: usize) -> (EventBus, EventStream) {
        let (sender, receiver) = bounded(capacity.max(1));
        let bus = EventBus {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (bus, EventStream { receiver })
    }

    /// Queue an event without blocking
    ///
    /// Returns `false` if the event was dropped because the queue is full or
    /// the consumer is gone.
    pub fn publish(&self, event: ControlEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(?event, dropped, "Event bus full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Number of events dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventStream {
    /// Block until the next event, `None` once the bus is gone
    pub fn recv(&self) -> Option<ControlEvent> {
        self.receiver.recv().ok()
    }

    /// Next event if one is queued
    pub fn try_recv(&self) -> Option<ControlEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ControlEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued
    pub fn drain(&self) -> Vec<ControlEvent> {
        self.receiver.try_iter().collect()
    }

    /// Underlying receiver, for use in `crossbeam_channel::select!`
    pub fn receiver(&self) -> &Receiver<ControlEvent> {
        &self.receiver
    }
}
