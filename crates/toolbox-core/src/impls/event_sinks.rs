//! In-process EventSink implementations.

use tokio::sync::{broadcast, mpsc};

use crate::domain::TaskEvent;
use crate::ports::EventSink;

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: TaskEvent) {}
}

/// Fan-out to any number of subscribers.
///
/// A subscriber that falls behind by more than `capacity` events receives
/// `RecvError::Lagged` and skips ahead; the scheduler is never slowed down.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<TaskEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: TaskEvent) {
        // ignore send error: no subscriber is listening right now
        let _ = self.tx.send(event);
    }
}

/// Single ordered observer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn publish(&self, event: TaskEvent) {
        // receiver dropped = nobody is watching anymore
        let _ = self.tx.send(event);
    }
}
