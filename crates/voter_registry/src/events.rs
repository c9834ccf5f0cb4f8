//! Registry notifications
//!
//! Events are published synchronously, in commit order, to every observer
//! subscribed on the [`EventBus`]. Observers must not call back into the
//! registry that is publishing to them.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use voting_types::RegistryEvent;

/// Receives registry events after the triggering mutation is committed.
pub trait RegistryObserver: Send + Sync {
    fn on_event(&self, event: &RegistryEvent);
}

impl<F> RegistryObserver for F
where
    F: Fn(&RegistryEvent) + Send + Sync,
{
    fn on_event(&self, event: &RegistryEvent) {
        self(event)
    }
}

/// Ordered fan-out of events to subscribed observers.
#[derive(Clone, Default)]
pub struct EventBus {
    observers: Vec<Arc<dyn RegistryObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn RegistryObserver>) {
        self.observers.push(observer);
    }

    /// Subscribe a tokio channel and return its receiving half.
    pub fn subscribe_channel(&mut self) -> mpsc::UnboundedReceiver<RegistryEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribe(Arc::new(ChannelObserver::new(sender)));
        receiver
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Deliver `event` to every observer in subscription order.
    pub fn publish(&self, event: RegistryEvent) {
        debug!(event = event.name(), observers = self.observers.len(), "Publishing event");
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

/// Forwards events into an unbounded tokio channel.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<RegistryEvent>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<RegistryEvent>) -> Self {
        Self { sender }
    }
}

impl RegistryObserver for ChannelObserver {
    fn on_event(&self, event: &RegistryEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!(event = event.name(), "Event receiver dropped");
        }
    }
}

/// Keeps every event it sees, in delivery order.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<RegistryEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn count(&self, event: &RegistryEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

impl RegistryObserver for EventLog {
    fn on_event(&self, event: &RegistryEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RegistryObserver for TracingObserver {
    fn on_event(&self, event: &RegistryEvent) {
        info!(event = event.name(), "{event}");
    }
}
