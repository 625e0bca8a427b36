//! In-process live event channel.
//!
//! Producers hold an `Arc<dyn EventBus>` handed to them through router state.
//! Consumers call [`EventHub::subscribe`] and join rooms on the returned
//! [`Subscription`].

use crate::event::{Envelope, LiveEvent, Scope};
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Capacity of the fan-out channel. Subscribers further behind than this lag.
const HUB_CAPACITY: usize = 1024;

/// Publishing side of the live channel.
pub trait EventBus: Send + Sync {
    /// Fire-and-forget emit. Returns how many subscribers were connected;
    /// zero is not an error.
    fn emit(&self, scope: Scope, event: LiveEvent) -> usize;
}

/// Broadcast-backed hub shared by every connection of the server.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<Envelope>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    /// Open a subscription with no rooms joined; it sees global events only.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            rooms: HashSet::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for EventHub {
    fn emit(&self, scope: Scope, event: LiveEvent) -> usize {
        debug!(event = event.name(), scope = ?scope, "Emitting live event");
        // No receivers is fine: nobody is watching right now.
        self.tx.send(Envelope { scope, event }).unwrap_or(0)
    }
}

/// One consumer's view of the hub, filtered to global events and joined rooms.
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
    rooms: HashSet<String>,
}

impl Subscription {
    pub fn join(&mut self, room: impl Into<String>) {
        self.rooms.insert(room.into());
    }

    pub fn leave(&mut self, room: &str) {
        self.rooms.remove(room);
    }

    pub fn rooms(&self) -> &HashSet<String> {
        &self.rooms
    }

    /// Whether an envelope is addressed to this subscription.
    pub fn accepts(&self, envelope: &Envelope) -> bool {
        match &envelope.scope {
            Scope::Global => true,
            Scope::Room(room) => self.rooms.contains(room),
        }
    }

    /// Next envelope addressed to this subscription, or `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => {
                    if self.accepts(&envelope) {
                        return Some(envelope);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Subscription lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    error!("Live event hub closed");
                    return None;
                }
            }
        }
    }
}
