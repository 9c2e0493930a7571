/// Event bus for pub/sub messaging
///
/// Allows any number of producers (trigger zones, scripted calls, scene
/// loaders) to broadcast audio events to all subscribers without direct
/// coupling. Every subscriber receives every published event.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use super::events::AudioEvent;

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

/// Event subscriber
struct Subscriber {
    id: SubscriberId,
    sender: Sender<AudioEvent>,
}

/// Event bus for broadcasting audio events to subscribers
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<AudioEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender: tx });

        (rx, id)
    }

    /// Unsubscribe from events. No-op if the id is not registered.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers, returning how many received it
    pub fn publish(&self, event: AudioEvent) -> usize {
        let subscribers = self.subscribers.read();
        let mut delivered = 0;

        for subscriber in subscribers.iter() {
            // A failed send means the receiver was dropped; skip it
            if subscriber.sender.try_send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        tracing::trace!("Published {} to {} subscriber(s)", event.description(), delivered);
        delivered
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Clear all subscribers
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_subscribe() {
        let bus = EventBus::new();
        let (_rx, _id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_event_bus_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let (_rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);

        // Unsubscribing an id that is gone is a no-op
        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_bus_publish() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();

        let delivered = bus.publish(AudioEvent::EnterSting);

        assert_eq!(delivered, 1);
        assert_eq!(rx.try_recv().unwrap(), AudioEvent::EnterSting);
    }

    #[test]
    fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new();
        let (rx1, _id1) = bus.subscribe();
        let (rx2, _id2) = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.publish(AudioEvent::ExitSting), 2);

        assert_eq!(rx1.try_recv().unwrap(), AudioEvent::ExitSting);
        assert_eq!(rx2.try_recv().unwrap(), AudioEvent::ExitSting);
    }

    #[test]
    fn test_event_bus_dropped_receiver_does_not_block_publish() {
        let bus = EventBus::new();
        let (rx1, _id1) = bus.subscribe();
        let (rx2, _id2) = bus.subscribe();
        drop(rx1);

        assert_eq!(bus.publish(AudioEvent::EnterSting), 1);
        assert_eq!(rx2.try_recv().unwrap(), AudioEvent::EnterSting);
    }

    #[test]
    fn test_event_bus_clear() {
        let bus = EventBus::new();
        let (_rx1, _id1) = bus.subscribe();
        let (_rx2, _id2) = bus.subscribe();

        bus.clear();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(AudioEvent::EnterSting), 0);
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let (rx, _id) = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);

        bus2.publish(AudioEvent::EnterSting);
        assert_eq!(rx.try_recv().unwrap(), AudioEvent::EnterSting);
    }
}
