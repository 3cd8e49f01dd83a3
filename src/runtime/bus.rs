//! In-process publish/subscribe keyed by event payload type.
//!
//! The bus is a cheap `Rc` handle: the registry owns one and hands clones to
//! every feature at setup, and handlers may capture a clone to publish
//! follow-up events. Everything runs on one logical thread.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// A subscriber callback for events of type `E`.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// Returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    event: TypeId,
    seq: u64,
}

struct Subscriber {
    seq: u64,
    /// Always a `Handler<E>` for the `E` this list is keyed by.
    handler: Box<dyn Any>,
}

#[derive(Default)]
struct BusInner {
    next_seq: u64,
    subscribers: HashMap<TypeId, Vec<Subscriber>>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<E: 'static>(&self, handler: impl Fn(&E) + 'static) -> SubscriptionId {
        self.subscribe_shared(Rc::new(handler))
    }

    /// Subscribe an already shared callback. Subscribing the same `Rc` twice
    /// registers it twice, and it is then delivered twice per publish.
    pub fn subscribe_shared<E: 'static>(&self, handler: Handler<E>) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let event = TypeId::of::<E>();
        inner.subscribers.entry(event).or_default().push(Subscriber {
            seq,
            handler: Box::new(handler),
        });

        SubscriptionId { event, seq }
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.subscribers.get_mut(&id.event) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| s.seq != id.seq);
        before != list.len()
    }

    /// Delivers `event` to every current subscriber, in registration order.
    ///
    /// The subscriber list is snapshotted before the first handler runs, so
    /// handlers can publish, subscribe or unsubscribe freely; changes apply
    /// to the next publish.
    pub fn publish<E: 'static>(&self, event: E) {
        let snapshot: Vec<Handler<E>> = {
            let inner = self.inner.borrow();
            let Some(list) = inner.subscribers.get(&TypeId::of::<E>()) else {
                return;
            };
            list.iter()
                .filter_map(|s| s.handler.downcast_ref::<Handler<E>>().cloned())
                .collect()
        };

        for handler in snapshot {
            handler(&event);
        }
    }

    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// A handle for handlers that publish back into the bus they are
    /// subscribed on; a strong clone captured there would keep the bus alive
    /// forever.
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

#[derive(Clone)]
pub struct WeakEventBus {
    inner: Weak<RefCell<BusInner>>,
}

impl WeakEventBus {
    /// Publishes if the bus still exists; otherwise the event is dropped.
    pub fn publish<E: 'static>(&self, event: E) {
        if let Some(inner) = self.inner.upgrade() {
            EventBus { inner }.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy)]
    struct Ping(u32);

    #[derive(Debug, Clone, Copy)]
    struct Pong;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(Ping(1));
        assert_eq!(bus.subscriber_count::<Ping>(), 0);
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = log.clone();
            bus.subscribe(move |p: &Ping| log.borrow_mut().push((tag, p.0)));
        }

        bus.publish(Ping(7));
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    }

    #[test]
    fn test_events_are_keyed_by_type() {
        let bus = EventBus::new();
        let pings = Rc::new(Cell::new(0));
        let counter = pings.clone();
        bus.subscribe(move |_: &Ping| counter.set(counter.get() + 1));

        bus.publish(Pong);
        assert_eq!(pings.get(), 0);
        bus.publish(Ping(0));
        assert_eq!(pings.get(), 1);
    }

    #[test]
    fn test_same_callback_twice_is_delivered_twice() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handler: Handler<Ping> = Rc::new(move |_: &Ping| counter.set(counter.get() + 1));

        bus.subscribe_shared(handler.clone());
        bus.subscribe_shared(handler);
        bus.publish(Ping(0));

        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_future_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = bus.subscribe(move |_: &Ping| counter.set(counter.get() + 1));

        bus.publish(Ping(0));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id), "second unsubscribe finds nothing");
        bus.publish(Ping(0));

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_publish_keeps_in_flight_delivery() {
        let bus = EventBus::new();
        let late_hits = Rc::new(Cell::new(0));

        // The first handler removes the second one mid-publish.
        let victim: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        {
            let bus_handle = bus.clone();
            let victim = victim.clone();
            bus.subscribe(move |_: &Ping| {
                if let Some(id) = victim.get() {
                    bus_handle.unsubscribe(id);
                }
            });
        }
        let counter = late_hits.clone();
        victim.set(Some(
            bus.subscribe(move |_: &Ping| counter.set(counter.get() + 1)),
        ));

        bus.publish(Ping(0));
        assert_eq!(late_hits.get(), 1, "in-flight publish still reaches it");

        bus.publish(Ping(0));
        assert_eq!(late_hits.get(), 1, "later publishes do not");
    }

    #[test]
    fn test_handlers_can_publish_reentrantly() {
        let bus = EventBus::new();
        let pongs = Rc::new(Cell::new(0));

        let relay = bus.clone();
        bus.subscribe(move |_: &Ping| relay.publish(Pong));
        let counter = pongs.clone();
        bus.subscribe(move |_: &Pong| counter.set(counter.get() + 1));

        bus.publish(Ping(0));
        assert_eq!(pongs.get(), 1);
    }

    #[test]
    fn test_weak_handle_publishes_while_bus_lives() {
        let bus = EventBus::new();
        let pongs = Rc::new(Cell::new(0));
        let counter = pongs.clone();
        bus.subscribe(move |_: &Pong| counter.set(counter.get() + 1));

        let weak = bus.downgrade();
        weak.publish(Pong);
        assert_eq!(pongs.get(), 1);

        drop(bus);
        weak.publish(Pong);
        assert_eq!(pongs.get(), 1);
    }
}
