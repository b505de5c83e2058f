//! Process-wide publish/subscribe for cross-screen signals.
//!
//! Replaces the "assign a callback into a shared struct" pattern: any number
//! of owners can subscribe per event type, and publishing invokes them
//! synchronously in subscription order. A subscription lives until its handle
//! is dropped or `unsubscribe`d — tearing it down before the owner goes away
//! is the owner's job, the bus never knows who is still alive.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::state::HiddenNftMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    UnsavePost,
    ToggleHideNfts,
    FocusSearchHeader,
    ToggleProfileManager,
}

/// Cross-screen signals. Payloads are plain data; nothing here fetches.
#[derive(Clone, Debug)]
pub enum AppEvent {
    UnsavePost { post_hash_hex: String },
    ToggleHideNfts { mode: HiddenNftMode },
    FocusSearchHeader { focused: bool },
    ToggleProfileManager { visible: bool },
}

impl AppEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            AppEvent::UnsavePost { .. } => EventType::UnsavePost,
            AppEvent::ToggleHideNfts { .. } => EventType::ToggleHideNfts,
            AppEvent::FocusSearchHeader { .. } => EventType::FocusSearchHeader,
            AppEvent::ToggleProfileManager { .. } => EventType::ToggleProfileManager,
        }
    }
}

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<HashMap<EventType, Vec<(Uuid, Handler)>>>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe<F>(self: &Arc<Self>, event_type: EventType, handler: F) -> EventSubscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.subscribers
            .lock()
            .entry(event_type)
            .or_default()
            .push((id, Arc::new(handler)));
        EventSubscription {
            bus: Arc::downgrade(self),
            event_type,
            id,
        }
    }

    /// Invoke every current subscriber for the event's type, in subscription
    /// order, on the calling thread.
    pub fn publish(&self, event: &AppEvent) {
        // Snapshot outside the lock so handlers may subscribe/unsubscribe.
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .get(&event.event_type())
            .map(|subs| subs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(event);
        }
    }

    fn remove(&self, event_type: EventType, id: Uuid) {
        let mut subscribers = self.subscribers.lock();
        if let Some(subs) = subscribers.get_mut(&event_type) {
            subs.retain(|(sub_id, _)| *sub_id != id);
            if subs.is_empty() {
                subscribers.remove(&event_type);
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers
            .lock()
            .get(&event_type)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }
}

/// Handle returned by [`EventBus::subscribe`]; removes the subscription when
/// dropped.
pub struct EventSubscription {
    bus: Weak<EventBus>,
    event_type: EventType,
    id: Uuid,
}

impl EventSubscription {
    /// Eagerly remove the subscription instead of waiting for drop.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.event_type, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            bus.subscribe(EventType::FocusSearchHeader, move |_| {
                seen.lock().unwrap().push("first");
            })
        };
        let second = {
            let seen = seen.clone();
            bus.subscribe(EventType::FocusSearchHeader, move |_| {
                seen.lock().unwrap().push("second");
            })
        };

        bus.publish(&AppEvent::FocusSearchHeader { focused: true });
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
        drop((first, second));
    }

    #[test]
    fn publish_only_reaches_matching_event_type() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let hits = hits.clone();
            bus.subscribe(EventType::UnsavePost, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        bus.publish(&AppEvent::ToggleProfileManager { visible: true });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        bus.publish(&AppEvent::UnsavePost {
            post_hash_hex: "abc".into(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_handle_unsubscribes() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = {
            let hits = hits.clone();
            bus.subscribe(EventType::UnsavePost, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(bus.subscriber_count(EventType::UnsavePost), 1);

        sub.unsubscribe();
        assert_eq!(bus.subscriber_count(EventType::UnsavePost), 0);
        bus.publish(&AppEvent::UnsavePost {
            post_hash_hex: "abc".into(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_may_unsubscribe_another_during_publish() {
        // Snapshot semantics: the current publish still sees both handlers,
        // the next one does not.
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<StdMutex<Option<EventSubscription>>> = Arc::new(StdMutex::new(None));

        let victim = {
            let hits = hits.clone();
            bus.subscribe(EventType::UnsavePost, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        *slot.lock().unwrap() = Some(victim);

        let _killer = {
            let slot = slot.clone();
            bus.subscribe(EventType::UnsavePost, move |_| {
                slot.lock().unwrap().take();
            })
        };

        let event = AppEvent::UnsavePost {
            post_hash_hex: "abc".into(),
        };
        bus.publish(&event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        bus.publish(&event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
