//! Typed event registry: who gets told when session data changes.
//!
//! Subscribers register for one [`EventKind`] and get a [`Subscription`]
//! handle back, which is the only way to remove them again.
//!
//! # Dispatch rules
//!
//! - Subscribers fire in registration order.
//! - The subscriber list is snapshotted before the first call, so a
//!   subscriber registered during a dispatch does not see that event, and
//!   one removed during a dispatch still does.
//! - Dispatches of the same kind never interleave across threads. A
//!   subscriber may still dispatch synchronously from inside its own
//!   callback; the per-kind lock is reentrant.
//! - Kinds are independent: dispatching one never waits on another.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arclink_protocol::{CatalogEntry, ItemId, UserProfile};
use parking_lot::{Mutex, ReentrantMutex};

/// The notification kinds the session hub emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LoginStatusChanged,
    UserUpdated,
    InventoryUpdated,
    BalanceUpdated,
    CatalogUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        Self::LoginStatusChanged,
        Self::UserUpdated,
        Self::InventoryUpdated,
        Self::BalanceUpdated,
        Self::CatalogUpdated,
    ];

    fn index(self) -> usize {
        match self {
            Self::LoginStatusChanged => 0,
            Self::UserUpdated => 1,
            Self::InventoryUpdated => 2,
            Self::BalanceUpdated => 3,
            Self::CatalogUpdated => 4,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A notification and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// `true` when the user is now logged in.
    LoginStatusChanged(bool),
    UserUpdated(UserProfile),
    InventoryUpdated(Vec<ItemId>),
    BalanceUpdated(i64),
    CatalogUpdated(Vec<CatalogEntry>),
}

impl HubEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::LoginStatusChanged(_) => EventKind::LoginStatusChanged,
            Self::UserUpdated(_) => EventKind::UserUpdated,
            Self::InventoryUpdated(_) => EventKind::InventoryUpdated,
            Self::BalanceUpdated(_) => EventKind::BalanceUpdated,
            Self::CatalogUpdated(_) => EventKind::CatalogUpdated,
        }
    }
}

type Subscriber = Arc<dyn Fn(&HubEvent) + Send + Sync>;

/// Handle returned by [`EventRegistry::subscribe`]. Pass it to
/// [`EventRegistry::unsubscribe`] to stop receiving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

#[derive(Default)]
struct Channel {
    subscribers: Mutex<Vec<(u64, Subscriber)>>,
    dispatch: ReentrantMutex<()>,
}

/// Ordered subscriber lists, one per [`EventKind`].
pub struct EventRegistry {
    channels: [Channel; 5],
    next_id: AtomicU64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| Channel::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends `subscriber` to the list for `kind`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        subscriber: impl Fn(&HubEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.channel(kind)
            .subscribers
            .lock()
            .push((id, Arc::new(subscriber)));
        tracing::trace!(%kind, id, "subscriber added");
        Subscription { kind, id }
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.channel(subscription.kind).subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription.id);
        before != subscribers.len()
    }

    /// Calls every subscriber of `event.kind()` in registration order.
    pub fn dispatch(&self, event: &HubEvent) {
        let kind = event.kind();
        let channel = self.channel(kind);
        let _serial = channel.dispatch.lock();

        // Snapshot, then release the list lock before calling anyone.
        let snapshot: Vec<Subscriber> = channel
            .subscribers
            .lock()
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();

        tracing::trace!(%kind, subscribers = snapshot.len(), "dispatching event");
        for subscriber in snapshot {
            subscriber(event);
        }
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.channel(kind).subscribers.lock().len()
    }

    fn channel(&self, kind: EventKind) -> &Channel {
        &self.channels[kind.index()]
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
