//! Plan event bus implementation.
//!
//! Handlers registered with [`PlanEventBus::subscribe`] run on the publishing
//! thread, in no particular order. A broadcast channel serves async consumers
//! that prefer to poll.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, PlanEvent};

/// Identifies one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.0.simple().to_string();
        write!(f, "sub-{}", &short[..6])
    }
}

/// Which events a handler wants to see.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Any event whose category is listed.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Shorthand for a single category.
    pub fn only(category: EventCategory) -> Self {
        EventFilter::Categories(vec![category])
    }

    pub fn matches(&self, event: &PlanEvent) -> bool {
        let EventFilter::Categories(categories) = self else {
            return true;
        };
        categories.contains(&event.category())
    }
}

/// Tuning for a [`PlanEventBus`].
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Slots in the broadcast channel before slow receivers lag.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Nobody received the event, neither a handler nor a receiver.
    #[error("No active subscribers")]
    NoSubscribers,
}

struct Handler {
    filter: EventFilter,
    callback: Box<dyn Fn(&PlanEvent) + Send + Sync>,
}

#[derive(Default)]
struct Registry {
    handlers: HashMap<SubscriptionId, Handler>,
}

impl Registry {
    fn dispatch(&self, event: &PlanEvent) {
        self.handlers
            .values()
            .filter(|handler| handler.filter.matches(event))
            .for_each(|handler| (handler.callback)(event));
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let removed = self.handlers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription = %id, "unsubscribed");
        }
        removed
    }
}

/// Unsubscribes its handler when dropped.
///
/// Only a weak reference to the bus registry is held, so the guard may
/// outlive the bus.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<RwLock<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.write().remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id).finish()
    }
}

/// Delivers plan model changes to the views observing them.
pub struct PlanEventBus {
    registry: Arc<RwLock<Registry>>,
    sender: broadcast::Sender<PlanEvent>,
    config: EventBusConfig,
}

impl PlanEventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            registry: Arc::default(),
            sender,
            config,
        }
    }

    /// Runs every matching handler, then forwards the event to async
    /// receivers.
    ///
    /// Returns how many receivers got the event. Fails only when no handler
    /// is registered and no receiver is alive.
    pub fn publish(&self, event: PlanEvent) -> Result<usize, EventBusError> {
        let registry = self.registry.read();
        registry.dispatch(&event);
        let has_handlers = !registry.handlers.is_empty();
        drop(registry);

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if has_handlers => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Registers a handler until [`unsubscribe`](Self::unsubscribe) is called.
    ///
    /// The handler must return quickly and must not subscribe or
    /// unsubscribe on this bus.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&PlanEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.registry.write().handlers.insert(
            id,
            Handler {
                filter,
                callback: Box::new(handler),
            },
        );
        tracing::debug!(subscription = %id, "subscribed");
        id
    }

    /// Registers a handler for as long as the returned guard lives.
    pub fn subscribe_scoped<F>(&self, filter: EventFilter, handler: F) -> Subscription
    where
        F: Fn(&PlanEvent) + Send + Sync + 'static,
    {
        Subscription {
            id: self.subscribe(filter, handler),
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn receiver(&self) -> broadcast::Receiver<PlanEvent> {
        self.sender.subscribe()
    }

    /// Returns false when the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.write().remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.read().handlers.len()
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for PlanEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PlanEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanEventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish_non_exhaustive()
    }
}
