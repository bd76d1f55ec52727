//! # Bound change events
//!
//! Constraints subscribe to bound changes of the variables they watch. Subscriptions are tokens
//! that have to be handed back to the registry that created them; dropping one without releasing
//! it is a bug that fails an assertion in debug builds.
//!
//! Events are not delivered through callbacks. Instead, the registry sorts them into one inbox per
//! constraint handler, which the handler drains before it looks at its event maintained state.
use std::mem;
use std::thread;

use enum_map::EnumMap;
use log::trace;
use rustc_hash::FxHashMap;

use crate::data::problem::history::{BoundEvent, ConstraintId, EventKind, HandlerKind};
use crate::data::problem::VariableId;

/// Set of event kinds.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EventMask(EnumMap<EventKind, bool>);

impl EventMask {
    /// Mask containing the given kinds.
    pub fn of(kinds: &[EventKind]) -> Self {
        let mut mask = Self::default();
        for &kind in kinds {
            mask.0[kind] = true;
        }
        mask
    }

    /// Mask containing all kinds.
    pub fn all() -> Self {
        Self(EnumMap::from_fn(|_| true))
    }

    /// Whether a kind is in the mask.
    pub fn contains(self, kind: EventKind) -> bool {
        self.0[kind]
    }
}

/// Proof of a subscription, to be handed back with `EventRegistry::release`.
#[must_use = "subscriptions have to be released through the event registry"]
#[derive(Debug, Eq, PartialEq)]
pub struct Subscription {
    id: u64,
    variable: VariableId,
    released: bool,
}

impl Subscription {
    /// Variable that is watched.
    pub fn variable(&self) -> VariableId {
        self.variable
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug_assert!(
            self.released || thread::panicking(),
            "subscription to {} dropped without release",
            self.variable,
        );
    }
}

/// An event for a specific constraint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Delivery {
    /// Constraint that subscribed.
    pub constraint: ConstraintId,
    /// What happened.
    pub event: BoundEvent,
    subscription: u64,
}

#[derive(Debug)]
struct Subscriber {
    id: u64,
    mask: EventMask,
    handler: HandlerKind,
    constraint: ConstraintId,
}

/// Registry of all subscriptions.
#[derive(Debug, Default)]
pub struct EventRegistry {
    subscribers: FxHashMap<VariableId, Vec<Subscriber>>,
    inboxes: EnumMap<HandlerKind, Vec<Delivery>>,
    next_id: u64,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a constraint to bound changes of a variable.
    ///
    /// # Arguments
    ///
    /// * `variable`: Variable to watch.
    /// * `mask`: Kinds of bound changes that are of interest.
    /// * `handler`: Handler whose inbox receives the deliveries.
    /// * `constraint`: Constraint that is attached to the deliveries.
    ///
    /// # Return value
    ///
    /// A token that has to be given back with `release`.
    pub fn catch(
        &mut self,
        variable: VariableId,
        mask: EventMask,
        handler: HandlerKind,
        constraint: ConstraintId,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;

        self.subscribers.entry(variable).or_default().push(Subscriber { id, mask, handler, constraint, });
        trace!("{} {} catches events of {}", handler.name(), constraint, variable);

        Subscription { id, variable, released: false, }
    }

    /// End a subscription.
    ///
    /// Deliveries of this subscription that were not yet taken from the inbox are discarded.
    pub fn release(&mut self, mut subscription: Subscription) {
        if let Some(subscribers) = self.subscribers.get_mut(&subscription.variable) {
            if let Some(position) = subscribers.iter().position(|s| s.id == subscription.id) {
                let subscriber = subscribers.swap_remove(position);
                self.inboxes[subscriber.handler].retain(|delivery| delivery.subscription != subscription.id);
            }
            if subscribers.is_empty() {
                self.subscribers.remove(&subscription.variable);
            }
        }

        subscription.released = true;
    }

    /// Sort events into the inboxes of the subscribed handlers.
    pub fn dispatch(&mut self, events: impl IntoIterator<Item = BoundEvent>) {
        for event in events {
            if let Some(subscribers) = self.subscribers.get(&event.variable) {
                for subscriber in subscribers.iter().filter(|s| s.mask.contains(event.kind)) {
                    self.inboxes[subscriber.handler].push(Delivery {
                        constraint: subscriber.constraint,
                        event,
                        subscription: subscriber.id,
                    });
                }
            }
        }
    }

    /// Take all deliveries for a handler.
    pub fn take(&mut self, handler: HandlerKind) -> Vec<Delivery> {
        mem::take(&mut self.inboxes[handler])
    }

    /// Number of active subscriptions.
    pub fn nr_subscriptions(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    /// Number of active subscriptions on a variable.
    pub fn nr_subscriptions_of(&self, variable: VariableId) -> usize {
        self.subscribers.get(&variable).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::propagation::event::{EventMask, EventRegistry};
    use crate::data::problem::history::{BoundEvent, ConstraintId, EventKind, HandlerKind};
    use crate::data::problem::VariableId;

    fn event(variable: usize, kind: EventKind) -> BoundEvent {
        BoundEvent { variable: VariableId(variable), kind, old: 1f64, new: 0f64, }
    }

    #[test]
    fn mask() {
        let mask = EventMask::of(&[EventKind::UpperTightened, EventKind::LowerRelaxed]);
        assert!(mask.contains(EventKind::UpperTightened));
        assert!(!mask.contains(EventKind::LowerTightened));
        assert!(EventMask::all().contains(EventKind::UpperRelaxed));
    }

    #[test]
    fn deliveries_follow_masks_and_handlers() {
        let mut registry = EventRegistry::new();
        let first = registry.catch(VariableId(0), EventMask::of(&[EventKind::UpperTightened]), HandlerKind::LogicOr, ConstraintId(3));
        let second = registry.catch(VariableId(0), EventMask::all(), HandlerKind::Linking, ConstraintId(1));
        assert_eq!(registry.nr_subscriptions(), 2);

        registry.dispatch(vec![event(0, EventKind::UpperTightened), event(0, EventKind::LowerTightened), event(1, EventKind::UpperTightened)]);
        let logicor = registry.take(HandlerKind::LogicOr);
        assert_eq!(logicor.len(), 1);
        assert_eq!(logicor[0].constraint, ConstraintId(3));
        assert_eq!(registry.take(HandlerKind::Linking).len(), 2);
        assert!(registry.take(HandlerKind::Linking).is_empty());

        registry.release(first);
        registry.release(second);
        assert_eq!(registry.nr_subscriptions(), 0);
    }

    #[test]
    fn release_purges_undelivered() {
        let mut registry = EventRegistry::new();
        let subscription = registry.catch(VariableId(2), EventMask::all(), HandlerKind::Linking, ConstraintId(0));
        let other = registry.catch(VariableId(3), EventMask::all(), HandlerKind::Linking, ConstraintId(0));
        registry.dispatch(vec![event(2, EventKind::UpperTightened), event(3, EventKind::UpperTightened)]);

        registry.release(subscription);
        let deliveries = registry.take(HandlerKind::Linking);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].event.variable, VariableId(3));
        assert_eq!(registry.nr_subscriptions_of(VariableId(2)), 0);

        registry.release(other);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn unreleased_subscription() {
        let mut registry = EventRegistry::new();
        let _subscription = registry.catch(VariableId(0), EventMask::all(), HandlerKind::Linking, ConstraintId(0));
    }
}
