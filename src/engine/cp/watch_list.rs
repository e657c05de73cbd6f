use crate::containers::KeyedVec;
use crate::engine::cp::DomainEvent;
use crate::engine::cp::DomainEvents;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::DomainId;

/// The handler of a propagator that a subscription targets.
///
/// Besides the general [`Handler::Propagate`] entry point, propagators can register the
/// specialised handlers so the engine calls a cheaper routine when only a bound changed or a
/// variable was fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Handler {
    Propagate,
    UpdateBounds,
    UpdateBoundsWithIndex(LocalId),
    ValBind,
}

/// A single watcher entry: which propagator to wake and through which handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Subscription {
    pub(crate) propagator_id: PropagatorId,
    pub(crate) handler: Handler,
}

/// Used to track which propagators are subscribed to which events on which domains.
#[derive(Default, Debug)]
pub(crate) struct WatchList {
    watchers: KeyedVec<DomainId, Watcher>,
}

#[derive(Default, Debug)]
struct Watcher {
    lower_bound: Vec<Subscription>,
    upper_bound: Vec<Subscription>,
    assign: Vec<Subscription>,
    removal: Vec<Subscription>,
}

impl WatchList {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(Watcher::default());
    }

    pub(crate) fn watch(
        &mut self,
        domain_id: DomainId,
        events: DomainEvents,
        subscription: Subscription,
    ) {
        let watcher = &mut self.watchers[domain_id];

        for event in events.events() {
            let list = match event {
                DomainEvent::LowerBound => &mut watcher.lower_bound,
                DomainEvent::UpperBound => &mut watcher.upper_bound,
                DomainEvent::Assign => &mut watcher.assign,
                DomainEvent::Removal => &mut watcher.removal,
            };

            if !list.contains(&subscription) {
                list.push(subscription);
            }
        }
    }

    pub(crate) fn subscriptions(&self, domain_id: DomainId, event: DomainEvent) -> &[Subscription] {
        let watcher = &self.watchers[domain_id];

        match event {
            DomainEvent::LowerBound => &watcher.lower_bound,
            DomainEvent::UpperBound => &watcher.upper_bound,
            DomainEvent::Assign => &watcher.assign,
            DomainEvent::Removal => &watcher.removal,
        }
    }
}
