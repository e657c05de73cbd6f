pub(crate) mod assignments;
mod domain_events;
pub(crate) mod event_sink;
pub(crate) mod propagator_queue;
pub(crate) mod reversible;
pub(crate) mod watch_list;

pub use assignments::EmptyDomain;
pub(crate) use assignments::Assignments;
pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub use reversible::ReversibleInt;
pub(crate) use reversible::ReversibleValues;
