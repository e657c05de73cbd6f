use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A change to the domain of an integer variable.
///
/// Stronger changes imply the weaker ones: tightening a bound also raises [`Removal`] for the
/// values that fell off, and fixing a variable raises [`Assign`] on top of the bound events.
///
/// [`Removal`]: DomainEvent::Removal
/// [`Assign`]: DomainEvent::Assign
#[derive(EnumSetType, Debug)]
pub enum DomainEvent {
    /// The lower bound of the domain increased.
    LowerBound,
    /// The upper bound of the domain decreased.
    UpperBound,
    /// The domain shrank to a single value.
    Assign,
    /// A value was removed from the inside of the domain.
    Removal,
}

/// A set of [`DomainEvent`]s a propagator can subscribe to.
#[derive(Debug, Copy, Clone)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// DomainEvents with both lower and upper bound tightening (but not other value removal).
    pub const BOUNDS: DomainEvents = DomainEvents::create(enum_set!(
        DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// DomainEvents with lower and upper bound tightening, assigning to a single value, and
    /// single value removal.
    pub const ANY: DomainEvents = DomainEvents::create(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));
    /// DomainEvents with only lower bound tightening.
    pub const LOWER_BOUND: DomainEvents = DomainEvents::create(enum_set!(DomainEvent::LowerBound));
    /// DomainEvents with only upper bound tightening.
    pub const UPPER_BOUND: DomainEvents = DomainEvents::create(enum_set!(DomainEvent::UpperBound));
    /// DomainEvents with only assigning to a single value.
    pub const ASSIGN: DomainEvents = DomainEvents::create(enum_set!(DomainEvent::Assign));

    pub(crate) const fn create(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub(crate) fn events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}
