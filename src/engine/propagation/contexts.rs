use std::ops::Deref;
use std::ops::DerefMut;

use crate::engine::cp::watch_list::Handler;
use crate::engine::cp::watch_list::Subscription;
use crate::engine::cp::watch_list::WatchList;
use crate::engine::cp::Assignments;
use crate::engine::cp::DomainEvents;
use crate::engine::cp::EmptyDomain;
use crate::engine::cp::ReversibleInt;
use crate::engine::cp::ReversibleValues;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;

/// The view through which a propagator handler reads and narrows domains.
///
/// All domain mutations return `Err(EmptyDomain)` when they would wipe out a domain; the handler
/// propagates that to the engine with `?`.
pub struct PropagationContextMut<'a> {
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) reversibles: &'a mut ReversibleValues,
    pub(crate) pending_posts: &'a mut Vec<Box<dyn Propagator>>,
    pub(crate) propagator_id: PropagatorId,
}

impl PropagationContextMut<'_> {
    pub fn lower_bound(&self, variable: DomainId) -> i32 {
        self.assignments.get_lower_bound(variable)
    }

    pub fn upper_bound(&self, variable: DomainId) -> i32 {
        self.assignments.get_upper_bound(variable)
    }

    pub fn is_fixed(&self, variable: DomainId) -> bool {
        self.assignments.is_fixed(variable)
    }

    /// The value of a fixed variable.
    pub fn value(&self, variable: DomainId) -> i32 {
        self.assignments.get_assigned_value(variable)
    }

    pub fn contains(&self, variable: DomainId, value: i32) -> bool {
        self.assignments.contains(variable, value)
    }

    pub fn is_literal_fixed(&self, literal: Literal) -> bool {
        self.assignments.is_fixed(literal.domain_id())
    }

    pub fn is_literal_true(&self, literal: Literal) -> bool {
        self.is_literal_fixed(literal) && self.value(literal.domain_id()) == 1
    }

    pub fn is_literal_false(&self, literal: Literal) -> bool {
        self.is_literal_fixed(literal) && self.value(literal.domain_id()) == 0
    }

    pub fn set_lower_bound(
        &mut self,
        variable: DomainId,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        self.assignments.tighten_lower_bound(variable, bound)
    }

    pub fn set_upper_bound(
        &mut self,
        variable: DomainId,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        self.assignments.tighten_upper_bound(variable, bound)
    }

    pub fn assign(&mut self, variable: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.make_assignment(variable, value)
    }

    pub fn remove(&mut self, variable: DomainId, value: i32) -> Result<(), EmptyDomain> {
        self.assignments.remove_value(variable, value)
    }

    pub fn assign_literal(&mut self, literal: Literal, truth: bool) -> Result<(), EmptyDomain> {
        self.assign(literal.domain_id(), i32::from(truth))
    }

    /// Read a reversible cell.
    pub fn read(&self, cell: ReversibleInt) -> i64 {
        self.reversibles.read(cell)
    }

    /// Write a reversible cell. The old value is restored on backtracking.
    pub fn write(&mut self, cell: ReversibleInt, value: i64) {
        self.reversibles.assign(cell, value)
    }

    /// Post a new propagator to the store.
    ///
    /// The propagator is installed after the current handler returns. Together with returning
    /// [`Status::Success`](crate::Status), this lets a propagator rewrite itself into a simpler
    /// one once part of its constraint has become fixed.
    pub fn post(&mut self, propagator: impl Propagator + 'static) {
        self.pending_posts.push(Box::new(propagator));
    }
}

/// The context handed to [`Propagator::setup`].
///
/// On top of everything a [`PropagationContextMut`] offers, it allows subscribing to domain
/// events and allocating reversible cells.
pub struct SetupContext<'a> {
    pub(crate) base: PropagationContextMut<'a>,
    pub(crate) watch_list: &'a mut WatchList,
}

impl<'a> Deref for SetupContext<'a> {
    type Target = PropagationContextMut<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for SetupContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

impl SetupContext<'_> {
    /// Wake the general [`Propagator::propagate`] handler when one of `events` fires on
    /// `variable`.
    pub fn subscribe(&mut self, variable: DomainId, events: DomainEvents) {
        self.watch(variable, events, Handler::Propagate);
    }

    /// Wake [`Propagator::update_bounds`] when a bound of `variable` changes.
    pub fn subscribe_update_bounds(&mut self, variable: DomainId) {
        self.watch(variable, DomainEvents::BOUNDS, Handler::UpdateBounds);
    }

    /// Wake [`Propagator::update_bounds_with_index`] when a bound of `variable` changes.
    pub fn subscribe_update_bounds_with_index(&mut self, variable: DomainId, index: LocalId) {
        self.watch(
            variable,
            DomainEvents::BOUNDS,
            Handler::UpdateBoundsWithIndex(index),
        );
    }

    /// Wake [`Propagator::val_bind`] when `variable` becomes fixed.
    pub fn subscribe_val_bind(&mut self, variable: DomainId) {
        self.watch(variable, DomainEvents::ASSIGN, Handler::ValBind);
    }

    /// Allocate a new reversible cell holding `initial_value`.
    pub fn new_reversible_int(&mut self, initial_value: i64) -> ReversibleInt {
        self.base.reversibles.grow(initial_value)
    }

    fn watch(&mut self, variable: DomainId, events: DomainEvents, handler: Handler) {
        self.watch_list.watch(
            variable,
            events,
            Subscription {
                propagator_id: self.base.propagator_id,
                handler,
            },
        );
    }
}
