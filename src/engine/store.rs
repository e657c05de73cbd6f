use log::debug;
use log::trace;
use log::warn;

use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Failure;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Status;
use crate::containers::KeyedVec;
use crate::engine::cp::propagator_queue::PropagatorQueue;
use crate::engine::cp::propagator_queue::WakeUp;
use crate::engine::cp::watch_list::Handler;
use crate::engine::cp::watch_list::WatchList;
use crate::engine::cp::Assignments;
use crate::engine::cp::DomainEvent;
use crate::engine::cp::EmptyDomain;
use crate::engine::cp::ReversibleInt;
use crate::engine::cp::ReversibleValues;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStrength;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::SetupContext;
use crate::engine::variable_names::VariableNames;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::marrow_assert_eq_simple;
use crate::marrow_assert_simple;

/// A token identifying a state pushed with [`Store::push_state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// The constraint store: variables, their reversible domains, and the propagators that filter
/// them.
///
/// The store is the facade through which a search procedure interacts with the propagation
/// engine. It creates variables, posts constraints, narrows domains, runs propagation to
/// fixpoint, and saves and restores state while exploring a search tree.
///
/// Once a contradiction is found the store is failed; every operation besides
/// [`Store::restore_state`] is then rejected until the offending state is rolled back.
#[derive(Default)]
pub struct Store {
    assignments: Assignments,
    reversibles: ReversibleValues,
    watch_list: WatchList,
    queue: PropagatorQueue,
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
    /// Per propagator, the reversible flag which tracks whether it is active. Deactivation is
    /// journaled, so a propagator that succeeded becomes active again on backtracking, and one
    /// posted below a checkpoint goes dormant when that checkpoint is restored.
    active: KeyedVec<PropagatorId, ReversibleInt>,
    /// Propagators posted from within a running propagator, installed when the current handler
    /// returns.
    pending_posts: Vec<Box<dyn Propagator>>,
    variable_names: VariableNames,
    failed: bool,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("num_variables", &self.assignments.num_domains())
            .field("num_propagators", &self.propagators.len())
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Create an integer variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_bounded_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        let domain_id = self.assignments.grow(lower_bound, upper_bound);
        self.watch_list.grow();
        domain_id
    }

    /// Create an integer variable whose domain holds exactly the given values. The domain can
    /// develop holes, unlike the interval domain of [`Store::new_bounded_variable`].
    pub fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        let domain_id = self.assignments.grow_sparse(values);
        self.watch_list.grow();
        domain_id
    }

    /// Create a boolean variable, backed by a 0-1 integer domain.
    pub fn new_literal(&mut self) -> Literal {
        Literal::new(self.new_bounded_variable(0, 1))
    }

    pub fn new_bounded_variable_named(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl Into<String>,
    ) -> DomainId {
        let domain_id = self.new_bounded_variable(lower_bound, upper_bound);
        self.variable_names.add_integer(domain_id, name.into());
        domain_id
    }

    pub fn new_sparse_variable_named(&mut self, values: &[i32], name: impl Into<String>) -> DomainId {
        let domain_id = self.new_sparse_variable(values);
        self.variable_names.add_integer(domain_id, name.into());
        domain_id
    }

    pub fn new_literal_named(&mut self, name: impl Into<String>) -> Literal {
        let literal = self.new_literal();
        self.variable_names
            .add_integer(literal.domain_id(), name.into());
        literal
    }

    /// The name given to the variable at creation, if any.
    pub fn variable_name(&self, domain_id: DomainId) -> Option<&str> {
        self.variable_names.get_int_name(domain_id)
    }

    /// Look up a variable by the name given at creation.
    pub fn variable_by_name(&self, name: &str) -> Option<DomainId> {
        self.variable_names.get_domain_by_name(name)
    }

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

    /// Whether a contradiction was found since the last restore.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Raise the lower bound of `variable`, typically as a search decision. The change is not
    /// propagated until [`Store::propagate`] is called.
    pub fn set_lower_bound(&mut self, variable: DomainId, bound: i32) -> Result<(), Failure> {
        self.narrow(|assignments| assignments.tighten_lower_bound(variable, bound))
    }

    /// Lower the upper bound of `variable`.
    pub fn set_upper_bound(&mut self, variable: DomainId, bound: i32) -> Result<(), Failure> {
        self.narrow(|assignments| assignments.tighten_upper_bound(variable, bound))
    }

    /// Fix `variable` to `value`.
    pub fn assign(&mut self, variable: DomainId, value: i32) -> Result<(), Failure> {
        self.narrow(|assignments| assignments.make_assignment(variable, value))
    }

    /// Remove `value` from the domain of `variable`.
    pub fn remove(&mut self, variable: DomainId, value: i32) -> Result<(), Failure> {
        self.narrow(|assignments| assignments.remove_value(variable, value))
    }

    /// Fix a literal to the given truth value.
    pub fn assign_literal(&mut self, literal: Literal, truth: bool) -> Result<(), Failure> {
        self.assign(literal.domain_id(), i32::from(truth))
    }

    fn narrow(
        &mut self,
        operation: impl FnOnce(&mut Assignments) -> Result<(), EmptyDomain>,
    ) -> Result<(), Failure> {
        if self.failed {
            return Err(Failure);
        }

        match operation(&mut self.assignments) {
            Ok(()) => Ok(()),
            Err(EmptyDomain) => {
                self.fail_current_branch();
                Err(Failure)
            }
        }
    }

    /// Save the current state, so that it can later be restored with [`Store::restore_state`].
    pub fn push_state(&mut self) -> Checkpoint {
        marrow_assert_eq_simple!(
            self.assignments.get_checkpoint(),
            self.reversibles.get_checkpoint()
        );

        let checkpoint = Checkpoint(self.assignments.get_checkpoint());
        self.assignments.new_checkpoint();
        self.reversibles.new_checkpoint();
        checkpoint
    }

    /// Restore the state saved by [`Store::push_state`], undoing all domain changes, reversible
    /// writes, and propagator deactivations made since. This also clears a failure.
    pub fn restore_state(&mut self, checkpoint: Checkpoint) {
        marrow_assert_simple!(checkpoint.0 < self.assignments.get_checkpoint());

        self.queue.clear();
        self.pending_posts.clear();
        self.assignments.synchronise(checkpoint.0);
        self.reversibles.synchronise(checkpoint.0);
        self.failed = false;
    }

    /// Post a constraint and propagate to fixpoint.
    pub fn post(&mut self, propagator: impl Propagator + 'static) -> Result<(), Failure> {
        self.post_with_strength(propagator, PropagationStrength::default())
    }

    /// Post a constraint with an explicit [`PropagationStrength`] hint and propagate to
    /// fixpoint.
    pub fn post_with_strength(
        &mut self,
        propagator: impl Propagator + 'static,
        strength: PropagationStrength,
    ) -> Result<(), Failure> {
        if self.failed {
            warn!(
                "Attempt to post {} to a store that is already failed",
                propagator.name()
            );
            return Err(Failure);
        }

        let result = self
            .install(Box::new(propagator), strength)
            .and_then(|_| self.propagate_to_fixpoint());

        if result.is_err() {
            self.fail_current_branch();
        }
        result
    }

    /// Post a constraint, mapping the outcome to a [`ConstraintOperationError`].
    pub fn add_constraint(
        &mut self,
        propagator: impl Propagator + 'static,
    ) -> Result<(), ConstraintOperationError> {
        if self.failed {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        self.post(propagator)
            .map_err(|_| ConstraintOperationError::InfeasiblePropagator)
    }

    /// Run the propagators to fixpoint on the changes made since the last propagation.
    pub fn propagate(&mut self) -> Result<(), Failure> {
        if self.failed {
            return Err(Failure);
        }

        let result = self.propagate_to_fixpoint();
        if result.is_err() {
            self.fail_current_branch();
        }
        result
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn propagator_ids(&self) -> impl Iterator<Item = PropagatorId> {
        self.propagators.keys()
    }

    /// Whether the propagator can still be woken in the current state. Propagators are
    /// deactivated when they report entailment and reactivated by backtracking.
    pub fn is_propagator_active(&self, propagator_id: PropagatorId) -> bool {
        self.reversibles.read(self.active[propagator_id]) == 1
    }

    pub fn propagator(&self, propagator_id: PropagatorId) -> &dyn Propagator {
        self.propagators[propagator_id].as_ref()
    }

    fn install(
        &mut self,
        propagator: Box<dyn Propagator>,
        strength: PropagationStrength,
    ) -> Result<(), Failure> {
        let propagator_id = self.propagators.push(propagator);

        let active_flag = self.reversibles.grow(0);
        self.reversibles.assign(active_flag, 1);
        let flag_id = self.active.push(active_flag);
        marrow_assert_eq_simple!(propagator_id, flag_id);

        debug!(
            "Posting {} as {propagator_id}",
            self.propagators[propagator_id].name()
        );

        let Store {
            assignments,
            reversibles,
            watch_list,
            propagators,
            pending_posts,
            ..
        } = self;

        let propagator = &mut propagators[propagator_id];
        let mut context = SetupContext {
            base: PropagationContextMut {
                assignments,
                reversibles,
                pending_posts,
                propagator_id,
            },
            watch_list,
        };

        match propagator.setup(&mut context, strength)? {
            Status::Success => self.deactivate(propagator_id),
            Status::Suspend => {}
        }

        Ok(())
    }

    fn propagate_to_fixpoint(&mut self) -> Result<(), Failure> {
        loop {
            self.drain_pending_posts()?;
            self.notify_propagators();

            let Some(wake_up) = self.queue.pop() else {
                if self.pending_posts.is_empty() {
                    break;
                }
                continue;
            };

            if !self.is_propagator_active(wake_up.propagator_id) {
                continue;
            }

            trace!(
                "Waking {} ({:?}) for {}",
                self.propagators[wake_up.propagator_id].name(),
                wake_up.handler,
                wake_up.domain_id
            );

            match self.dispatch(wake_up)? {
                Status::Success => self.deactivate(wake_up.propagator_id),
                Status::Suspend => {}
            }
        }

        Ok(())
    }

    fn drain_pending_posts(&mut self) -> Result<(), Failure> {
        while !self.pending_posts.is_empty() {
            let pending = std::mem::take(&mut self.pending_posts);
            for propagator in pending {
                self.install(propagator, PropagationStrength::default())?;
            }
        }
        Ok(())
    }

    /// Turn the domain events gathered since the last call into wake-ups for the subscribed
    /// propagators.
    fn notify_propagators(&mut self) {
        let Store {
            assignments,
            reversibles,
            watch_list,
            queue,
            active,
            ..
        } = self;

        for (event, domain_id) in assignments.drain_domain_events() {
            let mut wake_list = |event: DomainEvent| {
                for subscription in watch_list.subscriptions(domain_id, event) {
                    if reversibles.read(active[subscription.propagator_id]) == 1 {
                        queue.enqueue(WakeUp {
                            propagator_id: subscription.propagator_id,
                            handler: subscription.handler,
                            domain_id,
                        });
                    }
                }
            };

            wake_list(event);

            // Fixing a variable subsumes tightening both of its bounds, so an assignment also
            // wakes the bound watchers. The queue drops the duplicates.
            if event == DomainEvent::Assign {
                wake_list(DomainEvent::LowerBound);
                wake_list(DomainEvent::UpperBound);
            }
        }
    }

    fn dispatch(&mut self, wake_up: WakeUp) -> PropagationStatus {
        let Store {
            assignments,
            reversibles,
            propagators,
            pending_posts,
            ..
        } = self;

        let propagator = &mut propagators[wake_up.propagator_id];
        let mut context = PropagationContextMut {
            assignments,
            reversibles,
            pending_posts,
            propagator_id: wake_up.propagator_id,
        };

        match wake_up.handler {
            Handler::Propagate => propagator.propagate(&mut context),
            Handler::UpdateBounds => propagator.update_bounds(&mut context, wake_up.domain_id),
            Handler::UpdateBoundsWithIndex(index) => {
                propagator.update_bounds_with_index(&mut context, wake_up.domain_id, index)
            }
            Handler::ValBind => propagator.val_bind(&mut context, wake_up.domain_id),
        }
    }

    fn deactivate(&mut self, propagator_id: PropagatorId) {
        self.reversibles.assign(self.active[propagator_id], 0);
    }

    fn fail_current_branch(&mut self) {
        debug!("The current branch has failed");

        self.failed = true;
        self.queue.clear();
        self.pending_posts.clear();
        self.assignments.clear_events();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::cp::DomainEvents;
    use crate::propagators::GreaterThan;

    /// Counts how often its propagate handler runs, to observe the engine's scheduling.
    struct CountingPropagator {
        variable: Option<DomainId>,
        propagations: Rc<Cell<usize>>,
    }

    impl Propagator for CountingPropagator {
        fn name(&self) -> &str {
            "Counting"
        }

        fn setup(
            &mut self,
            context: &mut SetupContext<'_>,
            _: PropagationStrength,
        ) -> PropagationStatus {
            if let Some(variable) = self.variable {
                context.subscribe(variable, DomainEvents::ANY);
            }
            Ok(Status::Suspend)
        }

        fn propagate(&mut self, _: &mut PropagationContextMut<'_>) -> PropagationStatus {
            self.propagations.set(self.propagations.get() + 1);
            Ok(Status::Suspend)
        }
    }

    #[test]
    fn posting_a_constraint_filters_immediately() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 10);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");

        assert_eq!(store.lower_bound(x), 1);
        assert_eq!(store.upper_bound(y), 9);
    }

    #[test]
    fn propagation_runs_to_fixpoint_across_propagators() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 10);
        let z = store.new_bounded_variable(0, 10);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");
        store.post(GreaterThan::new(y, z)).expect("satisfiable");

        store.set_lower_bound(z, 5).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert_eq!(store.lower_bound(y), 6);
        assert_eq!(store.lower_bound(x), 7);
    }

    #[test]
    fn a_contradiction_fails_the_store() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 5);
        let y = store.new_bounded_variable(0, 5);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");

        store.set_upper_bound(x, 3).expect("satisfiable");
        store.set_lower_bound(y, 3).expect("satisfiable");

        assert_eq!(store.propagate(), Err(Failure));
        assert!(store.is_failed());
    }

    #[test]
    fn a_failed_store_rejects_further_operations() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 5);
        let y = store.new_bounded_variable(0, 5);

        let _ = store.assign(x, 0);
        assert_eq!(store.propagate(), Ok(()));

        assert_eq!(store.set_lower_bound(x, 6), Err(Failure));
        assert!(store.is_failed());

        assert_eq!(store.set_lower_bound(y, 1), Err(Failure));
        assert_eq!(store.post(GreaterThan::new(x, y)), Err(Failure));
        assert_eq!(
            store.add_constraint(GreaterThan::new(x, y)),
            Err(ConstraintOperationError::InfeasibleState)
        );
    }

    #[test]
    fn add_constraint_reports_an_infeasible_propagator() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 5);
        let y = store.new_bounded_variable(5, 10);

        assert_eq!(
            store.add_constraint(GreaterThan::new(x, y)),
            Err(ConstraintOperationError::InfeasiblePropagator)
        );
    }

    #[test]
    fn restoring_a_state_undoes_propagation_and_clears_failure() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 10);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");

        let checkpoint = store.push_state();

        store.set_lower_bound(y, 9).expect("satisfiable");
        assert_eq!(store.propagate(), Ok(()));
        assert_eq!(store.lower_bound(x), 10);

        assert_eq!(store.set_upper_bound(x, 9), Err(Failure));
        assert!(store.is_failed());

        store.restore_state(checkpoint);

        assert!(!store.is_failed());
        assert_eq!(store.lower_bound(x), 1);
        assert_eq!(store.lower_bound(y), 0);
        assert_eq!(store.upper_bound(x), 10);
    }

    #[test]
    fn restoring_a_state_restores_sparse_holes() {
        let mut store = Store::new();
        let x = store.new_sparse_variable(&[1, 3, 5, 7]);

        let checkpoint = store.push_state();

        store.remove(x, 3).expect("satisfiable");
        store.set_upper_bound(x, 5).expect("satisfiable");
        assert!(!store.contains(x, 3));
        assert_eq!(store.upper_bound(x), 5);

        store.restore_state(checkpoint);

        assert!(store.contains(x, 3));
        assert_eq!(store.upper_bound(x), 7);
        assert!(!store.contains(x, 2));
    }

    #[test]
    fn an_entailed_propagator_is_deactivated() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 20);
        let y = store.new_bounded_variable(0, 10);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");
        let greater_than = store.propagator_ids().next().expect("posted");

        // Raising lb(x) does not wake the propagator; the next wake-up observes lb(x) > ub(y)
        // and reports entailment.
        store.set_lower_bound(x, 15).expect("satisfiable");
        store.set_lower_bound(y, 1).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert!(!store.is_propagator_active(greater_than));
    }

    #[test]
    fn backtracking_reactivates_an_entailed_propagator() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 20);
        let y = store.new_bounded_variable(0, 10);

        store.post(GreaterThan::new(x, y)).expect("satisfiable");
        let greater_than = store.propagator_ids().next().expect("posted");

        let checkpoint = store.push_state();
        store.set_lower_bound(x, 15).expect("satisfiable");
        store.set_lower_bound(y, 1).expect("satisfiable");
        store.propagate().expect("satisfiable");
        assert!(!store.is_propagator_active(greater_than));

        store.restore_state(checkpoint);
        assert!(store.is_propagator_active(greater_than));
    }

    #[test]
    fn a_propagator_posted_below_a_checkpoint_goes_dormant_on_rollback() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 10);

        let checkpoint = store.push_state();
        store.post(GreaterThan::new(x, y)).expect("satisfiable");
        let greater_than = store.propagator_ids().next().expect("posted");
        assert!(store.is_propagator_active(greater_than));

        store.restore_state(checkpoint);
        assert!(!store.is_propagator_active(greater_than));
    }

    #[test]
    fn duplicate_events_wake_a_propagator_once_per_episode() {
        let propagations = Rc::new(Cell::new(0));
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);

        store
            .post(CountingPropagator {
                variable: Some(x),
                propagations: Rc::clone(&propagations),
            })
            .expect("satisfiable");

        store.set_lower_bound(x, 2).expect("satisfiable");
        store.set_lower_bound(x, 4).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert_eq!(propagations.get(), 1);
    }

    #[test]
    fn named_variables_can_be_looked_up() {
        let mut store = Store::new();
        let x = store.new_bounded_variable_named(0, 10, "x");
        let b = store.new_literal_named("b");

        assert_eq!(store.variable_name(x), Some("x"));
        assert_eq!(store.variable_by_name("x"), Some(x));
        assert_eq!(store.variable_name(b.domain_id()), Some("b"));
        assert_eq!(store.variable_name(DomainId::new(5)), None);
    }
}
