use itertools::Itertools;
use itertools::MinMaxResult;

use crate::basic_types::trail::Trail;
use crate::containers::KeyedVec;
use crate::engine::cp::event_sink::EventSink;
use crate::engine::cp::DomainEvent;
use crate::engine::variables::DomainId;
use crate::marrow_assert_moderate;
use crate::marrow_assert_simple;

/// The reversible integer domains of all variables, together with the trail which allows undoing
/// the changes made since a checkpoint.
///
/// All domain narrowing goes through this structure so that every change is journaled on the
/// trail and captured as a [`DomainEvent`] for the propagation engine.
#[derive(Default, Debug)]
pub(crate) struct Assignments {
    trail: Trail<TrailEntry>,
    domains: KeyedVec<DomainId, IntegerDomain>,
    events: EventSink,
}

/// A domain operation failed because it would leave the domain without any values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

#[derive(Clone, Copy, Debug)]
struct TrailEntry {
    domain_id: DomainId,
    old_lower_bound: i32,
    old_upper_bound: i32,
    /// Set when the entry journals the removal of a value from a sparse domain.
    removed_value: Option<i32>,
}

impl Assignments {
    /// Create a new integer variable with the domain `[lower_bound, upper_bound]`.
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        marrow_assert_simple!(lower_bound <= upper_bound);

        self.events.grow();
        self.domains
            .push(IntegerDomain::interval(lower_bound, upper_bound))
    }

    /// Create a new integer variable whose domain holds exactly the given values.
    pub(crate) fn grow_sparse(&mut self, values: &[i32]) -> DomainId {
        marrow_assert_simple!(!values.is_empty());

        self.events.grow();
        self.domains.push(IntegerDomain::sparse(values))
    }

    pub(crate) fn num_domains(&self) -> u32 {
        self.domains.len() as u32
    }

    pub(crate) fn get_lower_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].lower_bound
    }

    pub(crate) fn get_upper_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].upper_bound
    }

    pub(crate) fn is_fixed(&self, domain_id: DomainId) -> bool {
        let domain = &self.domains[domain_id];
        domain.lower_bound == domain.upper_bound
    }

    pub(crate) fn get_assigned_value(&self, domain_id: DomainId) -> i32 {
        marrow_assert_simple!(self.is_fixed(domain_id));
        self.domains[domain_id].lower_bound
    }

    pub(crate) fn contains(&self, domain_id: DomainId, value: i32) -> bool {
        self.domains[domain_id].contains(value)
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint();
    }

    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    /// Raise the lower bound of the domain to `new_lower_bound`.
    ///
    /// A bound that does not improve on the current one is ignored. The change is journaled on
    /// the trail before it takes effect.
    pub(crate) fn tighten_lower_bound(
        &mut self,
        domain_id: DomainId,
        new_lower_bound: i32,
    ) -> Result<(), EmptyDomain> {
        let domain = &self.domains[domain_id];

        if new_lower_bound <= domain.lower_bound {
            return Ok(());
        }

        self.trail.push(TrailEntry {
            domain_id,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            removed_value: None,
        });

        let domain = &mut self.domains[domain_id];
        domain.lower_bound = new_lower_bound;
        domain.snap_lower_bound();

        self.events
            .event_occurred(DomainEvent::LowerBound, domain_id);
        if domain.lower_bound == domain.upper_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        domain.verify_consistency()
    }

    /// Lower the upper bound of the domain to `new_upper_bound`.
    pub(crate) fn tighten_upper_bound(
        &mut self,
        domain_id: DomainId,
        new_upper_bound: i32,
    ) -> Result<(), EmptyDomain> {
        let domain = &self.domains[domain_id];

        if new_upper_bound >= domain.upper_bound {
            return Ok(());
        }

        self.trail.push(TrailEntry {
            domain_id,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            removed_value: None,
        });

        let domain = &mut self.domains[domain_id];
        domain.upper_bound = new_upper_bound;
        domain.snap_upper_bound();

        self.events
            .event_occurred(DomainEvent::UpperBound, domain_id);
        if domain.lower_bound == domain.upper_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        domain.verify_consistency()
    }

    /// Shrink the domain to the single value `value`.
    pub(crate) fn make_assignment(
        &mut self,
        domain_id: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        self.tighten_lower_bound(domain_id, value)?;
        self.tighten_upper_bound(domain_id, value)?;
        Ok(())
    }

    /// Remove `value` from the domain.
    ///
    /// Interval domains cannot represent holes, so removing a value strictly between the bounds
    /// of an interval domain is a no-op.
    pub(crate) fn remove_value(
        &mut self,
        domain_id: DomainId,
        value: i32,
    ) -> Result<(), EmptyDomain> {
        let domain = &self.domains[domain_id];

        if !domain.contains(value) {
            return Ok(());
        }

        if domain.values.is_none() {
            if value == domain.lower_bound {
                return self.tighten_lower_bound(domain_id, value + 1);
            }
            if value == domain.upper_bound {
                return self.tighten_upper_bound(domain_id, value - 1);
            }
            return Ok(());
        }

        self.trail.push(TrailEntry {
            domain_id,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            removed_value: Some(value),
        });

        let domain = &mut self.domains[domain_id];
        domain.set(value, false);

        self.events.event_occurred(DomainEvent::Removal, domain_id);
        if value == domain.lower_bound {
            domain.lower_bound += 1;
            domain.snap_lower_bound();
            self.events
                .event_occurred(DomainEvent::LowerBound, domain_id);
        } else if value == domain.upper_bound {
            domain.upper_bound -= 1;
            domain.snap_upper_bound();
            self.events
                .event_occurred(DomainEvent::UpperBound, domain_id);
        }

        let domain = &self.domains[domain_id];
        if domain.lower_bound == domain.upper_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        domain.verify_consistency()
    }

    /// Undo all trail entries past `new_checkpoint`, restoring every domain to the state it had
    /// when the checkpoint was created. Pending events are discarded.
    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) {
        self.events.clear();

        self.trail
            .synchronise(new_checkpoint)
            .for_each(|entry| self.domains[entry.domain_id].undo(entry));
    }

    pub(crate) fn drain_domain_events(
        &mut self,
    ) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain()
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }
}

/// The domain of a single integer variable.
///
/// Interval domains track only their bounds. Sparse domains additionally keep a bitmap of the
/// values between the initial bounds, allowing holes.
#[derive(Clone, Debug)]
struct IntegerDomain {
    lower_bound: i32,
    upper_bound: i32,
    values: Option<SparseValues>,
}

#[derive(Clone, Debug)]
struct SparseValues {
    /// The initial lower bound, i.e. the value `is_value_in_domain[0]` refers to.
    offset: i32,
    is_value_in_domain: Box<[bool]>,
}

impl SparseValues {
    fn index(&self, value: i32) -> Option<usize> {
        let index = i64::from(value) - i64::from(self.offset);

        if (0..self.is_value_in_domain.len() as i64).contains(&index) {
            Some(index as usize)
        } else {
            None
        }
    }
}

impl IntegerDomain {
    fn interval(lower_bound: i32, upper_bound: i32) -> IntegerDomain {
        IntegerDomain {
            lower_bound,
            upper_bound,
            values: None,
        }
    }

    fn sparse(values: &[i32]) -> IntegerDomain {
        let (lower_bound, upper_bound) = match values.iter().copied().minmax() {
            MinMaxResult::NoElements => unreachable!("sparse domains hold at least one value"),
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };

        let mut is_value_in_domain =
            vec![false; (i64::from(upper_bound) - i64::from(lower_bound) + 1) as usize];
        for &value in values {
            is_value_in_domain[(value - lower_bound) as usize] = true;
        }

        IntegerDomain {
            lower_bound,
            upper_bound,
            values: Some(SparseValues {
                offset: lower_bound,
                is_value_in_domain: is_value_in_domain.into_boxed_slice(),
            }),
        }
    }

    fn contains(&self, value: i32) -> bool {
        if value < self.lower_bound || value > self.upper_bound {
            return false;
        }

        match &self.values {
            Some(sparse) => sparse
                .index(value)
                .is_some_and(|index| sparse.is_value_in_domain[index]),
            None => true,
        }
    }

    fn set(&mut self, value: i32, present: bool) {
        // Only sparse domains store individual values.
        let Some(sparse) = self.values.as_mut() else {
            return;
        };

        if let Some(index) = sparse.index(value) {
            sparse.is_value_in_domain[index] = present;
        }
    }

    /// Move the lower bound up past values absent from a sparse domain.
    fn snap_lower_bound(&mut self) {
        if self.values.is_none() {
            return;
        }

        while self.lower_bound <= self.upper_bound && !self.contains(self.lower_bound) {
            self.lower_bound += 1;
        }
    }

    /// Move the upper bound down past values absent from a sparse domain.
    fn snap_upper_bound(&mut self) {
        if self.values.is_none() {
            return;
        }

        while self.upper_bound >= self.lower_bound && !self.contains(self.upper_bound) {
            self.upper_bound -= 1;
        }
    }

    fn verify_consistency(&self) -> Result<(), EmptyDomain> {
        if self.lower_bound > self.upper_bound {
            Err(EmptyDomain)
        } else {
            Ok(())
        }
    }

    fn undo(&mut self, entry: TrailEntry) {
        if let Some(value) = entry.removed_value {
            self.set(value, true);
        }

        marrow_assert_moderate!(entry.old_lower_bound <= self.lower_bound);
        marrow_assert_moderate!(entry.old_upper_bound >= self.upper_bound);

        self.lower_bound = entry.old_lower_bound;
        self.upper_bound = entry.old_upper_bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_of(assignments: &mut Assignments) -> Vec<(DomainEvent, DomainId)> {
        assignments.drain_domain_events().collect()
    }

    #[test]
    fn tightening_a_bound_raises_the_corresponding_event() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.tighten_lower_bound(x, 3).expect("non-empty");
        assignments.tighten_upper_bound(x, 7).expect("non-empty");

        assert_eq!(assignments.get_lower_bound(x), 3);
        assert_eq!(assignments.get_upper_bound(x), 7);

        let events = events_of(&mut assignments);
        assert!(events.contains(&(DomainEvent::LowerBound, x)));
        assert!(events.contains(&(DomainEvent::UpperBound, x)));
    }

    #[test]
    fn a_weaker_bound_is_ignored() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.tighten_lower_bound(x, 5).expect("non-empty");
        assignments.tighten_lower_bound(x, 2).expect("non-empty");

        assert_eq!(assignments.get_lower_bound(x), 5);
        assert_eq!(assignments.num_trail_entries(), 1);
    }

    #[test]
    fn fixing_a_domain_raises_the_assign_event() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.make_assignment(x, 4).expect("non-empty");

        assert!(assignments.is_fixed(x));
        assert_eq!(assignments.get_assigned_value(x), 4);

        let events = events_of(&mut assignments);
        assert!(events.contains(&(DomainEvent::Assign, x)));
    }

    #[test]
    fn assigning_outside_the_domain_fails() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assert_eq!(assignments.make_assignment(x, 11), Err(EmptyDomain));
    }

    #[test]
    fn crossing_bounds_signal_an_empty_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.tighten_lower_bound(x, 8).expect("non-empty");
        assert_eq!(assignments.tighten_upper_bound(x, 5), Err(EmptyDomain));
    }

    #[test]
    fn sparse_bounds_snap_past_absent_values() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_sparse(&[1, 3, 7, 9]);

        assignments.tighten_lower_bound(x, 2).expect("non-empty");
        assert_eq!(assignments.get_lower_bound(x), 3);

        assignments.tighten_upper_bound(x, 8).expect("non-empty");
        assert_eq!(assignments.get_upper_bound(x), 7);
    }

    #[test]
    fn removing_a_sparse_bound_value_moves_the_bound() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_sparse(&[1, 3, 7]);

        assignments.remove_value(x, 1).expect("non-empty");
        assert_eq!(assignments.get_lower_bound(x), 3);

        let events = events_of(&mut assignments);
        assert!(events.contains(&(DomainEvent::Removal, x)));
        assert!(events.contains(&(DomainEvent::LowerBound, x)));
    }

    #[test]
    fn removing_an_interior_interval_value_is_a_no_op() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.remove_value(x, 5).expect("non-empty");

        assert!(assignments.contains(x, 5));
        assert_eq!(assignments.num_trail_entries(), 0);
        assert!(events_of(&mut assignments).is_empty());
    }

    #[test]
    fn removing_an_interval_bound_tightens_the_bound() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.remove_value(x, 0).expect("non-empty");
        assignments.remove_value(x, 10).expect("non-empty");

        assert_eq!(assignments.get_lower_bound(x), 1);
        assert_eq!(assignments.get_upper_bound(x), 9);
    }

    #[test]
    fn removing_the_last_value_empties_the_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_sparse(&[4]);

        assert_eq!(assignments.remove_value(x, 4), Err(EmptyDomain));
    }

    #[test]
    fn synchronising_restores_bounds_and_removed_values() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_sparse(&[1, 3, 5, 7]);
        let y = assignments.grow(0, 10);

        assignments.new_checkpoint();

        assignments.remove_value(x, 3).expect("non-empty");
        assignments.tighten_upper_bound(x, 5).expect("non-empty");
        assignments.tighten_lower_bound(y, 6).expect("non-empty");

        assignments.synchronise(0);

        assert_eq!(assignments.get_lower_bound(x), 1);
        assert_eq!(assignments.get_upper_bound(x), 7);
        assert!(assignments.contains(x, 3));
        assert_eq!(assignments.get_lower_bound(y), 0);
        assert_eq!(assignments.num_trail_entries(), 0);
    }

    #[test]
    fn synchronising_discards_pending_events() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);

        assignments.new_checkpoint();
        assignments.tighten_lower_bound(x, 3).expect("non-empty");

        assignments.synchronise(0);

        assert!(events_of(&mut assignments).is_empty());
    }
}
