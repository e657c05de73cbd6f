use crate::basic_types::Failure;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Status;
use crate::engine::cp::ReversibleInt;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStrength;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::SetupContext;
use crate::engine::variables::DomainId;
use crate::marrow_assert_simple;

/// Bound-consistent propagator for the constraint `rhs = max(terms)`.
///
/// The propagator caches which term currently supports each bound of `rhs` in reversible cells.
/// A full rescan of the terms is only done when the bounds of a supporting term change.
#[derive(Debug)]
pub struct Maximum {
    terms: Box<[DomainId]>,
    rhs: DomainId,
    supports: Option<Supports>,
}

/// The reversible cells caching the supports; allocated in setup.
#[derive(Debug, Clone, Copy)]
struct Supports {
    /// `max_i lb(terms[i])`, a lower bound on `rhs`.
    min_value: ReversibleInt,
    /// Index of the term attaining `min_value`.
    min_witness: ReversibleInt,
    /// `max_i ub(terms[i])`, an upper bound on `rhs`.
    max_value: ReversibleInt,
    /// Index of the term attaining `max_value`.
    max_witness: ReversibleInt,
}

impl Maximum {
    pub fn new(terms: impl Into<Box<[DomainId]>>, rhs: DomainId) -> Self {
        let terms = terms.into();
        marrow_assert_simple!(!terms.is_empty());

        Maximum {
            terms,
            rhs,
            supports: None,
        }
    }

    fn supports(&self) -> Supports {
        self.supports
            .expect("the supports are allocated during setup")
    }

    /// Rescan all terms to recompute both bounds of the maximum and their witnesses.
    fn update_supports(&self, context: &mut PropagationContextMut<'_>) {
        let supports = self.supports();

        let mut min = i64::MIN;
        let mut max = i64::MIN;
        for (index, &term) in self.terms.iter().enumerate() {
            let term_min = i64::from(context.lower_bound(term));
            let term_max = i64::from(context.upper_bound(term));

            if term_min > min {
                context.write(supports.min_witness, index as i64);
                context.write(supports.min_value, term_min);
                min = term_min;
            }
            if term_max > max {
                context.write(supports.max_witness, index as i64);
                context.write(supports.max_value, term_max);
                max = term_max;
            }
        }
    }

    fn tighten_rhs(&self, context: &mut PropagationContextMut<'_>) -> Result<(), Failure> {
        let supports = self.supports();

        context.set_lower_bound(self.rhs, context.read(supports.min_value) as i32)?;
        context.set_upper_bound(self.rhs, context.read(supports.max_value) as i32)?;

        Ok(())
    }

    /// No term can exceed the maximum.
    fn clip_terms(&self, context: &mut PropagationContextMut<'_>) -> Result<(), Failure> {
        for &term in self.terms.iter() {
            context.set_upper_bound(term, context.upper_bound(self.rhs))?;
        }

        Ok(())
    }
}

impl Propagator for Maximum {
    fn name(&self) -> &str {
        "Maximum"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        self.clip_terms(context)?;

        self.supports = Some(Supports {
            min_value: context.new_reversible_int(0),
            min_witness: context.new_reversible_int(0),
            max_value: context.new_reversible_int(0),
            max_witness: context.new_reversible_int(0),
        });

        self.update_supports(context);
        self.tighten_rhs(context)?;

        for (index, &term) in self.terms.iter().enumerate() {
            if !context.is_fixed(term) && context.upper_bound(term) > context.lower_bound(self.rhs)
            {
                context.subscribe_update_bounds_with_index(term, LocalId::from(index as u32));
            }
        }
        if !context.is_fixed(self.rhs) {
            context.subscribe_update_bounds(self.rhs);
        }

        Ok(Status::Suspend)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        self.clip_terms(context)?;
        self.update_supports(context);
        self.tighten_rhs(context)?;

        Ok(Status::Suspend)
    }

    /// A bound of a term changed.
    fn update_bounds_with_index(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        variable: DomainId,
        index: LocalId,
    ) -> PropagationStatus {
        let supports = self.supports();
        let index = i64::from(index.unpack());

        if index == context.read(supports.min_witness) || index == context.read(supports.max_witness)
        {
            self.update_supports(context);
            self.tighten_rhs(context)?;
        }

        if context.is_fixed(variable)
            && i64::from(context.value(variable)) == context.read(supports.max_value)
        {
            // A term is fixed to the largest value any term can take, so it is the maximum.
            context.assign(self.rhs, context.value(variable))?;
            return Ok(Status::Success);
        }

        Ok(Status::Suspend)
    }

    /// A bound of `rhs` changed.
    fn update_bounds(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        _: DomainId,
    ) -> PropagationStatus {
        self.clip_terms(context)?;
        Ok(Status::Suspend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Store;

    #[test]
    fn the_bounds_of_the_maximum_follow_the_terms() {
        let mut store = Store::new();
        let x0 = store.new_bounded_variable(2, 2);
        let x1 = store.new_bounded_variable(1, 5);
        let x2 = store.new_bounded_variable(0, 3);
        let y = store.new_bounded_variable(-10, 10);

        store
            .post(Maximum::new([x0, x1, x2], y))
            .expect("satisfiable");

        assert_eq!(store.lower_bound(y), 2);
        assert_eq!(store.upper_bound(y), 5);
    }

    #[test]
    fn the_terms_are_clipped_to_the_maximum() {
        let mut store = Store::new();
        let x0 = store.new_bounded_variable(0, 10);
        let x1 = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 4);

        store.post(Maximum::new([x0, x1], y)).expect("satisfiable");

        assert_eq!(store.upper_bound(x0), 4);
        assert_eq!(store.upper_bound(x1), 4);
    }

    #[test]
    fn narrowing_a_support_updates_the_maximum() {
        let mut store = Store::new();
        let x0 = store.new_bounded_variable(0, 5);
        let x1 = store.new_bounded_variable(0, 3);
        let y = store.new_bounded_variable(-10, 10);

        store.post(Maximum::new([x0, x1], y)).expect("satisfiable");
        assert_eq!(store.upper_bound(y), 5);

        store.set_upper_bound(x0, 2).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert_eq!(store.upper_bound(y), 3);
    }

    #[test]
    fn a_term_fixed_to_the_largest_value_fixes_the_maximum() {
        let mut store = Store::new();
        let x0 = store.new_sparse_variable(&[2]);
        let x1 = store.new_sparse_variable(&[1, 5]);
        let x2 = store.new_sparse_variable(&[0, 3]);
        let y = store.new_bounded_variable(-10, 10);

        store
            .post(Maximum::new([x0, x1, x2], y))
            .expect("satisfiable");
        assert_eq!(store.lower_bound(y), 2);
        assert_eq!(store.upper_bound(y), 5);

        store.assign(x1, 5).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert!(store.is_fixed(y));
        assert_eq!(store.value(y), 5);
    }

    #[test]
    fn lowering_the_maximum_clips_the_terms() {
        let mut store = Store::new();
        let x0 = store.new_bounded_variable(0, 10);
        let x1 = store.new_bounded_variable(0, 8);
        let y = store.new_bounded_variable(0, 10);

        store.post(Maximum::new([x0, x1], y)).expect("satisfiable");

        store.set_upper_bound(y, 6).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert_eq!(store.upper_bound(x0), 6);
        assert_eq!(store.upper_bound(x1), 6);
    }

    #[test]
    fn the_support_caches_are_restored_on_backtracking() {
        let mut store = Store::new();
        let x0 = store.new_bounded_variable(0, 5);
        let x1 = store.new_bounded_variable(0, 3);
        let y = store.new_bounded_variable(-10, 10);

        store.post(Maximum::new([x0, x1], y)).expect("satisfiable");

        let checkpoint = store.push_state();
        store.set_upper_bound(x0, 1).expect("satisfiable");
        store.propagate().expect("satisfiable");
        assert_eq!(store.upper_bound(y), 3);

        store.restore_state(checkpoint);
        assert_eq!(store.upper_bound(y), 5);

        // After the rollback the caches are in sync again: narrowing the restored support
        // filters correctly.
        store.set_upper_bound(x0, 4).expect("satisfiable");
        store.propagate().expect("satisfiable");
        assert_eq!(store.upper_bound(y), 4);
    }
}
