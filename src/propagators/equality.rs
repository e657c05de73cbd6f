use crate::basic_types::Failure;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Status;
use crate::engine::cp::DomainEvents;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStrength;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::SetupContext;
use crate::engine::variables::DomainId;

/// Bound-consistent propagator for the constraint `x = y`.
#[derive(Debug)]
pub struct Equal {
    x: DomainId,
    y: DomainId,
}

impl Equal {
    pub fn new(x: DomainId, y: DomainId) -> Self {
        Equal { x, y }
    }
}

impl Propagator for Equal {
    fn name(&self) -> &str {
        "Equal"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        if let Status::Success = self.propagate(context)? {
            return Ok(Status::Success);
        }

        context.subscribe(self.x, DomainEvents::BOUNDS);
        context.subscribe(self.y, DomainEvents::BOUNDS);

        Ok(Status::Suspend)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        context.set_lower_bound(self.x, context.lower_bound(self.y))?;
        context.set_lower_bound(self.y, context.lower_bound(self.x))?;
        context.set_upper_bound(self.x, context.upper_bound(self.y))?;
        context.set_upper_bound(self.y, context.upper_bound(self.x))?;

        if context.is_fixed(self.x) && context.is_fixed(self.y) {
            Ok(Status::Success)
        } else {
            Ok(Status::Suspend)
        }
    }
}

/// Propagator for the constraint `x != y`, with interval reasoning only.
///
/// A value is removed from one variable once the other is fixed. For interval domains the
/// removal only takes effect when the value sits at a bound.
#[derive(Debug)]
pub struct NotEqual {
    x: DomainId,
    y: DomainId,
}

impl NotEqual {
    pub fn new(x: DomainId, y: DomainId) -> Self {
        NotEqual { x, y }
    }
}

impl Propagator for NotEqual {
    fn name(&self) -> &str {
        "NotEqual"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        if let Status::Success = self.propagate(context)? {
            return Ok(Status::Success);
        }

        context.subscribe(self.x, DomainEvents::BOUNDS);
        context.subscribe(self.y, DomainEvents::BOUNDS);

        Ok(Status::Suspend)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if context.is_fixed(self.x) && context.is_fixed(self.y) {
            if context.value(self.x) == context.value(self.y) {
                return Err(Failure);
            }
            return Ok(Status::Success);
        }

        if context.is_fixed(self.x) {
            let value = context.value(self.x);
            context.remove(self.y, value)?;
            return if context.contains(self.y, value) {
                Ok(Status::Suspend)
            } else {
                Ok(Status::Success)
            };
        }

        if context.is_fixed(self.y) {
            let value = context.value(self.y);
            context.remove(self.x, value)?;
            return if context.contains(self.x, value) {
                Ok(Status::Suspend)
            } else {
                Ok(Status::Success)
            };
        }

        let disjoint = context.upper_bound(self.x) < context.lower_bound(self.y)
            || context.upper_bound(self.y) < context.lower_bound(self.x);

        if disjoint {
            Ok(Status::Success)
        } else {
            Ok(Status::Suspend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Store;

    #[test]
    fn equal_synchronises_the_bounds() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 5);
        let y = store.new_bounded_variable(3, 10);

        store.post(Equal::new(x, y)).expect("satisfiable");

        assert_eq!(store.lower_bound(x), 3);
        assert_eq!(store.upper_bound(x), 5);
        assert_eq!(store.lower_bound(y), 3);
        assert_eq!(store.upper_bound(y), 5);
    }

    #[test]
    fn equal_follows_later_bound_changes() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 10);
        let y = store.new_bounded_variable(0, 10);

        store.post(Equal::new(x, y)).expect("satisfiable");

        store.assign(x, 4).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert!(store.is_fixed(y));
        assert_eq!(store.value(y), 4);
    }

    #[test]
    fn equal_fails_on_disjoint_domains() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(0, 3);
        let y = store.new_bounded_variable(5, 8);

        assert!(store.post(Equal::new(x, y)).is_err());
    }

    #[test]
    fn not_equal_removes_the_value_of_a_fixed_variable() {
        let mut store = Store::new();
        let x = store.new_sparse_variable(&[1, 2, 3]);
        let y = store.new_sparse_variable(&[1, 2, 3]);

        store.post(NotEqual::new(x, y)).expect("satisfiable");

        store.assign(x, 2).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert!(!store.contains(y, 2));
        assert!(store.contains(y, 1));
        assert!(store.contains(y, 3));
    }

    #[test]
    fn not_equal_fails_when_both_are_fixed_to_the_same_value() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(2, 2);
        let y = store.new_bounded_variable(2, 2);

        assert!(store.post(NotEqual::new(x, y)).is_err());
    }

    #[test]
    fn not_equal_keeps_an_interior_interval_value() {
        let mut store = Store::new();
        let x = store.new_bounded_variable(5, 5);
        let y = store.new_bounded_variable(0, 10);

        store.post(NotEqual::new(x, y)).expect("satisfiable");

        // Interval domains cannot represent a hole at 5; the propagator stays suspended.
        assert!(store.contains(y, 5));

        store.set_lower_bound(y, 5).expect("satisfiable");
        store.propagate().expect("satisfiable");

        assert_eq!(store.lower_bound(y), 6);
    }
}
