use super::Equal;
use super::NotEqual;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Status;
use crate::engine::cp::DomainEvents;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStrength;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::SetupContext;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::marrow_assert_moderate;

/// Propagator for the reified equality `b <-> (x = y)`.
///
/// While nothing is fixed, the only deduction made is setting `b` to false once the ranges of
/// `x` and `y` are disjoint; the converse direction, detecting that `x = y` is forced, is not
/// watched for. As soon as `b`, `x`, or `y` becomes fixed the propagator rewrites itself into a
/// simpler one and retires.
#[derive(Debug)]
pub struct EqualReified {
    x: DomainId,
    y: DomainId,
    b: Literal,
}

impl EqualReified {
    pub fn new(x: DomainId, y: DomainId, b: Literal) -> Self {
        EqualReified { x, y, b }
    }

    /// Replace this propagator by one specialised for the part that became fixed.
    fn rewrite(&self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if context.is_literal_fixed(self.b) {
            if context.is_literal_true(self.b) {
                context.post(Equal::new(self.x, self.y));
            } else {
                context.post(NotEqual::new(self.x, self.y));
            }
        } else if context.is_fixed(self.x) {
            context.post(EqualConstantReified::new(
                self.y,
                context.value(self.x),
                self.b,
            ));
        } else {
            marrow_assert_moderate!(context.is_fixed(self.y));
            context.post(EqualConstantReified::new(
                self.x,
                context.value(self.y),
                self.b,
            ));
        }

        Ok(Status::Success)
    }
}

impl Propagator for EqualReified {
    fn name(&self) -> &str {
        "EqualReified"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        if context.is_literal_fixed(self.b)
            || context.is_fixed(self.x)
            || context.is_fixed(self.y)
        {
            return self.rewrite(context);
        }

        context.subscribe(self.x, DomainEvents::BOUNDS);
        context.subscribe(self.y, DomainEvents::BOUNDS);
        context.subscribe_val_bind(self.b.domain_id());
        context.subscribe_val_bind(self.x);
        context.subscribe_val_bind(self.y);

        self.propagate(context)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        let disjoint = context.upper_bound(self.x) < context.lower_bound(self.y)
            || context.upper_bound(self.y) < context.lower_bound(self.x);

        if disjoint {
            context.assign_literal(self.b, false)?;
            return Ok(Status::Success);
        }

        Ok(Status::Suspend)
    }

    fn val_bind(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        _: DomainId,
    ) -> PropagationStatus {
        self.rewrite(context)
    }
}

/// Propagator for the reified equality with a constant, `b <-> (x = v)`.
#[derive(Debug)]
pub struct EqualConstantReified {
    x: DomainId,
    value: i32,
    b: Literal,
}

impl EqualConstantReified {
    pub fn new(x: DomainId, value: i32, b: Literal) -> Self {
        EqualConstantReified { x, value, b }
    }
}

impl Propagator for EqualConstantReified {
    fn name(&self) -> &str {
        "EqualConstantReified"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        if let Status::Success = self.propagate(context)? {
            return Ok(Status::Success);
        }

        context.subscribe(self.x, DomainEvents::ANY);
        context.subscribe(self.b.domain_id(), DomainEvents::ASSIGN);

        Ok(Status::Suspend)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if !context.contains(self.x, self.value) {
            context.assign_literal(self.b, false)?;
            return Ok(Status::Success);
        }

        if context.is_fixed(self.x) {
            // The domain of x is exactly {value}.
            context.assign_literal(self.b, true)?;
            return Ok(Status::Success);
        }

        if context.is_literal_true(self.b) {
            context.assign(self.x, self.value)?;
            return Ok(Status::Success);
        }

        if context.is_literal_false(self.b) {
            context.remove(self.x, self.value)?;
            return if context.contains(self.x, self.value) {
                Ok(Status::Suspend)
            } else {
                Ok(Status::Success)
            };
        }

        Ok(Status::Suspend)
    }
}
