use crate::basic_types::PropagationStatus;
use crate::basic_types::Status;
use crate::engine::cp::DomainEvents;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagationStrength;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::SetupContext;
use crate::engine::variables::DomainId;

/// Bound-consistent propagator for the constraint `x > y`.
#[derive(Debug)]
pub struct GreaterThan {
    x: DomainId,
    y: DomainId,
}

impl GreaterThan {
    pub fn new(x: DomainId, y: DomainId) -> Self {
        GreaterThan { x, y }
    }
}

impl Propagator for GreaterThan {
    fn name(&self) -> &str {
        "GreaterThan"
    }

    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        _: PropagationStrength,
    ) -> PropagationStatus {
        if let Status::Success = self.propagate(context)? {
            return Ok(Status::Success);
        }

        if !context.is_fixed(self.y) {
            context.subscribe(self.y, DomainEvents::LOWER_BOUND);
        }
        if !context.is_fixed(self.x) {
            context.subscribe(self.x, DomainEvents::UPPER_BOUND);
        }

        Ok(Status::Suspend)
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        if context.lower_bound(self.x) > context.upper_bound(self.y) {
            return Ok(Status::Success);
        }

        context.set_lower_bound(self.x, context.lower_bound(self.y) + 1)?;
        context.set_upper_bound(self.y, context.upper_bound(self.x) - 1)?;

        Ok(Status::Suspend)
    }
}
