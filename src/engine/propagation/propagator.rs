use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::SetupContext;
use crate::engine::variables::DomainId;

/// How eagerly a propagator should filter.
///
/// The strength is a hint given when the propagator is posted. A propagator is free to ignore it;
/// the ones that honour it trade filtering power against the cost per invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropagationStrength {
    #[default]
    Weak,
    Strong,
}

/// The trait all propagators implement.
///
/// A propagator is responsible for filtering the domains of the variables of one constraint. It
/// registers its interest in domain changes during [`Propagator::setup`], after which the engine
/// invokes the subscribed handlers whenever a watched event fires.
///
/// Every handler reports through [`PropagationStatus`]: `Ok(Status::Success)` when the constraint
/// is entailed and the propagator can be deactivated until backtracking, `Ok(Status::Suspend)`
/// when it waits for further events, and `Err(Failure)` on contradiction.
///
/// The specialised handlers [`Propagator::update_bounds`],
/// [`Propagator::update_bounds_with_index`], and [`Propagator::val_bind`] default to the general
/// [`Propagator::propagate`], so a propagator only overrides the ones it subscribes with.
pub trait Propagator: Downcast {
    /// The name of the propagator. Used for debugging and logging.
    fn name(&self) -> &str;

    /// Called once, when the propagator is posted to the store.
    ///
    /// The propagator performs its initial filtering here and subscribes to the events it wants
    /// to be woken by. A propagator that does not subscribe to anything will never run again.
    fn setup(
        &mut self,
        context: &mut SetupContext<'_>,
        strength: PropagationStrength,
    ) -> PropagationStatus;

    /// The general propagation handler.
    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus;

    /// Called when a bound of `variable` changed, for subscriptions made through
    /// [`SetupContext::subscribe_update_bounds`].
    fn update_bounds(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        variable: DomainId,
    ) -> PropagationStatus {
        let _ = variable;
        self.propagate(context)
    }

    /// Like [`Propagator::update_bounds`], but also reports the [`LocalId`] the propagator
    /// attached to the subscription.
    fn update_bounds_with_index(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        variable: DomainId,
        index: LocalId,
    ) -> PropagationStatus {
        let _ = index;
        self.update_bounds(context, variable)
    }

    /// Called when `variable` became fixed, for subscriptions made through
    /// [`SetupContext::subscribe_val_bind`].
    fn val_bind(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        variable: DomainId,
    ) -> PropagationStatus {
        let _ = variable;
        self.propagate(context)
    }
}

impl_downcast!(Propagator);
