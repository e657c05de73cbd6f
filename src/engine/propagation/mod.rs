pub(crate) mod contexts;
mod local_id;
mod propagator;
mod propagator_id;

pub use contexts::PropagationContextMut;
pub use contexts::SetupContext;
pub use local_id::LocalId;
pub use propagator::PropagationStrength;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
