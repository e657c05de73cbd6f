use thiserror::Error;

use crate::engine::cp::EmptyDomain;

/// The result of invoking a propagator handler.
///
/// A propagator either runs to completion, in which case it reports whether it is [entailed and
/// can be deactivated](Status::Success) or [should stay subscribed](Status::Suspend), or it
/// detects a contradiction and reports [`Failure`].
pub type PropagationStatus = Result<Status, Failure>;

/// The outcome of a propagator handler that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The constraint is entailed by the current domains. The engine deactivates the propagator
    /// until the entailment is undone by backtracking.
    Success,
    /// The propagator has done all the filtering it can for now and waits for further domain
    /// events.
    Suspend,
}

/// A domain became empty or a propagator detected a contradiction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("a domain became empty or a contradiction was detected")]
pub struct Failure;

impl From<EmptyDomain> for Failure {
    fn from(_: EmptyDomain) -> Self {
        Failure
    }
}
