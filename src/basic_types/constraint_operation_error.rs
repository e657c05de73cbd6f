use thiserror::Error;

/// Errors related to adding constraints to [`Store`](crate::Store).
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// Cannot add a constraint to a store which is in a failed state.
    #[error("Cannot add constraint, the store is in a failed state")]
    InfeasibleState,
    /// The constraint found a contradiction while it was being posted.
    #[error("Adding the constraint led to a contradiction")]
    InfeasiblePropagator,
}
