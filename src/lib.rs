//! # Marrow
//! Marrow is the propagation core of a finite-domain constraint solver. It provides reversible
//! integer domains, an event-driven propagation engine which runs propagators to fixpoint, and a
//! [`Store`] facade through which a search procedure drives the whole thing.
//!
//! The first step is **creating variables** and **posting constraints**; posting immediately
//! filters the domains:
//! ```rust
//! use marrow::propagators::GreaterThan;
//! use marrow::Store;
//!
//! let mut store = Store::new();
//! let x = store.new_bounded_variable(0, 10);
//! let y = store.new_bounded_variable(0, 10);
//!
//! // x > y
//! store.post(GreaterThan::new(x, y)).expect("satisfiable");
//!
//! assert_eq!(store.lower_bound(x), 1);
//! assert_eq!(store.upper_bound(y), 9);
//! ```
//!
//! A search procedure interleaves **decisions** with **propagation**, saving the state before
//! each decision so it can backtrack when a branch fails:
//! ```rust
//! # use marrow::propagators::GreaterThan;
//! # use marrow::Store;
//! # let mut store = Store::new();
//! # let x = store.new_bounded_variable(0, 10);
//! # let y = store.new_bounded_variable(0, 10);
//! # store.post(GreaterThan::new(x, y)).expect("satisfiable");
//! let checkpoint = store.push_state();
//!
//! store.assign(y, 7).expect("satisfiable");
//! store.propagate().expect("satisfiable");
//! assert_eq!(store.lower_bound(x), 8);
//!
//! store.restore_state(checkpoint);
//! assert_eq!(store.lower_bound(x), 1);
//! ```
//!
//! New constraints are implemented through the [`Propagator`] trait; the ones shipped with the
//! crate live in [`propagators`].
//!
//! ## Feature Flags
//! - `debug-checks`: Enable expensive assertions in the engine. Turning this on slows down
//!   propagation considerably, so it is off by default.

#[doc(hidden)]
pub mod asserts;
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub mod propagators;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Failure;
pub use crate::basic_types::PropagationStatus;
pub use crate::basic_types::Status;
pub use crate::engine::cp::DomainEvent;
pub use crate::engine::cp::DomainEvents;
pub use crate::engine::cp::EmptyDomain;
pub use crate::engine::cp::ReversibleInt;
pub use crate::engine::propagation::LocalId;
pub use crate::engine::propagation::PropagationContextMut;
pub use crate::engine::propagation::PropagationStrength;
pub use crate::engine::propagation::Propagator;
pub use crate::engine::propagation::PropagatorId;
pub use crate::engine::propagation::SetupContext;
pub use crate::engine::variables::DomainId;
pub use crate::engine::variables::Literal;
pub use crate::engine::Checkpoint;
pub use crate::engine::Store;
