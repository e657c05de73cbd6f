//! The propagator implementations.

mod eq_reif;
mod equality;
mod greater_than;
mod maximum;

pub use eq_reif::EqualConstantReified;
pub use eq_reif::EqualReified;
pub use equality::Equal;
pub use equality::NotEqual;
pub use greater_than::GreaterThan;
pub use maximum::Maximum;
