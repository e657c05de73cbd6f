pub(crate) mod cp;
pub(crate) mod propagation;
mod store;
pub(crate) mod variable_names;
pub(crate) mod variables;

pub use store::Checkpoint;
pub use store::Store;
