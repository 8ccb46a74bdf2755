//! The constraint engine: domains, variables, relations and the propagation machinery that keeps
//! the network consistent.
pub mod domains;
pub mod propagation;
pub mod variables;

mod constraint;
mod constraint_engine;
mod constraint_network;
mod constraint_registry;
#[cfg(test)]
pub(crate) mod test_helper;
mod variable_names;

pub use constraint::Constraint;
pub use constraint::ConstraintId;
pub use constraint_engine::ConstraintEngine;
pub use constraint_engine::ConstraintEngineOptions;
pub use constraint_registry::ConstraintRegistry;
pub use constraint_registry::RelationFactory;
pub(crate) use variable_names::VariableNames;
