//! Scheduling of constraint execution.
//!
//! Relations implement [`Relation`]; they read and narrow the derived domains of their scope
//! through a [`PropagationContextMut`]. The [`DefaultPropagator`] keeps the agenda of constraints
//! that need to be re-evaluated and drives their execution.
mod default_propagator;
mod propagation_context;
mod relation;

pub(crate) use default_propagator::DefaultPropagator;
pub use propagation_context::PropagationContextMut;
pub use relation::Relation;
