//! The relations the [`ConstraintRegistry`](crate::engine::ConstraintRegistry) knows about by
//! default.
//!
//! See [`Relation`](crate::engine::propagation::Relation) for how relations are executed.
pub mod arithmetic;
mod equal;
mod not_equal;
mod unary;

pub use equal::Equal;
pub use not_equal::NotEqual;
pub use unary::Unary;
