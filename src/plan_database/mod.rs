//! Tokens, their lifecycle and their unification on top of the constraint engine.
//!
//! A [`PlanDatabase`] owns a [`ConstraintEngine`](crate::engine::ConstraintEngine). Every token
//! it creates owns a fixed set of variables in that engine (state, object, duration, start, end
//! followed by the parameters of its predicate) plus a standard `start + duration = end`
//! constraint. Tokens move between the states described by [`TokenState`]; merging a token onto
//! an active one records a unification memento that a split undoes exactly.
mod database;
mod notification;
mod object;
mod schema;
#[cfg(test)]
pub(crate) mod test_helper;
mod token;
mod token_lifecycle;
mod token_state;
mod token_variable;
mod unify_memento;

pub use database::PlanDatabase;
pub use database::PlanDatabaseOptions;
pub use notification::ConstraintEvent;
pub use notification::Notification;
pub use notification::ObjectEvent;
pub use notification::TokenEvent;
pub use object::Object;
pub use object::ObjectId;
pub use schema::Schema;
pub use schema::SchemaError;
pub use token::Token;
pub use token::TokenId;
pub use token_state::TokenState;
pub use token_variable::TokenVariable;
pub use unify_memento::UnificationStrategy;
