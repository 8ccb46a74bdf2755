//! # plandb
//! A plan database for constraint-based planning: tokens over a schema of object types and
//! predicates, whose variables are kept consistent by a propagating constraint engine, and which
//! can be merged onto each other and split apart again without losing or duplicating any
//! restriction.
//!
//! The crate is organised bottom-up:
//! - [`engine`] holds the [domains](engine::domains), the variables and constraints, and the
//!   [`ConstraintEngine`](engine::ConstraintEngine) which propagates them from an agenda and
//!   relaxes them when restrictions are retracted.
//! - [`relations`] are the built-in relations constraints can be created from.
//! - [`plan_database`] holds the tokens, their lifecycle, the domains of their variables across
//!   merged tokens and the unification mementos recording every merge.
//!
//! # Example
//! ```
//! # use plandb::engine::domains::Domain;
//! # use plandb::plan_database::PlanDatabase;
//! # use plandb::plan_database::PlanDatabaseOptions;
//! # use plandb::plan_database::Schema;
//! # use plandb::plan_database::TokenState;
//! let mut schema = Schema::default();
//! schema.add_object_type("Rover", None).unwrap();
//! let at = schema
//!     .add_predicate("Rover", "At", None, &[("location", Domain::values([1, 2, 3]))])
//!     .unwrap();
//!
//! let mut db = PlanDatabase::new(schema, PlanDatabaseOptions::default());
//! let _ = db.create_object("Rover", "spirit").unwrap();
//!
//! let first = db.create_token(&at, false, true).unwrap();
//! let second = db.create_token(&at, false, true).unwrap();
//! db.activate(first);
//!
//! let location = db.variable(second, "location").unwrap();
//! db.specify(location, 2);
//! db.merge(second, first);
//! assert!(db.propagate());
//!
//! let merged_onto = db.variable(first, "location").unwrap();
//! assert_eq!(&Domain::singleton(2), db.engine().variable(merged_onto).derived_domain());
//!
//! db.split(second);
//! assert_eq!(TokenState::Inactive, db.state(second));
//! assert_eq!(&Domain::values([1, 2, 3]), db.engine().variable(merged_onto).derived_domain());
//! ```
#[doc(hidden)]
pub mod asserts;
mod basic_types;
pub mod containers;
pub mod engine;
pub mod plan_database;
pub mod relations;
pub mod statistics;
#[cfg(test)]
mod tests;

pub use basic_types::ConstraintOperationError;
pub use basic_types::Inconsistency;
pub use basic_types::PropagationStatus;
pub use plan_database::PlanDatabase;
pub use plan_database::PlanDatabaseOptions;
