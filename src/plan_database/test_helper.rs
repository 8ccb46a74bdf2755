#![cfg(test)]
//! A [`PlanDatabase`] over a small schema of vehicles and rovers, with shorthands for the
//! operations tests perform most.
//!
//! Objects: `truck` (a `Vehicle`), `spirit` and `opportunity` (both `Rover`s). Predicates:
//! - `Vehicle.At(location: {0, 1, 2, 3})`
//! - `Rover.At(location: {1, 2, 3})`, a specialisation of `Vehicle.At`
//! - `Rover.Drive(to: {1, 2, 3}, speed: [1, 10])`
use std::ops::Deref;
use std::ops::DerefMut;

use super::PlanDatabase;
use super::PlanDatabaseOptions;
use super::Schema;
use super::TokenId;
use crate::engine::domains::Domain;
use crate::engine::domains::IntervalDomain;
use crate::engine::variables::VariableId;

#[derive(Debug)]
pub(crate) struct TestDatabase {
    db: PlanDatabase,
}

impl Default for TestDatabase {
    fn default() -> Self {
        TestDatabase::with_options(PlanDatabaseOptions::default())
    }
}

impl TestDatabase {
    pub(crate) fn with_options(options: PlanDatabaseOptions) -> TestDatabase {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut schema = Schema::default();
        schema.add_object_type("Vehicle", None).unwrap();
        schema.add_object_type("Rover", Some("Vehicle")).unwrap();
        let _ = schema
            .add_predicate(
                "Vehicle",
                "At",
                None,
                &[("location", Domain::values([0, 1, 2, 3]))],
            )
            .unwrap();
        let _ = schema
            .add_predicate(
                "Rover",
                "At",
                Some("Vehicle.At"),
                &[("location", Domain::values([1, 2, 3]))],
            )
            .unwrap();
        let _ = schema
            .add_predicate(
                "Rover",
                "Drive",
                None,
                &[
                    ("to", Domain::values([1, 2, 3])),
                    ("speed", Domain::interval(1, 10)),
                ],
            )
            .unwrap();

        let options = PlanDatabaseOptions {
            horizon: IntervalDomain::new(0, 100),
            default_duration: IntervalDomain::new(1, 100),
            ..options
        };
        let mut db = PlanDatabase::new(schema, options);
        let _ = db.create_object("Vehicle", "truck").unwrap();
        let _ = db.create_object("Rover", "spirit").unwrap();
        let _ = db.create_object("Rover", "opportunity").unwrap();

        TestDatabase { db }
    }

    /// A closed, rejectable token without a master.
    pub(crate) fn new_token(&mut self, predicate: &str) -> TokenId {
        self.db
            .create_token(predicate, true, true)
            .expect("the predicate should be part of the schema")
    }

    pub(crate) fn new_slave(&mut self, master: TokenId, predicate: &str) -> TokenId {
        self.db
            .create_slave_token(master, "before", predicate, false, true)
            .expect("the predicate should be part of the schema")
    }

    pub(crate) fn parameter(&self, token: TokenId, name: &str) -> VariableId {
        self.db
            .variable(token, name)
            .expect("the token should have the variable")
    }

    pub(crate) fn domain(&self, variable: VariableId) -> &Domain {
        self.db.engine().variable(variable).derived_domain()
    }

    pub(crate) fn restrict_base(&mut self, variable: VariableId, domain: &Domain) {
        self.db.restrict_base_domain(variable, domain);
    }

    /// The derived domains of every variable of the token, in position order.
    pub(crate) fn snapshot(&self, token: TokenId) -> Vec<Domain> {
        self.db
            .token(token)
            .variables()
            .iter()
            .map(|&variable| self.domain(variable).clone())
            .collect()
    }
}

impl Deref for TestDatabase {
    type Target = PlanDatabase;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}
