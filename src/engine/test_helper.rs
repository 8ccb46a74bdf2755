#![cfg(any(test, doc))]
//! This module exposes helpers that aid testing of relations and of the engine itself. The
//! [`TestEngine`] allows setting up small networks and inspecting the resulting domains.
use std::cell::Cell;
use std::ops::Deref;
use std::ops::DerefMut;
use std::rc::Rc;

use super::constraint::ConstraintId;
use super::domains::Domain;
use super::domains::Value;
use super::propagation::PropagationContextMut;
use super::propagation::Relation;
use super::variables::VariableId;
use super::ConstraintEngine;
use super::ConstraintEngineOptions;
use crate::basic_types::PropagationStatus;

/// A [`ConstraintEngine`] with shorthands for creating variables and posting relations.
#[derive(Default, Debug)]
pub(crate) struct TestEngine {
    engine: ConstraintEngine,
    next_id: u32,
}

impl TestEngine {
    pub(crate) fn with_options(options: ConstraintEngineOptions) -> TestEngine {
        TestEngine {
            engine: ConstraintEngine::new(options),
            next_id: 0,
        }
    }

    pub(crate) fn new_variable(&mut self, lb: Value, ub: Value) -> VariableId {
        self.new_variable_with_domain(Domain::interval(lb, ub))
    }

    pub(crate) fn new_sparse_variable(&mut self, values: &[Value]) -> VariableId {
        assert!(
            !values.is_empty(),
            "cannot create a variable with an empty domain"
        );
        self.new_variable_with_domain(Domain::values(values.iter().copied()))
    }

    fn new_variable_with_domain(&mut self, domain: Domain) -> VariableId {
        let name = format!("v{}", self.next_id);
        self.next_id += 1;
        self.engine.create_variable(domain, name)
    }

    pub(crate) fn post(
        &mut self,
        relation: impl Relation + 'static,
        scope: &[VariableId],
    ) -> ConstraintId {
        self.engine
            .add_constraint(relation, scope)
            .expect("the scope should fit the relation")
    }

    pub(crate) fn domain(&self, variable: VariableId) -> &Domain {
        self.engine.variable(variable).derived_domain()
    }

    pub(crate) fn assert_bounds(&self, variable: VariableId, lb: Value, ub: Value) {
        let domain = self.domain(variable);
        assert_eq!(
            (Some(lb), Some(ub)),
            (domain.lower_bound(), domain.upper_bound()),
            "unexpected bounds for {variable}: {domain}"
        );
    }
}

impl Deref for TestEngine {
    type Target = ConstraintEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl DerefMut for TestEngine {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.engine
    }
}

/// Counts its executions. Every execution raises the lower bound of its variable by one, so it
/// restricts the variable it is posted on.
#[derive(Clone, Debug, Default)]
pub(crate) struct Counting {
    executions: Rc<Cell<u32>>,
}

impl Counting {
    /// The number of executions of this relation and all its clones.
    pub(crate) fn executions(&self) -> u32 {
        self.executions.get()
    }
}

impl Relation for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        self.executions.set(self.executions.get() + 1);
        let lower_bound = context.lower_bound(0)?;
        let upper_bound = context.upper_bound(0)?;
        context.restrict_bounds(0, lower_bound + 1, upper_bound)?;
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(self.clone())
    }
}
