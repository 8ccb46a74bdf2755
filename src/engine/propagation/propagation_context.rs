use crate::containers::KeyedVec;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainChange;
use crate::engine::domains::EmptyDomain;
use crate::engine::domains::Value;
use crate::engine::variables::Variable;
use crate::engine::variables::VariableId;

/// Gives a [`Relation`](super::Relation) read and restrict access to the derived domains of the
/// constraint's scope. Variables are addressed by their position in the scope.
///
/// Every change is recorded so the engine can schedule the constraints affected by it.
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    variables: &'a mut KeyedVec<VariableId, Option<Variable>>,
    scope: &'a [VariableId],
    changes: &'a mut Vec<(VariableId, DomainChange)>,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(
        variables: &'a mut KeyedVec<VariableId, Option<Variable>>,
        scope: &'a [VariableId],
        changes: &'a mut Vec<(VariableId, DomainChange)>,
    ) -> PropagationContextMut<'a> {
        PropagationContextMut {
            variables,
            scope,
            changes,
        }
    }

    pub fn arity(&self) -> usize {
        self.scope.len()
    }

    pub fn variable(&self, argument: usize) -> VariableId {
        self.scope[argument]
    }

    pub fn domain(&self, argument: usize) -> &Domain {
        let variable = self.scope[argument];
        match &self.variables[variable] {
            Some(variable) => &variable.derived_domain,
            None => panic!("{variable} in the scope of an executing constraint was removed"),
        }
    }

    pub fn lower_bound(&self, argument: usize) -> Result<Value, EmptyDomain> {
        self.domain(argument).lower_bound().ok_or(EmptyDomain)
    }

    pub fn upper_bound(&self, argument: usize) -> Result<Value, EmptyDomain> {
        self.domain(argument).upper_bound().ok_or(EmptyDomain)
    }

    pub fn intersect(&mut self, argument: usize, domain: &Domain) -> Result<(), EmptyDomain> {
        self.update(argument, |derived| derived.intersect(domain))
    }

    pub fn restrict_bounds(
        &mut self,
        argument: usize,
        lower_bound: Value,
        upper_bound: Value,
    ) -> Result<(), EmptyDomain> {
        self.update(argument, |derived| {
            derived.restrict_bounds(lower_bound, upper_bound)
        })
    }

    pub fn remove(&mut self, argument: usize, value: Value) -> Result<(), EmptyDomain> {
        self.update(argument, |derived| derived.remove(value))
    }

    fn update(
        &mut self,
        argument: usize,
        restriction: impl FnOnce(&mut Domain) -> bool,
    ) -> Result<(), EmptyDomain> {
        let id = self.scope[argument];
        let Some(variable) = self.variables[id].as_mut() else {
            panic!("{id} in the scope of an executing constraint was removed")
        };

        let changed = restriction(&mut variable.derived_domain);
        let emptied = variable.derived_domain.is_empty();

        if changed {
            let change = if emptied {
                DomainChange::Emptied
            } else {
                DomainChange::Restricted
            };
            self.changes.push((id, change));
        }

        if emptied {
            Err(EmptyDomain)
        } else {
            Ok(())
        }
    }
}
