use std::collections::BTreeSet;

use log::trace;

use crate::basic_types::Inconsistency;
use crate::containers::KeyedVec;
use crate::engine::constraint::Constraint;
use crate::engine::constraint::ConstraintId;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainChange;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::variables::Variable;
use crate::engine::variables::VariableId;

/// The variables and constraints of the engine, together with the record of which variables were
/// emptied and which domain changes have not been dispatched yet.
///
/// Removed entities leave a [`None`] slot behind so identifiers are never reused.
#[derive(Debug, Default)]
pub(crate) struct ConstraintNetwork {
    pub(crate) variables: KeyedVec<VariableId, Option<Variable>>,
    pub(crate) constraints: KeyedVec<ConstraintId, Option<Constraint>>,
    pending_changes: Vec<(VariableId, DomainChange)>,
    empty_variables: BTreeSet<VariableId>,
    violated_constraint: Option<ConstraintId>,
}

impl ConstraintNetwork {
    pub(crate) fn try_variable(&self, variable: VariableId) -> Option<&Variable> {
        self.variables.get(variable).and_then(Option::as_ref)
    }

    pub(crate) fn variable(&self, variable: VariableId) -> &Variable {
        match self.try_variable(variable) {
            Some(entry) => entry,
            None => panic!("{variable} does not refer to a live variable"),
        }
    }

    pub(crate) fn variable_mut(&mut self, variable: VariableId) -> &mut Variable {
        match self.variables.get_mut(variable).and_then(Option::as_mut) {
            Some(entry) => entry,
            None => panic!("{variable} does not refer to a live variable"),
        }
    }

    pub(crate) fn try_constraint(&self, constraint: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(constraint).and_then(Option::as_ref)
    }

    pub(crate) fn constraint(&self, constraint: ConstraintId) -> &Constraint {
        match self.try_constraint(constraint) {
            Some(entry) => entry,
            None => panic!("{constraint} does not refer to a live constraint"),
        }
    }

    pub(crate) fn constraint_mut(&mut self, constraint: ConstraintId) -> &mut Constraint {
        match self.constraints.get_mut(constraint).and_then(Option::as_mut) {
            Some(entry) => entry,
            None => panic!("{constraint} does not refer to a live constraint"),
        }
    }

    pub(crate) fn is_proven_inconsistent(&self) -> bool {
        !self.empty_variables.is_empty() || self.violated_constraint.is_some()
    }

    pub(crate) fn empty_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.empty_variables.iter().copied()
    }

    pub(crate) fn violated_constraint(&self) -> Option<ConstraintId> {
        self.violated_constraint
    }

    /// Forgets the inconsistency, returning the variables that were empty.
    pub(crate) fn clear_inconsistency(&mut self) -> BTreeSet<VariableId> {
        self.violated_constraint = None;
        std::mem::take(&mut self.empty_variables)
    }

    pub(crate) fn forget_variable(&mut self, variable: VariableId) {
        let _ = self.empty_variables.remove(&variable);
    }

    /// A constraint is redundant when every variable in its scope is a singleton.
    pub(crate) fn is_redundant(&self, constraint: ConstraintId) -> bool {
        self.constraint(constraint)
            .scope
            .iter()
            .all(|&variable| self.variable(variable).derived_domain.is_singleton())
    }

    /// Applies `update` to the derived domain of `variable` and records `change` if it had an
    /// effect. A derived domain that ends up empty is always recorded as emptied.
    pub(crate) fn update_derived(
        &mut self,
        variable: VariableId,
        change: DomainChange,
        update: impl FnOnce(&mut Domain) -> bool,
    ) -> bool {
        let entry = self.variable_mut(variable);
        let changed = update(&mut entry.derived_domain);

        if entry.derived_domain.is_empty() {
            self.pending_changes.push((variable, DomainChange::Emptied));
        } else if changed {
            self.pending_changes.push((variable, change));
        }

        changed
    }

    /// Records a change that happened without the derived domain being touched, e.g. a forced
    /// relaxation that turned out to be a no-op but must still cascade.
    pub(crate) fn record_change(&mut self, variable: VariableId, change: DomainChange) {
        self.pending_changes.push((variable, change));
    }

    /// Runs the relation of `constraint` on its scope.
    pub(crate) fn execute(&mut self, constraint: ConstraintId) {
        let Some(entry) = self.constraints.get(constraint).and_then(Option::as_ref) else {
            panic!("{constraint} does not refer to a live constraint")
        };
        trace!("Executing {} {constraint}", entry.relation.name());

        let context = PropagationContextMut::new(
            &mut self.variables,
            &entry.scope,
            &mut self.pending_changes,
        );

        if let Err(Inconsistency::Violated) = entry.relation.propagate(context) {
            trace!("{constraint} found the network inconsistent");
            self.violated_constraint = Some(constraint);
        }
    }

    /// Takes the changes recorded since the last call. Emptied active variables make the network
    /// inconsistent.
    pub(crate) fn drain_changes(&mut self) -> Vec<(VariableId, DomainChange)> {
        let changes = std::mem::take(&mut self.pending_changes);

        for &(variable, change) in &changes {
            if change == DomainChange::Emptied
                && self
                    .try_variable(variable)
                    .is_some_and(|entry| entry.is_active())
            {
                let _ = self.empty_variables.insert(variable);
            }
        }

        changes
    }

    /// The constraints that have to be scheduled after `variable` underwent `change`, with the
    /// position of the variable in their scope.
    pub(crate) fn notification_targets(
        &self,
        variable: VariableId,
        change: DomainChange,
    ) -> Vec<(ConstraintId, usize)> {
        let Some(entry) = self.try_variable(variable) else {
            return vec![];
        };
        if !entry.is_active() || change == DomainChange::Emptied {
            return vec![];
        }

        entry
            .constraints
            .iter()
            .copied()
            .filter(|&(constraint, argument)| {
                let constraint = self.constraint(constraint);
                constraint.is_active()
                    && !constraint
                        .relation
                        .ignored_changes(argument)
                        .contains(change)
            })
            .collect()
    }
}
