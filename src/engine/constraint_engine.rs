use std::collections::BTreeSet;

use log::debug;

use crate::basic_types::ConstraintOperationError;
use crate::basic_types::HashSet;
use crate::engine::constraint::Constraint;
use crate::engine::constraint::ConstraintId;
use crate::engine::constraint_network::ConstraintNetwork;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainChange;
use crate::engine::domains::Value;
use crate::engine::propagation::DefaultPropagator;
use crate::engine::propagation::Relation;
use crate::engine::variables::Variable;
use crate::engine::variables::VariableId;
use crate::engine::ConstraintRegistry;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;
use crate::statistics::log_statistic;

/// A network of variables and constraints that is propagated on request.
///
/// Clients mutate the network (restrict, specify, reset, relax, post and remove constraints) and
/// then call [`ConstraintEngine::propagate`] to converge. Restrictions only schedule constraints;
/// relaxations are handled eagerly: every variable transitively linked to the relaxed one through
/// active constraints is relaxed back to its relaxation target and its constraints are scheduled,
/// so the next propagation recomputes the restrictions that still hold.
///
/// Inconsistency is not an error. A propagation that empties a variable (or a relation that
/// reports a violation) leaves the engine [proven inconsistent](ConstraintEngine::is_proven_inconsistent)
/// until something is relaxed.
#[derive(Debug, Default)]
pub struct ConstraintEngine {
    /// The engine moves between being ready, propagating and relaxing. Relaxing while
    /// propagating is a contract violation.
    state: EngineState,
    network: ConstraintNetwork,
    /// Dictates the order in which constraints are executed.
    propagator: DefaultPropagator,
    registry: ConstraintRegistry,
    /// A set of counters updated during propagation and relaxation.
    counters: Counters,
    options: ConstraintEngineOptions,
}

/// Options for the [`ConstraintEngine`] which determine how it behaves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstraintEngineOptions {
    /// When the engine is already proven inconsistent, [`ConstraintEngine::propagate`] normally
    /// returns `false` straight away. With this set it first relaxes the emptied variables (or
    /// the scope of the violated constraint) and propagates again.
    pub auto_relax_empty_variables: bool,
}

impl ConstraintEngine {
    pub fn new(options: ConstraintEngineOptions) -> ConstraintEngine {
        ConstraintEngine::with_registry(options, ConstraintRegistry::default())
    }

    pub fn with_registry(
        options: ConstraintEngineOptions,
        registry: ConstraintRegistry,
    ) -> ConstraintEngine {
        ConstraintEngine {
            state: EngineState::default(),
            network: ConstraintNetwork::default(),
            propagator: DefaultPropagator::default(),
            registry,
            counters: Counters::default(),
            options,
        }
    }

    pub fn options(&self) -> &ConstraintEngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConstraintRegistry {
        &mut self.registry
    }

    pub fn log_statistics(&self) {
        self.counters.log_statistics()
    }

    /// Drops every variable and constraint at once. Nothing is relaxed or scheduled, identifiers
    /// handed out before stay unused.
    pub fn purge(&mut self) {
        plandb_assert_simple!(self.state.is_ready(), "cannot purge during propagation");
        debug!("Purging the constraint network");

        for variable in self.network.variables.iter_mut() {
            *variable = None;
        }
        for constraint in self.network.constraints.iter_mut() {
            *constraint = None;
        }
        let _ = self.network.clear_inconsistency();
        let _ = self.network.drain_changes();
        self.propagator = DefaultPropagator::default();
    }
}

// methods for creating, inspecting and mutating variables
impl ConstraintEngine {
    pub fn create_variable(&mut self, base_domain: Domain, name: impl Into<String>) -> VariableId {
        self.create_variable_internal(base_domain, true, name.into())
    }

    pub(crate) fn create_variable_internal(
        &mut self,
        base_domain: Domain,
        can_be_specified: bool,
        name: String,
    ) -> VariableId {
        let is_empty = base_domain.is_empty();
        let variable = self.network.variables.push(Some(Variable::new(
            name,
            base_domain,
            can_be_specified,
        )));
        debug!(
            "Created {variable} '{}' with domain {}",
            self.network.variable(variable).name(),
            self.network.variable(variable).base_domain()
        );

        if is_empty {
            self.network.record_change(variable, DomainChange::Emptied);
            self.process_changes();
        }

        variable
    }

    pub fn variable(&self, variable: VariableId) -> &Variable {
        self.network.variable(variable)
    }

    pub fn contains_variable(&self, variable: VariableId) -> bool {
        self.network.try_variable(variable).is_some()
    }

    /// The live variables in creation order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.network
            .variables
            .keys()
            .filter(|&variable| self.network.try_variable(variable).is_some())
    }

    /// Removes the variable together with every constraint in which it appears.
    pub fn remove_variable(&mut self, variable: VariableId) {
        plandb_assert_simple!(
            !self.state.is_propagating(),
            "cannot remove {variable} during propagation"
        );

        let constraints: BTreeSet<ConstraintId> =
            self.network.variable(variable).constraints().collect();
        for constraint in constraints {
            self.remove_constraint(constraint);
        }

        self.network.variables[variable] = None;
        self.network.forget_variable(variable);
        debug!("Removed {variable}");
    }

    /// Restricts the derived domain. The restriction lasts until the variable is relaxed.
    pub fn restrict(&mut self, variable: VariableId, domain: &Domain) -> bool {
        let changed =
            self.network
                .update_derived(variable, DomainChange::Restricted, |derived| {
                    derived.intersect(domain)
                });
        self.process_changes();
        changed
    }

    /// Specifies the variable to `value`. A value outside the derived domain empties it.
    pub fn specify(&mut self, variable: VariableId, value: Value) {
        plandb_assert_simple!(
            self.network.variable(variable).can_be_specified(),
            "{variable} cannot be specified"
        );
        self.set_specified(variable, value);
    }

    pub(crate) fn set_specified(&mut self, variable: VariableId, value: Value) {
        self.network.variable_mut(variable).specified_value = Some(value);
        let _ = self
            .network
            .update_derived(variable, DomainChange::Specified, |derived| {
                derived.set_singleton(value)
            });
        self.process_changes();
    }

    /// Retracts a specification; the derived domain relaxes to the integrated base domain.
    pub fn reset(&mut self, variable: VariableId) {
        plandb_assert_simple!(
            self.network.variable(variable).can_be_specified(),
            "{variable} cannot be reset"
        );
        self.clear_specified(variable);
    }

    pub(crate) fn clear_specified(&mut self, variable: VariableId) {
        if self
            .network
            .variable_mut(variable)
            .specified_value
            .take()
            .is_some()
        {
            self.relax_internal(variable, DomainChange::Reset);
        }
    }

    /// Relaxes the derived domain to the relaxation target and cascades the relaxation.
    pub fn relax(&mut self, variable: VariableId) {
        self.relax_internal(variable, DomainChange::Relaxed);
    }

    fn relax_internal(&mut self, variable: VariableId, change: DomainChange) {
        let target = self.network.variable(variable).relaxation_target();
        let changed = self
            .network
            .update_derived(variable, change, |derived| derived.reset_to(&target));

        if !changed && !target.is_empty() {
            self.network.record_change(variable, change);
        }

        self.process_changes();
    }

    /// Permanently restricts the base domain, and with it the integrated base and derived domain.
    pub fn restrict_base_domain(&mut self, variable: VariableId, domain: &Domain) {
        let entry = self.network.variable_mut(variable);
        let _ = entry.base_domain.intersect(domain);
        let _ = entry.integrated_base_domain.intersect(domain);

        let _ = self
            .network
            .update_derived(variable, DomainChange::Restricted, |derived| {
                derived.intersect(domain)
            });
        self.process_changes();
    }

    /// Narrows the integrated base domain and the derived domain without touching the base domain.
    pub(crate) fn restrict_integrated_base_domain(&mut self, variable: VariableId, domain: &Domain) {
        let _ = self
            .network
            .variable_mut(variable)
            .integrated_base_domain
            .intersect(domain);

        let _ = self
            .network
            .update_derived(variable, DomainChange::Restricted, |derived| {
                derived.intersect(domain)
            });
        self.process_changes();
    }

    /// Overwrites the integrated base domain. Nothing is propagated; callers relax afterwards.
    pub(crate) fn set_integrated_base_domain(&mut self, variable: VariableId, domain: Domain) {
        self.network.variable_mut(variable).integrated_base_domain = domain;
    }

    /// Deactivation is reference counted; the first deactivation deactivates every constraint on
    /// the variable.
    pub fn deactivate_variable(&mut self, variable: VariableId) {
        let entry = self.network.variable_mut(variable);
        entry.deactivation_count += 1;
        if entry.deactivation_count > 1 {
            return;
        }

        debug!("Deactivating {variable}");
        let constraints = entry.constraints.clone();
        for (constraint, _) in constraints {
            self.deactivate_constraint(constraint);
        }
        self.network.forget_variable(variable);
    }

    pub fn undo_deactivation(&mut self, variable: VariableId) {
        let entry = self.network.variable_mut(variable);
        plandb_assert_simple!(
            entry.deactivation_count > 0,
            "{variable} is not deactivated"
        );
        entry.deactivation_count -= 1;
        if entry.deactivation_count > 0 {
            return;
        }

        debug!("Reactivating {variable}");
        let is_empty = entry.derived_domain.is_empty();
        let constraints = entry.constraints.clone();
        for (constraint, _) in constraints {
            self.undo_constraint_deactivation(constraint);
        }

        if is_empty {
            self.network.record_change(variable, DomainChange::Emptied);
            self.process_changes();
        }
    }
}

// methods for posting, inspecting and removing constraints
impl ConstraintEngine {
    /// Creates the constraint registered under `name` over `scope`.
    pub fn create_constraint(
        &mut self,
        name: &str,
        scope: &[VariableId],
    ) -> Result<ConstraintId, ConstraintOperationError> {
        let relation = self.registry.create(name)?;
        self.add_boxed_constraint(relation, scope.to_vec())
    }

    pub fn add_constraint(
        &mut self,
        relation: impl Relation + 'static,
        scope: &[VariableId],
    ) -> Result<ConstraintId, ConstraintOperationError> {
        self.add_boxed_constraint(Box::new(relation), scope.to_vec())
    }

    /// Creates a copy of `original` over `scope` which records `original` as its source.
    pub(crate) fn add_surrogate_constraint(
        &mut self,
        original: ConstraintId,
        scope: Vec<VariableId>,
    ) -> ConstraintId {
        let relation = self.network.constraint(original).relation.boxed_clone();
        self.insert_constraint(relation, scope, Some(original))
    }

    pub(crate) fn add_boxed_constraint(
        &mut self,
        relation: Box<dyn Relation>,
        scope: Vec<VariableId>,
    ) -> Result<ConstraintId, ConstraintOperationError> {
        if let Some(expected) = relation.arity() {
            if expected != scope.len() {
                return Err(ConstraintOperationError::ArityMismatch {
                    name: relation.name().to_owned(),
                    expected,
                    actual: scope.len(),
                });
            }
        }

        if let Some(&invalid) = scope
            .iter()
            .find(|&&variable| self.network.try_variable(variable).is_none())
        {
            return Err(ConstraintOperationError::InvalidVariable(invalid));
        }

        Ok(self.insert_constraint(relation, scope, None))
    }

    /// Adds a constraint whose scope is known to fit the relation.
    pub(crate) fn insert_constraint(
        &mut self,
        relation: Box<dyn Relation>,
        scope: Vec<VariableId>,
        source: Option<ConstraintId>,
    ) -> ConstraintId {
        plandb_assert_simple!(relation.arity().map_or(true, |arity| arity == scope.len()));

        let deactivation_count = scope
            .iter()
            .filter(|&&variable| !self.network.variable(variable).is_active())
            .count() as u32;

        let constraint = self.network.constraints.push(Some(Constraint {
            relation,
            scope,
            deactivation_count,
            source,
        }));

        let entry = self.network.constraint(constraint);
        debug!(
            "Added {} {constraint} over {:?}",
            entry.name(),
            entry.scope()
        );

        for argument in 0..self.network.constraint(constraint).scope.len() {
            let variable = self.network.constraint(constraint).scope[argument];
            self.network
                .variable_mut(variable)
                .constraints
                .push((constraint, argument));
        }

        if deactivation_count == 0 {
            self.propagator.handle_constraint_added(constraint);
        }

        constraint
    }

    pub fn constraint(&self, constraint: ConstraintId) -> &Constraint {
        self.network.constraint(constraint)
    }

    pub fn contains_constraint(&self, constraint: ConstraintId) -> bool {
        self.network.try_constraint(constraint).is_some()
    }

    /// The live constraints in creation order.
    pub fn constraints(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.network
            .constraints
            .keys()
            .filter(|&constraint| self.network.try_constraint(constraint).is_some())
    }

    /// Whether every variable in the scope of the constraint is a singleton.
    pub fn is_redundant(&self, constraint: ConstraintId) -> bool {
        self.network.is_redundant(constraint)
    }

    /// Removes a constraint. If it was active, its scope is relaxed.
    pub fn remove_constraint(&mut self, constraint: ConstraintId) {
        plandb_assert_simple!(
            !self.state.is_propagating(),
            "cannot remove {constraint} during propagation"
        );

        let Some(removed) = self
            .network
            .constraints
            .get_mut(constraint)
            .and_then(Option::take)
        else {
            panic!("{constraint} does not refer to a live constraint")
        };

        self.propagator.handle_constraint_removed(constraint);
        for &variable in &removed.scope {
            if let Some(entry) = self.network.variables.get_mut(variable).and_then(Option::as_mut) {
                entry.constraints.retain(|&(other, _)| other != constraint);
            }
        }
        debug!("Removed {} {constraint}", removed.name());

        if removed.is_active() {
            for variable in removed.scope {
                self.relax(variable);
            }
        }
    }

    pub fn deactivate_constraint(&mut self, constraint: ConstraintId) {
        let entry = self.network.constraint_mut(constraint);
        entry.deactivation_count += 1;
        if entry.deactivation_count == 1 {
            self.propagator.handle_constraint_deactivated(constraint);
        }
    }

    pub fn undo_constraint_deactivation(&mut self, constraint: ConstraintId) {
        let entry = self.network.constraint_mut(constraint);
        plandb_assert_simple!(
            entry.deactivation_count > 0,
            "{constraint} is not deactivated"
        );
        entry.deactivation_count -= 1;
        if entry.deactivation_count == 0 {
            self.propagator.handle_constraint_activated(constraint);
        }
    }
}

// propagation
impl ConstraintEngine {
    /// Executes scheduled constraints until a fixed point or an inconsistency. Returns whether the
    /// network is consistent.
    pub fn propagate(&mut self) -> bool {
        plandb_assert_simple!(
            self.state.is_ready(),
            "propagation cannot be started from within propagation or relaxation"
        );

        if self.network.is_proven_inconsistent() {
            if !self.options.auto_relax_empty_variables {
                return false;
            }
            self.relax_inconsistency();
            if self.network.is_proven_inconsistent() {
                return false;
            }
        }

        self.counters.num_propagations += 1;
        self.state.declare_propagating();
        while self.propagator.update_required() && !self.network.is_proven_inconsistent() {
            self.counters.num_constraint_executions += self.propagator.execute(&mut self.network);
        }
        self.state.declare_ready();

        if self.network.is_proven_inconsistent() {
            self.counters.num_inconsistencies += 1;
            debug!("Propagation proved the network inconsistent");
            false
        } else {
            true
        }
    }

    pub fn is_proven_inconsistent(&self) -> bool {
        self.network.is_proven_inconsistent()
    }

    /// Whether constraints are waiting to be executed.
    pub fn pending(&self) -> bool {
        self.propagator.update_required()
    }

    pub fn is_propagating(&self) -> bool {
        self.state.is_propagating()
    }

    pub fn empty_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.network.empty_variables()
    }

    pub fn violated_constraint(&self) -> Option<ConstraintId> {
        self.network.violated_constraint()
    }

    fn relax_inconsistency(&mut self) {
        let culprits: Vec<VariableId> = match self.network.violated_constraint() {
            Some(constraint) => self.network.constraint(constraint).scope.clone(),
            None => self.network.empty_variables().collect(),
        };
        debug!("Relaxing {} variables to recover from inconsistency", culprits.len());

        for variable in culprits {
            if self.network.try_variable(variable).is_some() {
                self.relax(variable);
            }
        }
    }

    /// Dispatches the recorded domain changes: relaxations cascade, every change schedules the
    /// constraints interested in it.
    fn process_changes(&mut self) {
        for (variable, change) in self.network.drain_changes() {
            if !change.is_restriction()
                && self
                    .network
                    .try_variable(variable)
                    .is_some_and(Variable::is_active)
            {
                self.handle_relax(variable);
            }
            self.notify_constraints(variable, change);
        }
    }

    fn notify_constraints(&mut self, variable: VariableId, change: DomainChange) {
        for (constraint, argument) in self.network.notification_targets(variable, change) {
            self.propagator
                .handle_notification(variable, argument, constraint, change);
        }
    }

    fn handle_relax(&mut self, variable: VariableId) {
        plandb_assert_simple!(
            !self.state.is_propagating(),
            "{variable} cannot be relaxed during propagation"
        );
        if self.state.is_relaxing() {
            return;
        }

        self.state.declare_relaxing();
        self.counters.num_relaxations += 1;

        let mut to_relax = vec![variable];
        let mut visited: HashSet<VariableId> = HashSet::default();
        let _ = visited.insert(variable);

        // Emptied variables are relaxed as well, otherwise the network stays inconsistent.
        for emptied in self.network.clear_inconsistency() {
            if visited.insert(emptied) {
                to_relax.push(emptied);
            }
        }

        let mut index = 0;
        while index < to_relax.len() {
            let current = to_relax[index];
            index += 1;

            for &(constraint, _) in &self.network.variable(current).constraints {
                let constraint = self.network.constraint(constraint);
                if !constraint.is_active() {
                    continue;
                }
                for &linked in &constraint.scope {
                    if self.network.variable(linked).is_active() && visited.insert(linked) {
                        to_relax.push(linked);
                    }
                }
            }
        }

        debug!(
            "Relaxation of {variable} cascades to {} variables",
            to_relax.len() - 1
        );

        for &linked in &to_relax[1..] {
            let target = self.network.variable(linked).relaxation_target();
            let _ = self
                .network
                .update_derived(linked, DomainChange::Relaxed, |derived| {
                    derived.reset_to(&target)
                });
        }
        if self.network.variable(variable).derived_domain.is_empty() {
            self.network.record_change(variable, DomainChange::Emptied);
        }

        for (linked, change) in self.network.drain_changes() {
            self.notify_constraints(linked, change);
        }

        plandb_assert_moderate!(self.state.is_relaxing());
        self.state.declare_ready();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum EngineStateInternal {
    #[default]
    Ready,
    Propagating,
    Relaxing,
}

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    internal_state: EngineStateInternal,
}

impl EngineState {
    pub(crate) fn is_ready(&self) -> bool {
        self.internal_state == EngineStateInternal::Ready
    }

    pub(crate) fn is_propagating(&self) -> bool {
        self.internal_state == EngineStateInternal::Propagating
    }

    pub(crate) fn is_relaxing(&self) -> bool {
        self.internal_state == EngineStateInternal::Relaxing
    }

    fn declare_propagating(&mut self) {
        plandb_assert_simple!(self.is_ready());
        self.internal_state = EngineStateInternal::Propagating;
    }

    fn declare_relaxing(&mut self) {
        plandb_assert_simple!(self.is_ready());
        self.internal_state = EngineStateInternal::Relaxing;
    }

    fn declare_ready(&mut self) {
        self.internal_state = EngineStateInternal::Ready;
    }
}

/// Structure responsible for storing several statistics of the [`ConstraintEngine`].
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Counters {
    num_propagations: u64,
    num_constraint_executions: u64,
    num_relaxations: u64,
    num_inconsistencies: u64,
}

impl Counters {
    fn log_statistics(&self) {
        log_statistic("numberOfPropagations", self.num_propagations);
        log_statistic("numberOfConstraintExecutions", self.num_constraint_executions);
        log_statistic("numberOfRelaxations", self.num_relaxations);
        log_statistic("numberOfInconsistencies", self.num_inconsistencies);
    }
}
