use std::collections::BTreeSet;

use log::debug;

use super::notification::ConstraintEvent;
use super::notification::Notification;
use super::notification::ObjectEvent;
use super::notification::TokenEvent;
use super::object::Object;
use super::object::ObjectId;
use super::schema::Schema;
use super::schema::SchemaError;
use super::token::Token;
use super::token::TokenId;
use super::token_state::TokenState;
use super::token_variable::TokenVariable;
use super::unify_memento::UnificationStrategy;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::HashMap;
use crate::containers::KeyedVec;
use crate::engine::domains::Domain;
use crate::engine::domains::IntervalDomain;
use crate::engine::domains::PLUS_INFINITY;
use crate::engine::propagation::Relation;
use crate::engine::variables::VariableId;
use crate::engine::ConstraintEngine;
use crate::engine::ConstraintEngineOptions;
use crate::engine::ConstraintId;
use crate::engine::VariableNames;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;
use crate::relations::arithmetic::AddEqual;
use crate::statistics::log_statistic;
use crate::statistics::log_statistic_postfix;

/// The plan database: tokens over a schema of object types and predicates, kept consistent by a
/// [`ConstraintEngine`] it owns.
///
/// Every mutation of tokens and of the variables and constraints attached to them goes through
/// the database, so that merged tokens can keep their unification mementos in step with the
/// network. The engine is only handed out for reading.
#[derive(Debug)]
pub struct PlanDatabase {
    pub(crate) engine: ConstraintEngine,
    schema: Schema,
    objects: KeyedVec<ObjectId, Object>,
    pub(crate) tokens: KeyedVec<TokenId, Option<Token>>,
    pub(crate) token_variables: HashMap<VariableId, TokenVariable>,
    local_variable_owners: HashMap<VariableId, TokenId>,
    global_variables: VariableNames,
    notifications: Vec<Notification>,
    /// Set while the whole database is being torn down.
    purging: bool,
    options: PlanDatabaseOptions,
    pub(crate) counters: Counters,
}

/// Options for the [`PlanDatabase`] which determine how new tokens are built and unified.
#[derive(Clone, Copy, Debug)]
pub struct PlanDatabaseOptions {
    /// The base domain of the start and end variable of every token.
    pub horizon: IntervalDomain,
    /// The base domain of the duration variable of every token.
    pub default_duration: IntervalDomain,
    pub unification: UnificationStrategy,
    pub engine: ConstraintEngineOptions,
}

impl Default for PlanDatabaseOptions {
    fn default() -> Self {
        PlanDatabaseOptions {
            horizon: IntervalDomain::new(0, PLUS_INFINITY),
            default_duration: IntervalDomain::new(0, PLUS_INFINITY),
            unification: UnificationStrategy::default(),
            engine: ConstraintEngineOptions::default(),
        }
    }
}

impl PlanDatabase {
    pub fn new(schema: Schema, options: PlanDatabaseOptions) -> PlanDatabase {
        PlanDatabase {
            engine: ConstraintEngine::new(options.engine),
            schema,
            objects: KeyedVec::default(),
            tokens: KeyedVec::default(),
            token_variables: HashMap::default(),
            local_variable_owners: HashMap::default(),
            global_variables: VariableNames::default(),
            notifications: vec![],
            purging: false,
            options,
            counters: Counters::default(),
        }
    }

    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &PlanDatabaseOptions {
        &self.options
    }

    pub fn is_purging(&self) -> bool {
        self.purging
    }

    /// Takes the notifications raised since the last call, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        if !self.purging {
            self.notifications.push(notification);
        }
    }

    pub(crate) fn notify_token(&mut self, token: TokenId, event: TokenEvent) {
        debug!("{token} {event:?}");
        self.notify(Notification::Token { token, event });
    }

    /// Notifies every object the token could be assigned to.
    pub(crate) fn notify_objects(&mut self, token: TokenId, event: ObjectEvent) {
        let object_variable = self.token(token).object_variable();
        let objects: Vec<ObjectId> = match self.engine.variable(object_variable).base_domain() {
            Domain::Enumerated(values) => values.values().filter_map(ObjectId::from_value).collect(),
            Domain::Interval(_) => vec![],
        };

        for object in objects {
            self.notify(Notification::Object {
                object,
                token,
                event,
            });
        }
    }

    /// Logs the statistics of the engine and the database, see
    /// [`configure_statistic_logging`](crate::statistics::configure_statistic_logging).
    pub fn log_statistics(&self) {
        self.engine.log_statistics();
        self.counters.log_statistics();
        log_statistic_postfix();
    }
}

// objects
impl PlanDatabase {
    pub fn create_object(&mut self, object_type: &str, name: &str) -> Result<ObjectId, SchemaError> {
        if !self.schema.is_object_type(object_type) {
            return Err(SchemaError::UnknownObjectType(object_type.to_owned()));
        }

        let object = self.objects.push(Object {
            name: name.to_owned(),
            object_type: object_type.to_owned(),
        });
        debug!("Created {object} '{name}' of type {object_type}");
        Ok(object)
    }

    pub fn object(&self, object: ObjectId) -> &Object {
        &self.objects[object]
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys()
    }

    /// The objects tokens on `object_type` can be assigned to.
    pub fn objects_of_type(&self, object_type: &str) -> Domain {
        Domain::values(
            self.objects
                .keys()
                .filter(|&object| self.schema.is_a(&self.objects[object].object_type, object_type))
                .map(ObjectId::value),
        )
    }
}

// creating and inspecting tokens
impl PlanDatabase {
    /// Creates a token without a master. Unless `close` is set, parameters can still be added and
    /// the token has to be [closed](PlanDatabase::close) before it takes part in the plan.
    pub fn create_token(
        &mut self,
        predicate: &str,
        rejectable: bool,
        close: bool,
    ) -> Result<TokenId, SchemaError> {
        self.create_token_internal(predicate, rejectable, close, None)
    }

    /// Creates a token as a slave of the active token `master`.
    pub fn create_slave_token(
        &mut self,
        master: TokenId,
        relation: &str,
        predicate: &str,
        rejectable: bool,
        close: bool,
    ) -> Result<TokenId, SchemaError> {
        plandb_assert_simple!(
            self.state(master) == TokenState::Active,
            "slaves can only be added to an active master, {master} is {}",
            self.state(master)
        );
        self.create_token_internal(
            predicate,
            rejectable,
            close,
            Some((master, relation.to_owned())),
        )
    }

    fn create_token_internal(
        &mut self,
        predicate: &str,
        rejectable: bool,
        close: bool,
        master: Option<(TokenId, String)>,
    ) -> Result<TokenId, SchemaError> {
        let Some(object_type) = self.schema.object_type_of(predicate) else {
            return Err(SchemaError::UnknownPredicate(predicate.to_owned()));
        };
        let objects = self.objects_of_type(object_type);
        if objects.is_empty() {
            return Err(SchemaError::NoObjects(object_type.to_owned()));
        }
        let parameters = self.schema.parameters(predicate).map(<[_]>::to_vec).unwrap_or_default();

        let master_token = master.as_ref().map(|(master, _)| *master);
        let token = self
            .tokens
            .push(Some(Token::new(predicate.to_owned(), rejectable, master)));

        let horizon = Domain::from(self.options.horizon);
        let builtin = [
            ("state", TokenState::base_domain(rejectable), false),
            ("object", objects, true),
            ("duration", Domain::from(self.options.default_duration), true),
            ("start", horizon.clone(), true),
            ("end", horizon, true),
        ];
        for (name, domain, can_be_specified) in builtin {
            let _ = self.add_token_variable(token, domain, can_be_specified, name);
        }
        for (name, domain) in parameters {
            let _ = self.add_token_variable(token, domain, true, &name);
        }

        let (start, duration, end) = {
            let token = self.token(token);
            (token.start(), token.duration(), token.end())
        };
        let temporal = self.insert_constraint(Box::new(AddEqual), vec![start, duration, end]);
        let _ = self.token_mut(token).standard_constraints.insert(temporal);

        if let Some(master) = master_token {
            self.token_mut(master).slaves.push(token);
        }
        debug!("Created {token} of {predicate}");

        if close {
            self.close(token);
        }
        Ok(token)
    }

    /// Adds a parameter to a token which is not yet closed.
    pub fn add_parameter(&mut self, token: TokenId, name: &str, base_domain: Domain) -> VariableId {
        plandb_assert_simple!(
            self.token(token).incomplete,
            "parameters can only be added before {token} is closed"
        );
        self.add_token_variable(token, base_domain, true, name)
    }

    fn add_token_variable(
        &mut self,
        token: TokenId,
        base_domain: Domain,
        can_be_specified: bool,
        name: &str,
    ) -> VariableId {
        let variable =
            self.engine
                .create_variable_internal(base_domain, can_be_specified, name.to_owned());
        let index = self.token(token).variables.len();
        self.token_mut(token).variables.push(variable);
        let _ = self
            .token_variables
            .insert(variable, TokenVariable::new(token, index));
        variable
    }

    pub fn contains_token(&self, token: TokenId) -> bool {
        self.try_token(token).is_some()
    }

    pub fn try_token(&self, token: TokenId) -> Option<&Token> {
        self.tokens.get(token).and_then(Option::as_ref)
    }

    pub fn token(&self, token: TokenId) -> &Token {
        match self.try_token(token) {
            Some(entry) => entry,
            None => panic!("{token} does not refer to a live token"),
        }
    }

    pub(crate) fn token_mut(&mut self, token: TokenId) -> &mut Token {
        match self.tokens.get_mut(token).and_then(Option::as_mut) {
            Some(entry) => entry,
            None => panic!("{token} does not refer to a live token"),
        }
    }

    /// The live tokens in creation order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens.keys().filter(|&token| self.contains_token(token))
    }

    pub fn state(&self, token: TokenId) -> TokenState {
        let entry = self.token(token);
        if entry.incomplete {
            return TokenState::Incomplete;
        }

        self.engine
            .variable(entry.state_variable())
            .specified_value()
            .and_then(TokenState::from_value)
            .unwrap_or(TokenState::Inactive)
    }

    pub fn unqualified_predicate(&self, token: TokenId) -> &str {
        Schema::unqualified_name(&self.token(token).predicate)
    }

    /// Looks a variable up by name: the token's own variables, then its local variables, then the
    /// global variables.
    pub fn variable(&self, token: TokenId, name: &str) -> Option<VariableId> {
        let entry = self.token(token);
        entry
            .variables
            .iter()
            .chain(entry.local_variables.iter())
            .copied()
            .find(|&variable| self.engine.variable(variable).name() == name)
            .or_else(|| self.global_variables.get_variable_by_name(name))
    }

    pub fn slave(&self, token: TokenId, position: usize) -> Option<TokenId> {
        self.token(token).slaves.get(position).copied()
    }

    pub fn slave_position(&self, token: TokenId, slave: TokenId) -> Option<usize> {
        self.token(token)
            .slaves
            .iter()
            .position(|&other| other == slave)
    }

    /// Whether the structural invariants of the token hold for its current state.
    pub fn is_valid(&self, token: TokenId) -> bool {
        let Some(entry) = self.try_token(token) else {
            return false;
        };

        let state_base = self.engine.variable(entry.state_variable()).base_domain();
        if !state_base.is_subset_of(&TokenState::base_domain(true)) {
            debug!("{token} has a state outside the decided states");
            return false;
        }
        if entry.master.is_some_and(|master| !self.contains_token(master)) {
            debug!("{token} has a dangling master");
            return false;
        }

        let valid = match self.state(token) {
            TokenState::Active => entry.memento.is_none() && entry.active_token.is_none(),
            TokenState::Merged => {
                entry.merged_tokens.is_empty()
                    && entry.memento.is_some()
                    && entry
                        .active_token
                        .is_some_and(|active| self.contains_token(active))
                    && entry.slaves.is_empty()
            }
            TokenState::Rejected | TokenState::Inactive | TokenState::Incomplete => {
                entry.merged_tokens.is_empty()
                    && entry.memento.is_none()
                    && entry.active_token.is_none()
                    && entry.slaves.is_empty()
            }
        };
        if !valid {
            debug!("{token} is not consistent with being {}", self.state(token));
        }
        valid
    }

    /// The active tokens `token` could be merged onto: their predicate is the same as or a
    /// specialisation of the predicate of `token`, and every variable except the state variable
    /// still shares a value with its counterpart. With `exact`, counterparts must also have equal
    /// base domains.
    ///
    /// Propagates first; an inconsistent network has no candidates.
    pub fn compatible_tokens(&mut self, token: TokenId, exact: bool) -> Vec<TokenId> {
        if !self.propagate() {
            return vec![];
        }

        let entry = self.token(token);
        self.tokens()
            .filter(|&candidate| candidate != token)
            .filter(|&candidate| self.state(candidate) == TokenState::Active)
            .filter(|&candidate| {
                let other = self.token(candidate);
                self.schema.is_a(&other.predicate, &entry.predicate)
                    && other.variables.len() == entry.variables.len()
                    && (Token::OBJECT..entry.variables.len()).all(|index| {
                        let ours = entry.variables[index];
                        let theirs = other.variables[index];
                        let ours_domain = self.engine.variable(ours).derived_domain();
                        let theirs_domain = self.engine.variable(theirs).derived_domain();

                        let overlap = (ours_domain.is_empty() && theirs_domain.is_empty())
                            || ours_domain.intersects(theirs_domain);
                        overlap && (!exact || self.is_compatible(ours, theirs))
                    })
            })
            .collect()
    }
}

// variables and constraints, routed so merged tokens keep their mementos up to date
impl PlanDatabase {
    pub fn create_global_variable(&mut self, name: &str, base_domain: Domain) -> VariableId {
        let variable = self.engine.create_variable(base_domain, name);
        self.global_variables.add(variable, name.to_owned());
        variable
    }

    pub fn global_variable(&self, name: &str) -> Option<VariableId> {
        self.global_variables.get_variable_by_name(name)
    }

    pub fn global_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.global_variables.variables()
    }

    /// Creates a variable in the scope of `token`, e.g. a guard or an intermediate of a rule.
    pub fn create_local_variable(
        &mut self,
        token: TokenId,
        name: &str,
        base_domain: Domain,
    ) -> VariableId {
        let variable = self.engine.create_variable(base_domain, name);
        let _ = self.token_mut(token).local_variables.insert(variable);
        let _ = self.local_variable_owners.insert(variable, token);
        variable
    }

    pub fn local_variable_owner(&self, variable: VariableId) -> Option<TokenId> {
        self.local_variable_owners.get(&variable).copied()
    }

    /// Removes a local variable of `token` together with its constraints.
    pub fn remove_local_variable(&mut self, token: TokenId, variable: VariableId) {
        plandb_assert_simple!(
            self.token(token).local_variables.contains(&variable),
            "{variable} is not a local variable of {token}"
        );
        let _ = self.token_mut(token).local_variables.remove(&variable);
        self.remove_variable(variable);
    }

    pub fn create_constraint(
        &mut self,
        name: &str,
        scope: &[VariableId],
    ) -> Result<ConstraintId, ConstraintOperationError> {
        let relation = self.engine.registry().create(name)?;
        self.add_boxed_constraint(relation, scope)
    }

    pub fn add_constraint(
        &mut self,
        relation: impl Relation + 'static,
        scope: &[VariableId],
    ) -> Result<ConstraintId, ConstraintOperationError> {
        self.add_boxed_constraint(Box::new(relation), scope)
    }

    fn add_boxed_constraint(
        &mut self,
        relation: Box<dyn Relation>,
        scope: &[VariableId],
    ) -> Result<ConstraintId, ConstraintOperationError> {
        let constraint = self.engine.add_boxed_constraint(relation, scope.to_vec())?;
        self.handle_constraint_added(constraint);
        Ok(constraint)
    }

    /// Adds a constraint built by the database itself, whose scope is known to fit.
    pub(crate) fn insert_constraint(
        &mut self,
        relation: Box<dyn Relation>,
        scope: Vec<VariableId>,
    ) -> ConstraintId {
        let constraint = self.engine.insert_constraint(relation, scope, None);
        self.handle_constraint_added(constraint);
        constraint
    }

    /// Copies `original` over `scope`, recording it as the source of the copy.
    pub(crate) fn add_surrogate_constraint(
        &mut self,
        original: ConstraintId,
        scope: Vec<VariableId>,
    ) -> ConstraintId {
        let constraint = self.engine.add_surrogate_constraint(original, scope);
        self.handle_constraint_added(constraint);
        constraint
    }

    fn handle_constraint_added(&mut self, constraint: ConstraintId) {
        self.notify(Notification::Constraint {
            constraint,
            event: ConstraintEvent::Added,
        });

        // active constraints, on the state variable of a merged token, stay where they are
        if self.engine.constraint(constraint).is_active() {
            return;
        }
        for token in self.merged_owners(constraint) {
            self.handle_addition_of_inactive_constraint(token, constraint);
        }
    }

    /// Removes a constraint. Tokens merged while the constraint was on one of their variables drop
    /// the surrogate they created for it.
    pub fn remove_constraint(&mut self, constraint: ConstraintId) {
        if !self.engine.constraint(constraint).is_active() {
            for token in self.merged_owners(constraint) {
                self.handle_removal_of_inactive_constraint(token, constraint);
            }
        }

        let owners: BTreeSet<TokenId> = self
            .engine
            .constraint(constraint)
            .scope()
            .iter()
            .filter_map(|variable| self.token_variables.get(variable))
            .map(TokenVariable::token)
            .collect();
        for owner in owners {
            let _ = self.token_mut(owner).standard_constraints.remove(&constraint);
        }

        self.engine.remove_constraint(constraint);
        self.notify(Notification::Constraint {
            constraint,
            event: ConstraintEvent::Removed,
        });
    }

    /// The merged tokens with a variable in the scope of `constraint`.
    fn merged_owners(&self, constraint: ConstraintId) -> BTreeSet<TokenId> {
        self.engine
            .constraint(constraint)
            .scope()
            .iter()
            .filter_map(|variable| self.token_variables.get(variable))
            .map(TokenVariable::token)
            .filter(|&token| self.token(token).memento.is_some())
            .collect()
    }

    /// Removes a variable and every constraint on it.
    pub(crate) fn remove_variable(&mut self, variable: VariableId) {
        let constraints: BTreeSet<ConstraintId> =
            self.engine.variable(variable).constraints().collect();
        for constraint in constraints {
            if self.engine.contains_constraint(constraint) {
                self.remove_constraint(constraint);
            }
        }

        self.engine.remove_variable(variable);
        let _ = self.token_variables.remove(&variable);
        let _ = self.local_variable_owners.remove(&variable);
        let _ = self.global_variables.remove(variable);
    }

    pub fn restrict(&mut self, variable: VariableId, domain: &Domain) -> bool {
        self.engine.restrict(variable, domain)
    }

    pub fn relax(&mut self, variable: VariableId) {
        self.engine.relax(variable)
    }

    /// Permanently narrows the base domain of a variable.
    pub fn restrict_base_domain(&mut self, variable: VariableId, domain: &Domain) {
        self.engine.restrict_base_domain(variable, domain)
    }

    pub fn propagate(&mut self) -> bool {
        self.engine.propagate()
    }

    pub fn is_proven_inconsistent(&self) -> bool {
        self.engine.is_proven_inconsistent()
    }
}

// removal
impl PlanDatabase {
    /// Releases the client's reference to the token. It is removed as soon as nothing else keeps
    /// it alive: a commitment, or tokens merged onto it.
    pub fn delete_token(&mut self, token: TokenId) {
        plandb_assert_simple!(
            !self.token(token).discarded,
            "{token} has already been deleted"
        );
        self.token_mut(token).discarded = true;
        let _ = self.release_reference(token);
    }

    /// Drops one reference, removing the token when it was the last. Returns whether the token
    /// was removed.
    pub(crate) fn release_reference(&mut self, token: TokenId) -> bool {
        let entry = self.token_mut(token);
        plandb_assert_simple!(entry.ref_count > 0);
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return false;
        }

        self.destroy_token(token);
        true
    }

    /// Unlinks the token from everything it is related to and removes it with its variables.
    fn destroy_token(&mut self, token: TokenId) {
        debug!("Removing {token}");
        plandb_assert_moderate!(self.is_valid(token));

        if !matches!(self.state(token), TokenState::Inactive | TokenState::Incomplete) {
            self.cancel(token);
        }
        self.notify_objects(token, ObjectEvent::Deleted);

        if let Some(master) = self.token_mut(token).master.take() {
            self.token_mut(master).slaves.retain(|&slave| slave != token);
        }

        let entry = self.token(token);
        let variables: Vec<VariableId> = entry
            .variables
            .iter()
            .chain(entry.local_variables.iter())
            .copied()
            .collect();
        for variable in variables {
            self.remove_variable(variable);
        }

        self.tokens[token] = None;
        self.notify_token(token, TokenEvent::Removed);
    }

    /// Tears down every token together with all variables and constraints in the network, without
    /// any relaxation or notification. Objects and the schema are kept.
    pub fn purge(&mut self) {
        self.purging = true;
        debug!("Purging the plan database");

        for token in self.tokens.iter_mut() {
            *token = None;
        }
        self.token_variables.clear();
        self.local_variable_owners.clear();
        self.global_variables = VariableNames::default();
        self.engine.purge();

        self.purging = false;
    }
}

/// Structure responsible for storing several statistics of the [`PlanDatabase`].
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Counters {
    pub(crate) num_merges: u64,
    pub(crate) num_splits: u64,
    pub(crate) num_migrated_constraints: u64,
}

impl Counters {
    fn log_statistics(&self) {
        log_statistic("numberOfMerges", self.num_merges);
        log_statistic("numberOfSplits", self.num_splits);
        log_statistic("numberOfMigratedConstraints", self.num_migrated_constraints);
    }
}
