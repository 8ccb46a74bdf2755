use std::collections::BTreeSet;

use log::debug;

use super::notification::ObjectEvent;
use super::notification::TokenEvent;
use super::unify_memento::UnifyMemento;
use super::PlanDatabase;
use super::Token;
use super::TokenId;
use super::TokenState;
use crate::engine::domains::Domain;
use crate::engine::variables::VariableId;
use crate::engine::ConstraintId;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;

// state transitions
impl PlanDatabase {
    /// Declares that all variables have been added; the token becomes inactive.
    pub fn close(&mut self, token: TokenId) {
        plandb_assert_simple!(self.token(token).incomplete, "{token} is already closed");
        self.token_mut(token).incomplete = false;
        self.notify_token(token, TokenEvent::Added);
    }

    pub fn activate(&mut self, token: TokenId) {
        self.assert_state(token, TokenState::Inactive);

        let state = self.token(token).state_variable();
        self.set_specified(state, TokenState::ACTIVE);
        self.notify_token(token, TokenEvent::Activated);
        plandb_assert_moderate!(self.is_valid(token));
    }

    /// Merges the inactive `token` onto `active`, whose predicate must be the same as or a
    /// specialisation of the predicate of `token`.
    pub fn merge(&mut self, token: TokenId, active: TokenId) {
        self.assert_state(token, TokenState::Inactive);
        self.assert_state(active, TokenState::Active);
        let state = self.token(token).state_variable();
        plandb_assert_simple!(
            self.engine
                .variable(state)
                .derived_domain()
                .is_member(TokenState::MERGED),
            "{token} is not allowed to merge"
        );
        plandb_assert_simple!(
            self.schema()
                .is_a(&self.token(active).predicate, &self.token(token).predicate),
            "cannot merge {} onto {}",
            self.token(token).predicate,
            self.token(active).predicate
        );

        debug!("Merging {token} onto {active}");
        self.set_specified(state, TokenState::MERGED);
        let strategy = self.options().unification;
        let memento = UnifyMemento::new(self, strategy, token, active);

        let entry = self.token_mut(token);
        entry.memento = Some(memento);
        entry.active_token = Some(active);
        self.add_merged_token(active, token);
        self.counters.num_merges += 1;

        self.notify_objects(token, ObjectEvent::Merged);
        self.notify_token(token, TokenEvent::Merged);
        plandb_assert_moderate!(self.is_valid(token));
    }

    /// Undoes a merge, restoring the token and the token it was merged onto.
    pub fn split(&mut self, token: TokenId) {
        self.assert_state(token, TokenState::Merged);
        plandb_assert_moderate!(self.is_valid(token));
        debug!("Splitting {token}");

        let entry = self.token_mut(token);
        let (Some(mut memento), Some(active)) = (entry.memento.take(), entry.active_token.take())
        else {
            panic!("{token} is merged without a memento")
        };

        // detached first, the active state must not take in the base domain of this one
        let state = self.token(token).state_variable();
        self.reset_specified(state);

        let active_deleted = self.remove_merged_token(active, token);
        memento.undo(self, active_deleted);
        self.counters.num_splits += 1;

        self.notify_token(token, TokenEvent::Split);
        plandb_assert_moderate!(self.is_valid(token));
    }

    pub fn reject(&mut self, token: TokenId) {
        self.assert_state(token, TokenState::Inactive);
        plandb_assert_simple!(
            self.token(token).master.is_none(),
            "{token} has a master and cannot be rejected"
        );
        plandb_assert_simple!(self.token(token).rejectable, "{token} is not rejectable");

        let state = self.token(token).state_variable();
        self.set_specified(state, TokenState::REJECTED);
        self.notify_objects(token, ObjectEvent::Rejected);
        self.notify_token(token, TokenEvent::Rejected);
    }

    pub fn reinstate(&mut self, token: TokenId) {
        self.assert_state(token, TokenState::Rejected);

        let state = self.token(token).state_variable();
        self.reset_specified(state);
        self.notify_token(token, TokenEvent::Reinstated);
    }

    /// Returns an active token to inactive. Tokens merged onto it are split and its slaves are
    /// released first.
    pub fn deactivate(&mut self, token: TokenId) {
        self.assert_state(token, TokenState::Active);
        plandb_assert_simple!(
            !self.token(token).committed,
            "{token} is committed and cannot be deactivated"
        );
        plandb_assert_moderate!(self.is_valid(token));

        while let Some(&merged) = self.token(token).merged_tokens.first() {
            self.split(merged);
        }
        while let Some(&slave) = self.token(token).slaves.first() {
            let _ = self.remove_master(slave, token);
        }

        let state = self.token(token).state_variable();
        self.reset_specified(state);
        self.notify_token(token, TokenEvent::Deactivated);
    }

    /// Returns the token to inactive through whichever of deactivate, split or reinstate undoes
    /// its current state.
    pub fn cancel(&mut self, token: TokenId) {
        match self.state(token) {
            TokenState::Active => self.deactivate(token),
            TokenState::Merged => self.split(token),
            TokenState::Rejected => self.reinstate(token),
            state => panic!("{token} is {state} and there is nothing to cancel"),
        }
    }

    pub fn is_pending(&self, token: TokenId) -> bool {
        let entry = self.token(token);
        !entry.incomplete && !entry.committed && !entry.terminated
    }

    pub fn can_be_committed(&self, token: TokenId) -> bool {
        self.is_pending(token) && self.state(token) == TokenState::Active
    }

    /// Irreversibly commits an active token: its state can no longer be anything but active and it
    /// stays alive until the database is purged.
    pub fn commit(&mut self, token: TokenId) {
        plandb_assert_simple!(!self.token(token).committed, "{token} is already committed");
        plandb_assert_simple!(self.can_be_committed(token), "{token} cannot be committed");

        let entry = self.token_mut(token);
        entry.committed = true;
        entry.ref_count += 1;

        let state = entry.state_variable();
        self.engine
            .restrict_base_domain(state, &Domain::singleton(TokenState::ACTIVE));
        self.notify_token(token, TokenEvent::Committed);
    }

    /// Narrows the base domain of every variable but the state variable to its current derived
    /// domain.
    pub fn restrict_base_domains(&mut self, token: TokenId) {
        let variables = self.token(token).variables[Token::OBJECT..].to_vec();
        for variable in variables {
            let derived = self.engine.variable(variable).derived_domain().clone();
            self.engine.restrict_base_domain(variable, &derived);
        }
    }

    /// Whether removing the token from the network cannot lose any restriction on the rest of
    /// the plan.
    pub fn can_be_terminated(&self, token: TokenId) -> bool {
        let entry = self.token(token);
        if entry.terminated {
            return false;
        }
        if self.state(token) == TokenState::Rejected {
            return true;
        }
        if !entry.merged_tokens.is_empty() {
            debug!("{token} cannot be terminated while tokens are merged onto it");
            return false;
        }

        if let Some(active) = entry.active_token {
            let active_entry = self.token(active);
            if !active_entry.committed {
                return false;
            }
            if active_entry.terminated {
                return true;
            }

            // the merged token must not restrict the active token any further
            for index in Token::OBJECT..entry.variables.len() {
                let active_base = self.engine.variable(active_entry.variables[index]).base_domain();
                let derived = self.engine.variable(entry.variables[index]).derived_domain();
                if !active_base.is_subset_of(derived) {
                    debug!("{token} still restricts {active} at position {index}");
                    return false;
                }
            }
        }

        let own: BTreeSet<VariableId> = entry
            .variables
            .iter()
            .chain(entry.local_variables.iter())
            .copied()
            .collect();
        let constraints: BTreeSet<ConstraintId> = own
            .iter()
            .flat_map(|&variable| self.engine.variable(variable).constraints())
            .collect();

        for constraint in constraints {
            if !self.engine.constraint(constraint).is_active() || self.engine.is_redundant(constraint)
            {
                continue;
            }

            let external = self
                .engine
                .constraint(constraint)
                .scope()
                .iter()
                .filter(|&&variable| self.has_parent(variable) && !own.contains(&variable))
                .find(|&&variable| !self.engine.variable(variable).base_domain().is_singleton());
            if let Some(variable) = external {
                debug!("{token} cannot be terminated, {constraint} links it to {variable}");
                return false;
            }
        }

        true
    }

    /// Removes the token from propagation for good: every variable is deactivated so nothing is
    /// relaxed when it is eventually deleted.
    pub fn terminate(&mut self, token: TokenId) {
        plandb_assert_simple!(
            self.can_be_terminated(token),
            "{token} still constrains the plan and cannot be terminated"
        );
        self.terminate_internal(token);
    }

    fn terminate_internal(&mut self, token: TokenId) {
        self.token_mut(token).terminated = true;

        let entry = self.token(token);
        let variables: Vec<VariableId> = entry
            .variables
            .iter()
            .chain(entry.local_variables.iter())
            .copied()
            .collect();
        for variable in variables {
            self.engine.deactivate_variable(variable);
        }

        self.notify_token(token, TokenEvent::Terminated);
    }

    fn assert_state(&self, token: TokenId, expected: TokenState) {
        let actual = self.state(token);
        plandb_assert_simple!(
            actual == expected,
            "{token} must be {expected} but is {actual}"
        );
    }
}

// the master/slave hierarchy and tokens merged onto an active token
impl PlanDatabase {
    /// Detaches `slave` from `master`. The slave is released, unless the master is terminated in
    /// which case a slave with no other references is terminated instead. Returns whether nothing
    /// but the master kept the slave alive.
    pub fn remove_master(&mut self, slave: TokenId, master: TokenId) -> bool {
        plandb_assert_simple!(
            self.token(slave).master == Some(master),
            "{master} is not the master of {slave}"
        );

        let entry = self.token_mut(slave);
        entry.master = None;
        entry.relation = None;
        self.token_mut(master).slaves.retain(|&other| other != slave);

        let will_be_discarded = self.token(slave).ref_count == 1;
        if will_be_discarded && self.token(master).terminated {
            self.terminate_internal(slave);
        } else {
            let _ = self.release_reference(slave);
        }
        will_be_discarded
    }

    fn add_merged_token(&mut self, active: TokenId, token: TokenId) {
        self.assert_state(active, TokenState::Active);
        let entry = self.token_mut(active);
        let _ = entry.merged_tokens.insert(token);
        entry.ref_count += 1;
    }

    /// Returns whether the active token was removed because `token` was its last reference.
    fn remove_merged_token(&mut self, active: TokenId, token: TokenId) -> bool {
        self.assert_state(active, TokenState::Active);
        let _ = self.token_mut(active).merged_tokens.remove(&token);
        self.release_reference(active)
    }

    /// Whether the variable belongs to a token, as one of its variables or a local variable.
    fn has_parent(&self, variable: VariableId) -> bool {
        self.token_variables.contains_key(&variable) || self.local_variable_owner(variable).is_some()
    }
}
