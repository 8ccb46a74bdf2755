//! The reversible record of a merge.
//!
//! Merging a token onto an active token makes the active token stand in for it. A memento does
//! what is needed for that and keeps enough information to undo it exactly:
//!
//! - [`UnificationStrategy::Migrate`] deactivates the variables of the merged token and moves
//!   every constraint on them onto the active token by creating a surrogate copy whose scope has
//!   the merged token's variables replaced by their counterparts. Constraints posted on or
//!   removed from the merged token while it stays merged are migrated or unpaired incrementally.
//! - [`UnificationStrategy::Stack`] keeps the merged token's variables active and posts an
//!   equality between every pair of counterparts.
//!
//! Both strategies push the base domains and specified values of the merged token onto the
//! active token, which is what the integrated base domain of a token variable tracks.
use log::debug;

use super::PlanDatabase;
use super::Token;
use super::TokenId;
use super::TokenState;
use crate::engine::variables::VariableId;
use crate::engine::ConstraintId;
use crate::plandb_assert_eq_simple;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;
use crate::relations::Equal;

/// How a merged token is unified with the token it is merged onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnificationStrategy {
    /// Migrate the constraints of the merged token onto the active token.
    #[default]
    Migrate,
    /// Post equalities between the variables of both tokens.
    Stack,
}

#[derive(Debug)]
pub(crate) enum UnifyMemento {
    Merge(MergeMemento),
    Stack(StackMemento),
}

impl UnifyMemento {
    pub(crate) fn new(
        db: &mut PlanDatabase,
        strategy: UnificationStrategy,
        inactive: TokenId,
        active: TokenId,
    ) -> UnifyMemento {
        plandb_assert_eq_simple!(
            db.token(inactive).variables.len(),
            db.token(active).variables.len(),
            "{inactive} and {active} do not have the same variables"
        );

        match strategy {
            UnificationStrategy::Migrate => {
                UnifyMemento::Merge(MergeMemento::new(db, inactive, active))
            }
            UnificationStrategy::Stack => {
                UnifyMemento::Stack(StackMemento::new(db, inactive, active))
            }
        }
    }

    /// Restores both tokens. When the active token was removed because of the split, its
    /// variables and the constraints on them are already gone.
    pub(crate) fn undo(&mut self, db: &mut PlanDatabase, active_deleted: bool) {
        match self {
            UnifyMemento::Merge(memento) => memento.undo(db, active_deleted),
            UnifyMemento::Stack(memento) => memento.undo(db, active_deleted),
        }
    }

    fn handle_addition_of_inactive_constraint(
        &mut self,
        db: &mut PlanDatabase,
        constraint: ConstraintId,
    ) {
        if let UnifyMemento::Merge(memento) = self {
            memento.migrate_constraint(db, constraint);
        }
    }

    fn handle_removal_of_inactive_constraint(
        &mut self,
        db: &mut PlanDatabase,
        constraint: ConstraintId,
    ) {
        if let UnifyMemento::Merge(memento) = self {
            memento.handle_removal(db, constraint);
        }
    }

    fn migrated_constraints(&self) -> Vec<(ConstraintId, ConstraintId)> {
        match self {
            UnifyMemento::Merge(memento) => memento
                .deactivated
                .iter()
                .copied()
                .zip(memento.surrogates.iter().copied())
                .collect(),
            UnifyMemento::Stack(_) => vec![],
        }
    }
}

/// Two index-aligned lists: the constraints that were on the merged token and the surrogate
/// created for each. Standard constraints of the merged token stay behind and are not recorded.
#[derive(Debug)]
pub(crate) struct MergeMemento {
    inactive: TokenId,
    active: TokenId,
    deactivated: Vec<ConstraintId>,
    surrogates: Vec<ConstraintId>,
    /// Set while undoing, removals of surrogates must not be handled again.
    undoing: bool,
}

impl MergeMemento {
    fn new(db: &mut PlanDatabase, inactive: TokenId, active: TokenId) -> MergeMemento {
        let mut memento = MergeMemento {
            inactive,
            active,
            deactivated: vec![],
            surrogates: vec![],
            undoing: false,
        };

        let inactive_variables = db.token(inactive).variables.clone();
        let active_variables = db.token(active).variables.clone();
        let mut constraints = std::collections::BTreeSet::new();

        // the state variables necessarily disagree and are left alone
        for index in Token::OBJECT..inactive_variables.len() {
            let merged = inactive_variables[index];
            let target = active_variables[index];
            constraints.extend(db.engine.variable(merged).constraints());

            let base_domain = db.engine.variable(merged).base_domain().clone();
            db.handle_base(target, &base_domain);
            if let Some(value) = db.engine.variable(merged).specified_value() {
                db.handle_specified(target, value);
            }

            db.engine.deactivate_variable(merged);
        }

        for constraint in constraints {
            if !db.token(inactive).is_standard_constraint(constraint) {
                memento.migrate_constraint(db, constraint);
            }
        }

        memento
    }

    fn undo(&mut self, db: &mut PlanDatabase, active_deleted: bool) {
        if db.token(self.inactive).terminated {
            return;
        }

        self.undoing = true;
        if !active_deleted {
            for surrogate in self.surrogates.iter().copied() {
                if db.engine.contains_constraint(surrogate) {
                    db.remove_constraint(surrogate);
                }
            }
        }
        self.surrogates.clear();
        self.deactivated.clear();

        if !active_deleted {
            let active_variables = db.token(self.active).variables.clone();
            for &variable in &active_variables[Token::OBJECT..] {
                db.handle_reset(variable);
            }
        }

        let inactive_variables = db.token(self.inactive).variables.clone();
        for &variable in &inactive_variables[Token::OBJECT..] {
            db.engine.undo_deactivation(variable);
            db.handle_reset(variable);
        }
        self.undoing = false;
    }

    /// Records `constraint` as moved off the merged token and creates its surrogate on the active
    /// token.
    fn migrate_constraint(&mut self, db: &mut PlanDatabase, constraint: ConstraintId) {
        plandb_assert_simple!(
            db.state(self.active) == TokenState::Active,
            "constraints can only migrate onto an active token"
        );
        plandb_assert_simple!(
            !db.token(self.inactive).is_standard_constraint(constraint),
            "the standard {constraint} of {} cannot migrate",
            self.inactive
        );

        let active_variables = &db.token(self.active).variables;
        let scope: Vec<VariableId> = db
            .engine
            .constraint(constraint)
            .scope()
            .iter()
            .map(|&variable| match db.token_variable(variable) {
                Some(entry) if entry.token() == self.inactive => active_variables[entry.index()],
                _ => variable,
            })
            .collect();

        let surrogate = db.add_surrogate_constraint(constraint, scope);
        db.counters.num_migrated_constraints += 1;
        debug!(
            "Migrated {constraint} of {} onto {} as {surrogate}",
            self.inactive, self.active
        );

        self.deactivated.push(constraint);
        self.surrogates.push(surrogate);
    }

    fn handle_removal(&mut self, db: &mut PlanDatabase, constraint: ConstraintId) {
        plandb_assert_moderate!(self.deactivated.len() == self.surrogates.len());
        if self.undoing {
            return;
        }

        let Some(position) = self
            .deactivated
            .iter()
            .position(|&deactivated| deactivated == constraint)
        else {
            return;
        };

        let _ = self.deactivated.remove(position);
        let surrogate = self.surrogates.remove(position);
        debug!("Discarding {surrogate}, the surrogate of the removed {constraint}");
        if db.engine.contains_constraint(surrogate) {
            db.remove_constraint(surrogate);
        }
    }
}

/// The equalities posted between the variables of the merged and the active token.
#[derive(Debug)]
pub(crate) struct StackMemento {
    inactive: TokenId,
    active: TokenId,
    equalities: Vec<ConstraintId>,
}

impl StackMemento {
    fn new(db: &mut PlanDatabase, inactive: TokenId, active: TokenId) -> StackMemento {
        let inactive_variables = db.token(inactive).variables.clone();
        let active_variables = db.token(active).variables.clone();
        let mut equalities = vec![];

        for index in Token::OBJECT..inactive_variables.len() {
            let merged = inactive_variables[index];
            let target = active_variables[index];

            let base_domain = db.engine.variable(merged).base_domain().clone();
            db.handle_base(target, &base_domain);
            if let Some(value) = db.engine.variable(merged).specified_value() {
                db.handle_specified(target, value);
            }

            equalities.push(db.insert_constraint(Box::new(Equal), vec![merged, target]));
        }
        debug!("Stacked {inactive} onto {active} with {} equalities", equalities.len());

        StackMemento {
            inactive,
            active,
            equalities,
        }
    }

    fn undo(&mut self, db: &mut PlanDatabase, active_deleted: bool) {
        if db.token(self.inactive).terminated {
            return;
        }

        for equality in self.equalities.drain(..) {
            if !active_deleted && db.engine.contains_constraint(equality) {
                db.remove_constraint(equality);
            }
        }

        if !active_deleted {
            let active_variables = db.token(self.active).variables.clone();
            for &variable in &active_variables[Token::OBJECT..] {
                db.handle_reset(variable);
            }
        }

        let inactive_variables = db.token(self.inactive).variables.clone();
        for &variable in &inactive_variables[Token::OBJECT..] {
            db.handle_reset(variable);
        }
    }
}

// incremental maintenance of merged tokens
impl PlanDatabase {
    /// Migrates a constraint posted on a variable of the merged `token`.
    pub fn handle_addition_of_inactive_constraint(
        &mut self,
        token: TokenId,
        constraint: ConstraintId,
    ) {
        let Some(mut memento) = self.token_mut(token).memento.take() else {
            return;
        };
        debug!("{constraint} was added to the merged {token}");
        memento.handle_addition_of_inactive_constraint(self, constraint);
        self.token_mut(token).memento = Some(memento);
    }

    /// Discards the surrogate of a constraint removed from the merged `token`.
    pub fn handle_removal_of_inactive_constraint(
        &mut self,
        token: TokenId,
        constraint: ConstraintId,
    ) {
        let Some(mut memento) = self.token_mut(token).memento.take() else {
            return;
        };
        memento.handle_removal_of_inactive_constraint(self, constraint);
        self.token_mut(token).memento = Some(memento);
    }

    /// The constraints migrated off the merged `token`, each with its surrogate on the active
    /// token.
    pub fn migrated_constraints(&self, token: TokenId) -> Vec<(ConstraintId, ConstraintId)> {
        self.token(token)
            .memento
            .as_ref()
            .map(UnifyMemento::migrated_constraints)
            .unwrap_or_default()
    }
}
