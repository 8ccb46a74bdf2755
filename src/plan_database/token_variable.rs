use super::PlanDatabase;
use super::TokenId;
use super::TokenState;
use crate::engine::domains::Domain;
use crate::engine::domains::Value;
use crate::engine::variables::VariableId;
use crate::plandb_assert_moderate;
use crate::plandb_assert_simple;

/// The token-side bookkeeping of a variable owned by a token.
///
/// The variable itself lives in the constraint engine. Its integrated base domain is the base
/// domain narrowed by the base domains of the variables at the same position on every token
/// merged onto the owner; its specification can be local (a client choice) or implied by a merged
/// token that is specified.
#[derive(Clone, Copy, Debug)]
pub struct TokenVariable {
    token: TokenId,
    index: usize,
    locally_specified: Option<Value>,
}

impl TokenVariable {
    pub(crate) fn new(token: TokenId, index: usize) -> TokenVariable {
        TokenVariable {
            token,
            index,
            locally_specified: None,
        }
    }

    /// The token owning the variable.
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// The position of the variable in the variables of its token.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn locally_specified(&self) -> Option<Value> {
        self.locally_specified
    }
}

impl PlanDatabase {
    pub fn token_variable(&self, variable: VariableId) -> Option<&TokenVariable> {
        self.token_variables.get(&variable)
    }

    fn token_variable_entry(&self, variable: VariableId) -> TokenVariable {
        match self.token_variables.get(&variable) {
            Some(entry) => *entry,
            None => panic!("{variable} is not a token variable"),
        }
    }

    /// Specifies a variable to `value`. Variables of a merged token cannot be specified.
    pub fn specify(&mut self, variable: VariableId, value: Value) {
        if !self.token_variables.contains_key(&variable) {
            self.engine.specify(variable, value);
            return;
        }

        plandb_assert_simple!(
            self.engine.variable(variable).can_be_specified(),
            "{variable} cannot be specified"
        );
        self.set_specified(variable, value);
    }

    /// Retracts a specification. A token variable stays specified if a token merged onto its
    /// owner still implies the value.
    pub fn reset(&mut self, variable: VariableId) {
        if !self.token_variables.contains_key(&variable) {
            self.engine.reset(variable);
            return;
        }

        plandb_assert_simple!(
            self.engine.variable(variable).can_be_specified(),
            "{variable} cannot be reset"
        );
        self.reset_specified(variable);
    }

    /// Specifies without checking whether the variable is specifiable, recording the value as a
    /// local choice.
    pub(crate) fn set_specified(&mut self, variable: VariableId, value: Value) {
        let entry = self.token_variable_entry(variable);
        plandb_assert_simple!(
            self.token(entry.token).active_token.is_none(),
            "{variable} of the merged {} cannot be specified",
            entry.token
        );

        if self.engine.variable(variable).specified_value() != Some(value) {
            self.engine.set_specified(variable, value);
        }
        if let Some(entry) = self.token_variables.get_mut(&variable) {
            entry.locally_specified = Some(value);
        }
    }

    pub(crate) fn reset_specified(&mut self, variable: VariableId) {
        if let Some(entry) = self.token_variables.get_mut(&variable) {
            entry.locally_specified = None;
        }
        let entry = self.token_variable_entry(variable);

        if !self.compute_base_domain(variable) {
            if self.engine.variable(variable).is_specified() {
                self.engine.clear_specified(variable);
            } else {
                self.engine.relax(variable);
            }
        }

        if let Some(active) = self.token(entry.token).active_token {
            let counterpart = self.token(active).variables[entry.index];
            self.handle_reset(counterpart);
        }
    }

    /// Imposes the base domain of a variable merged onto this one.
    pub(crate) fn handle_base(&mut self, variable: VariableId, domain: &Domain) {
        self.engine.restrict_integrated_base_domain(variable, domain);
    }

    /// Specifies the variable as implied by a merged token, unless it is already specified.
    pub(crate) fn handle_specified(&mut self, variable: VariableId, value: Value) {
        let entry = self.token_variable_entry(variable);
        plandb_assert_simple!(self.state(entry.token) == TokenState::Active);
        plandb_assert_simple!(
            self.engine.variable(variable).derived_domain().is_member(value),
            "{value} of a merged token is not in the domain of {variable}"
        );

        if !self.engine.variable(variable).is_specified() {
            self.engine.set_specified(variable, value);
        }
    }

    /// Recomputes the integrated base domain after the tokens merged onto the owner changed, and
    /// relaxes the variable unless it is still specified locally or by a merged token.
    pub(crate) fn handle_reset(&mut self, variable: VariableId) {
        let should_be_specified = self.compute_base_domain(variable);
        if should_be_specified || self.token_variable_entry(variable).locally_specified.is_some() {
            return;
        }

        if self.engine.variable(variable).is_specified() {
            self.engine.clear_specified(variable);
        } else {
            self.engine.relax(variable);
        }
    }

    /// Rebuilds the integrated base domain from the base domain and the counterparts on every
    /// merged token. Returns whether one of those counterparts is specified.
    fn compute_base_domain(&mut self, variable: VariableId) -> bool {
        let entry = self.token_variable_entry(variable);
        let mut integrated = self.engine.variable(variable).base_domain().clone();
        let mut implied: Option<Value> = None;

        for &merged in &self.token(entry.token).merged_tokens {
            let merged_token = self.token(merged);
            plandb_assert_moderate!(merged_token.active_token == Some(entry.token));
            plandb_assert_moderate!(merged_token.variables.len() == self.token(entry.token).variables.len());

            let counterpart = self.engine.variable(merged_token.variables[entry.index]);
            let _ = integrated.intersect(counterpart.base_domain());

            if let Some(value) = counterpart.specified_value() {
                plandb_assert_simple!(
                    implied.map_or(true, |implied| implied == value),
                    "tokens merged onto {} disagree on the value of {variable}",
                    entry.token
                );
                implied = Some(value);
            }
        }

        self.engine.set_integrated_base_domain(variable, integrated);
        implied.is_some()
    }

    /// Whether two token variables sit at the same position and have the same base domain.
    pub fn is_compatible(&self, variable: VariableId, other: VariableId) -> bool {
        match (
            self.token_variables.get(&variable),
            self.token_variables.get(&other),
        ) {
            (Some(lhs), Some(rhs)) => {
                lhs.index == rhs.index
                    && self.engine.variable(variable).base_domain()
                        == self.engine.variable(other).base_domain()
            }
            _ => false,
        }
    }
}
