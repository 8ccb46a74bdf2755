use std::collections::BTreeSet;

use super::unify_memento::UnifyMemento;
use crate::engine::variables::VariableId;
use crate::engine::ConstraintId;

crate::storage_key!(
    /// An identifier to a token of the [`PlanDatabase`](super::PlanDatabase).
    TokenId
);

// positions of the built-in variables of every token, parameters follow `END`
impl Token {
    pub const STATE: usize = 0;
    pub const OBJECT: usize = 1;
    pub const DURATION: usize = 2;
    pub const START: usize = 3;
    pub const END: usize = 4;
}

/// A parametric, temporally scoped assertion about an object.
///
/// Tokens are owned by the [`PlanDatabase`](super::PlanDatabase); all lifecycle operations go
/// through it since they touch the constraint network, the master and the tokens this one is
/// merged with.
#[derive(Debug)]
pub struct Token {
    pub(crate) predicate: String,
    pub(crate) master: Option<TokenId>,
    pub(crate) relation: Option<String>,
    pub(crate) variables: Vec<VariableId>,
    pub(crate) local_variables: BTreeSet<VariableId>,
    /// In the order in which they were added.
    pub(crate) slaves: Vec<TokenId>,
    pub(crate) standard_constraints: BTreeSet<ConstraintId>,
    /// The tokens merged onto this one, if it is active.
    pub(crate) merged_tokens: BTreeSet<TokenId>,
    /// The token this one is merged onto, if it is merged.
    pub(crate) active_token: Option<TokenId>,
    pub(crate) memento: Option<UnifyMemento>,
    pub(crate) incomplete: bool,
    pub(crate) rejectable: bool,
    pub(crate) committed: bool,
    pub(crate) terminated: bool,
    pub(crate) discarded: bool,
    /// References held by the client, by a commitment and by every token merged onto this one.
    pub(crate) ref_count: u32,
}

impl Token {
    pub(crate) fn new(
        predicate: String,
        rejectable: bool,
        master: Option<(TokenId, String)>,
    ) -> Token {
        let (master, relation) = match master {
            Some((master, relation)) => (Some(master), Some(relation)),
            None => (None, None),
        };

        Token {
            predicate,
            master,
            relation,
            variables: vec![],
            local_variables: BTreeSet::new(),
            slaves: vec![],
            standard_constraints: BTreeSet::new(),
            merged_tokens: BTreeSet::new(),
            active_token: None,
            memento: None,
            incomplete: true,
            rejectable,
            committed: false,
            terminated: false,
            discarded: false,
            ref_count: 1,
        }
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn master(&self) -> Option<TokenId> {
        self.master
    }

    /// The label of the relation to the master, e.g. `meets` or `contained_by`.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    pub fn state_variable(&self) -> VariableId {
        self.variables[Token::STATE]
    }

    pub fn object_variable(&self) -> VariableId {
        self.variables[Token::OBJECT]
    }

    pub fn duration(&self) -> VariableId {
        self.variables[Token::DURATION]
    }

    pub fn start(&self) -> VariableId {
        self.variables[Token::START]
    }

    pub fn end(&self) -> VariableId {
        self.variables[Token::END]
    }

    pub fn local_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.local_variables.iter().copied()
    }

    pub fn slaves(&self) -> &[TokenId] {
        &self.slaves
    }

    pub fn standard_constraints(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.standard_constraints.iter().copied()
    }

    pub fn is_standard_constraint(&self, constraint: ConstraintId) -> bool {
        self.standard_constraints.contains(&constraint)
    }

    pub fn merged_tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.merged_tokens.iter().copied()
    }

    pub fn active_token(&self) -> Option<TokenId> {
        self.active_token
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn is_rejectable(&self) -> bool {
        self.rejectable
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Whether the client released the token while something else still keeps it alive.
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }
}
