use crate::engine::propagation::Relation;
use crate::engine::variables::VariableId;

crate::storage_key!(
    /// An identifier to a constraint of the [`ConstraintEngine`](crate::engine::ConstraintEngine).
    /// The agenda is ordered by it, so constraints created earlier are executed first.
    ConstraintId
);

/// A relation posted over an ordered list of variables.
#[derive(Debug)]
pub struct Constraint {
    pub(crate) relation: Box<dyn Relation>,
    pub(crate) scope: Vec<VariableId>,
    /// Incremented for every inactive variable in the scope and every explicit deactivation.
    pub(crate) deactivation_count: u32,
    /// The constraint this one was migrated from, if any.
    pub(crate) source: Option<ConstraintId>,
}

impl Constraint {
    pub fn name(&self) -> &str {
        self.relation.name()
    }

    pub fn relation(&self) -> &dyn Relation {
        self.relation.as_ref()
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    pub fn is_active(&self) -> bool {
        self.deactivation_count == 0
    }

    pub fn source(&self) -> Option<ConstraintId> {
        self.source
    }
}
