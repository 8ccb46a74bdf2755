use thiserror::Error;

use crate::engine::variables::VariableId;

/// Errors related to creating or posting constraints on the
/// [`ConstraintEngine`](crate::engine::ConstraintEngine).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    #[error("no constraint named '{0}' is registered")]
    UnknownConstraint(String),
    #[error("constraint '{name}' expects {expected} variables but was given {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{0} does not refer to a live variable")]
    InvalidVariable(VariableId),
}
