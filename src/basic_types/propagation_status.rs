use crate::engine::domains::EmptyDomain;

/// The result of invoking the propagation step of a relation. The propagation can either succeed
/// or prove the current domains inconsistent.
pub type PropagationStatus = Result<(), Inconsistency>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A propagation removed the last value of a variable.
    EmptyDomain,
    /// The relation found the current domains inconsistent without emptying a variable.
    Violated,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}
