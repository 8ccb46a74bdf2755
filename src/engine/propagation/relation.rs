use std::fmt::Debug;

use enumset::EnumSet;

use super::PropagationContextMut;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::basic_types::Inconsistency;
use crate::engine::domains::DomainChange;
#[cfg(doc)]
use crate::engine::ConstraintEngine;
#[cfg(doc)]
use crate::engine::ConstraintRegistry;

/// All constraints of the [`ConstraintEngine`] are a [`Relation`] posted over a scope of variables.
/// Structs implementing the trait define the filtering logic of the constraint; which variables it
/// is posted over is decided by the engine.
///
/// The only required functions are [`Relation::name`], [`Relation::propagate`] and
/// [`Relation::boxed_clone`], the others have default implementations.
pub trait Relation: Debug {
    /// Return the name of the relation, this is the name under which it is found in the
    /// [`ConstraintRegistry`] and is used for printing.
    fn name(&self) -> &str;

    /// The number of variables the relation expects, [`None`] if it accepts any number.
    fn arity(&self) -> Option<usize> {
        None
    }

    /// Narrows the derived domains of the scope to be consistent with the relation.
    ///
    /// In case no inconsistency has been detected it should return [`Result::Ok`], otherwise
    /// it should return a [`Result::Err`] with an [`Inconsistency`]; either because a domain
    /// became empty ([`Inconsistency::EmptyDomain`]) or because the relation found the current
    /// domains to be inconsistent ([`Inconsistency::Violated`]).
    ///
    /// A relation is not re-triggered by its own changes, so it should reach its own fixed point
    /// before returning.
    fn propagate(&self, context: PropagationContextMut<'_>) -> PropagationStatus;

    /// The kinds of change on the variable at position `argument` which cannot make this relation
    /// propagate anything new. The engine will not schedule the constraint for those.
    fn ignored_changes(&self, _argument: usize) -> EnumSet<DomainChange> {
        EnumSet::empty()
    }

    /// Creates a copy of this relation, used when a constraint is migrated to a new scope.
    fn boxed_clone(&self) -> Box<dyn Relation>;
}
