use enumset::EnumSet;

use crate::basic_types::PropagationStatus;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainChange;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Relation;

/// Restricts a single variable to a fixed domain. Unlike restricting the derived domain directly,
/// the restriction survives relaxation and disappears when the constraint is removed.
#[derive(Clone, Debug)]
pub struct Unary {
    domain: Domain,
}

impl Unary {
    pub fn new(domain: Domain) -> Unary {
        Unary { domain }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

impl Relation for Unary {
    fn name(&self) -> &str {
        "unary"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn propagate(&self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        context.intersect(0, &self.domain)?;
        Ok(())
    }

    fn ignored_changes(&self, _argument: usize) -> EnumSet<DomainChange> {
        DomainChange::Restricted | DomainChange::Specified
    }

    fn boxed_clone(&self) -> Box<dyn Relation> {
        Box::new(self.clone())
    }
}
