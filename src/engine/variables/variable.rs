use crate::engine::ConstraintId;
use crate::engine::domains::Domain;
use crate::engine::domains::Value;

crate::storage_key!(
    /// An identifier to a variable of the [`ConstraintEngine`](crate::engine::ConstraintEngine).
    /// Identifiers are never reused, so they double as a stable creation order.
    VariableId
);

/// A variable in the constraint network.
///
/// Besides the usual base and derived domain, every variable carries an *integrated base domain*.
/// This is the domain relaxation returns to. For plain variables it equals the base domain; token
/// variables narrow it with the base domains of the variables merged onto them.
#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    pub(crate) base_domain: Domain,
    pub(crate) integrated_base_domain: Domain,
    pub(crate) derived_domain: Domain,
    pub(crate) specified_value: Option<Value>,
    can_be_specified: bool,
    pub(crate) deactivation_count: u32,
    /// The constraints this variable is in the scope of, with its position in that scope.
    pub(crate) constraints: Vec<(ConstraintId, usize)>,
}

impl Variable {
    pub(crate) fn new(name: String, base_domain: Domain, can_be_specified: bool) -> Variable {
        Variable {
            name,
            integrated_base_domain: base_domain.clone(),
            derived_domain: base_domain.clone(),
            base_domain,
            specified_value: None,
            can_be_specified,
            deactivation_count: 0,
            constraints: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_domain(&self) -> &Domain {
        &self.base_domain
    }

    pub fn integrated_base_domain(&self) -> &Domain {
        &self.integrated_base_domain
    }

    /// The current, propagated domain.
    pub fn derived_domain(&self) -> &Domain {
        &self.derived_domain
    }

    pub fn specified_value(&self) -> Option<Value> {
        self.specified_value
    }

    pub fn is_specified(&self) -> bool {
        self.specified_value.is_some()
    }

    pub fn can_be_specified(&self) -> bool {
        self.can_be_specified
    }

    /// Inactive variables are inert: changes to them do not trigger propagation and every
    /// constraint in their scope is inactive as well.
    pub fn is_active(&self) -> bool {
        self.deactivation_count == 0
    }

    pub fn constraints(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraints.iter().map(|&(constraint, _)| constraint)
    }

    /// The domain this variable relaxes to: the integrated base domain, narrowed to the specified
    /// value if there is one.
    pub(crate) fn relaxation_target(&self) -> Domain {
        let mut target = self.integrated_base_domain.clone();
        if let Some(value) = self.specified_value {
            let _ = target.set_singleton(value);
        }
        target
    }
}
