use log::warn;

use crate::basic_types::ConstraintOperationError;
use crate::basic_types::HashMap;
use crate::engine::propagation::Relation;
use crate::relations::arithmetic::AddEqual;
use crate::relations::arithmetic::LessThanEqual;
use crate::relations::Equal;
use crate::relations::NotEqual;

/// Creates a fresh relation.
pub type RelationFactory = fn() -> Box<dyn Relation>;

/// Maps constraint names to the relations they create.
///
/// Every [`ConstraintEngine`](crate::engine::ConstraintEngine) owns its registry, so different
/// engines can run with different sets of constraints.
#[derive(Debug)]
pub struct ConstraintRegistry {
    factories: HashMap<String, RelationFactory>,
}

impl Default for ConstraintRegistry {
    /// A registry with the built-in relations `eq`, `neq`, `leq` and `addEq`.
    fn default() -> Self {
        let mut registry = ConstraintRegistry::empty();
        let _ = registry.register("eq", || Box::new(Equal));
        let _ = registry.register("neq", || Box::new(NotEqual));
        let _ = registry.register("leq", || Box::new(LessThanEqual));
        let _ = registry.register("addEq", || Box::new(AddEqual));
        registry
    }
}

impl ConstraintRegistry {
    pub fn empty() -> ConstraintRegistry {
        ConstraintRegistry {
            factories: HashMap::default(),
        }
    }

    /// Registers `factory` under `name`, returning the factory it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: RelationFactory,
    ) -> Option<RelationFactory> {
        let name = name.into();
        let previous = self.factories.insert(name.clone(), factory);
        if previous.is_some() {
            warn!("Overwriting the constraint registered as '{name}'");
        }
        previous
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Relation>, ConstraintOperationError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConstraintOperationError::UnknownConstraint(name.to_owned()))
    }
}
