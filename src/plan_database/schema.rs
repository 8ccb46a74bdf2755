use std::collections::BTreeMap;

use thiserror::Error;

use crate::engine::domains::Domain;

/// Errors raised while declaring the schema or objects of a plan database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("'{0}' is already defined")]
    AlreadyDefined(String),
    #[error("no object type named '{0}'")]
    UnknownObjectType(String),
    #[error("no predicate named '{0}'")]
    UnknownPredicate(String),
    #[error("predicate '{predicate}' has no parameter named '{parameter}'")]
    UnknownParameter { predicate: String, parameter: String },
    #[error("predicate '{predicate}' cannot specialise '{parent}' of an unrelated object type")]
    IncompatibleParent { predicate: String, parent: String },
    #[error("there are no objects of type '{0}' to assign tokens to")]
    NoObjects(String),
}

#[derive(Clone, Debug)]
struct ObjectType {
    parent: Option<String>,
}

#[derive(Clone, Debug)]
struct Predicate {
    object_type: String,
    parent: Option<String>,
    parameters: Vec<(String, Domain)>,
}

/// The object types and predicates known to a plan database.
///
/// Object types form a single-inheritance hierarchy. Predicates are named `Type.name` and may
/// specialise a predicate of an ancestor type; a specialisation has the same parameters as its
/// parent but may narrow their base domains. This keeps the variables of a token and of any token
/// it can merge with aligned position by position.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    object_types: BTreeMap<String, ObjectType>,
    predicates: BTreeMap<String, Predicate>,
}

impl Schema {
    pub fn add_object_type(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<(), SchemaError> {
        if self.object_types.contains_key(name) {
            return Err(SchemaError::AlreadyDefined(name.to_owned()));
        }
        if let Some(parent) = parent {
            if !self.is_object_type(parent) {
                return Err(SchemaError::UnknownObjectType(parent.to_owned()));
            }
        }

        let _ = self.object_types.insert(
            name.to_owned(),
            ObjectType {
                parent: parent.map(str::to_owned),
            },
        );
        Ok(())
    }

    /// Declares the predicate `object_type.name`, returning its qualified name.
    ///
    /// With a `parent`, `parameters` override the base domains of the parent's parameters.
    pub fn add_predicate(
        &mut self,
        object_type: &str,
        name: &str,
        parent: Option<&str>,
        parameters: &[(&str, Domain)],
    ) -> Result<String, SchemaError> {
        let qualified = format!("{object_type}.{name}");
        if self.predicates.contains_key(&qualified) {
            return Err(SchemaError::AlreadyDefined(qualified));
        }
        if !self.is_object_type(object_type) {
            return Err(SchemaError::UnknownObjectType(object_type.to_owned()));
        }

        let parameters = match parent {
            None => parameters
                .iter()
                .map(|(name, domain)| ((*name).to_owned(), domain.clone()))
                .collect(),
            Some(parent) => {
                let Some(parent_predicate) = self.predicates.get(parent) else {
                    return Err(SchemaError::UnknownPredicate(parent.to_owned()));
                };
                if !self.is_a(object_type, &parent_predicate.object_type) {
                    return Err(SchemaError::IncompatibleParent {
                        predicate: qualified,
                        parent: parent.to_owned(),
                    });
                }

                let mut inherited = parent_predicate.parameters.clone();
                for (name, domain) in parameters {
                    let Some((_, inherited_domain)) = inherited
                        .iter_mut()
                        .find(|(inherited_name, _)| inherited_name == name)
                    else {
                        return Err(SchemaError::UnknownParameter {
                            predicate: qualified,
                            parameter: (*name).to_owned(),
                        });
                    };
                    let _ = inherited_domain.intersect(domain);
                }
                inherited
            }
        };

        let _ = self.predicates.insert(
            qualified.clone(),
            Predicate {
                object_type: object_type.to_owned(),
                parent: parent.map(str::to_owned),
                parameters,
            },
        );
        Ok(qualified)
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.object_types.contains_key(name)
    }

    pub fn is_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Whether `name` (an object type or predicate) equals `ancestor` or inherits from it.
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        let mut current = Some(name);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self
                .object_types
                .get(candidate)
                .and_then(|object_type| object_type.parent.as_deref())
                .or_else(|| {
                    self.predicates
                        .get(candidate)
                        .and_then(|predicate| predicate.parent.as_deref())
                });
        }
        false
    }

    pub fn object_type_of(&self, predicate: &str) -> Option<&str> {
        self.predicates
            .get(predicate)
            .map(|predicate| predicate.object_type.as_str())
    }

    pub fn parameters(&self, predicate: &str) -> Option<&[(String, Domain)]> {
        self.predicates
            .get(predicate)
            .map(|predicate| predicate.parameters.as_slice())
    }

    /// The part of a qualified predicate name after the object type.
    pub fn unqualified_name(predicate: &str) -> &str {
        match predicate.split_once('.') {
            Some((_, name)) => name,
            None => predicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Schema;
    use super::SchemaError;
    use crate::engine::domains::Domain;

    fn rover_schema() -> Schema {
        let mut schema = Schema::default();
        schema.add_object_type("Vehicle", None).unwrap();
        schema.add_object_type("Rover", Some("Vehicle")).unwrap();
        let _ = schema
            .add_predicate("Vehicle", "At", None, &[("location", Domain::values([1, 2, 3]))])
            .unwrap();
        let _ = schema
            .add_predicate(
                "Rover",
                "At",
                Some("Vehicle.At"),
                &[("location", Domain::values([2, 3]))],
            )
            .unwrap();
        schema
    }

    #[test]
    fn specialised_predicates_inherit_narrowed_parameters() {
        let schema = rover_schema();

        assert!(schema.is_a("Rover.At", "Vehicle.At"));
        assert!(!schema.is_a("Vehicle.At", "Rover.At"));
        assert!(schema.is_a("Rover", "Vehicle"));
        assert_eq!(
            &[("location".to_owned(), Domain::values([2, 3]))],
            schema.parameters("Rover.At").unwrap()
        );
        assert_eq!(Some("Rover"), schema.object_type_of("Rover.At"));
        assert_eq!("At", Schema::unqualified_name("Rover.At"));
    }

    #[test]
    fn declarations_are_validated() {
        let mut schema = rover_schema();

        assert_eq!(
            Err(SchemaError::AlreadyDefined("Rover".to_owned())),
            schema.add_object_type("Rover", None)
        );
        assert_eq!(
            Err(SchemaError::UnknownObjectType("Plane".to_owned())),
            schema.add_predicate("Plane", "Fly", None, &[])
        );
        assert_eq!(
            Err(SchemaError::UnknownParameter {
                predicate: "Rover.Goto".to_owned(),
                parameter: "speed".to_owned()
            }),
            schema.add_predicate("Rover", "Goto", Some("Vehicle.At"), &[("speed", Domain::values([1]))])
        );
        assert_eq!(
            Err(SchemaError::IncompatibleParent {
                predicate: "Vehicle.Parked".to_owned(),
                parent: "Rover.At".to_owned()
            }),
            schema.add_predicate("Vehicle", "Parked", Some("Rover.At"), &[])
        );
    }
}
