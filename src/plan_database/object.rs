use crate::engine::domains::Value;

crate::storage_key!(
    /// An identifier to an object of the [`PlanDatabase`](super::PlanDatabase). The identifier is
    /// also the value an object takes in the domain of a token's object variable.
    ObjectId
);

impl ObjectId {
    /// The value representing this object in an object variable.
    pub fn value(self) -> Value {
        Value::from(self.0)
    }

    pub fn from_value(value: Value) -> Option<ObjectId> {
        u32::try_from(value).ok().map(ObjectId)
    }
}

/// A named instance of an object type tokens can be assigned to.
#[derive(Clone, Debug)]
pub struct Object {
    pub(crate) name: String,
    pub(crate) object_type: String,
}

impl Object {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }
}
