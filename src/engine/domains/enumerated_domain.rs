use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use super::Value;

/// An explicit, ordered set of values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EnumeratedDomain {
    values: BTreeSet<Value>,
}

impl EnumeratedDomain {
    pub fn new(values: impl IntoIterator<Item = Value>) -> EnumeratedDomain {
        EnumeratedDomain {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: Value) -> bool {
        self.values.contains(&value)
    }

    pub fn min(&self) -> Option<Value> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<Value> {
        self.values.last().copied()
    }

    pub(crate) fn retain(&mut self, predicate: impl FnMut(&Value) -> bool) -> bool {
        let old_len = self.values.len();
        self.values.retain(predicate);
        old_len != self.values.len()
    }

    pub(crate) fn insert(&mut self, value: Value) -> bool {
        self.values.insert(value)
    }

    pub(crate) fn remove(&mut self, value: Value) -> bool {
        self.values.remove(&value)
    }
}

impl Display for EnumeratedDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "}}")
    }
}
