use std::fmt::Display;
use std::fmt::Formatter;

use super::Value;
use super::MINUS_INFINITY;
use super::PLUS_INFINITY;

/// A closed interval `[lower_bound, upper_bound]` of integer values. Bounds at
/// [`PLUS_INFINITY`]/[`MINUS_INFINITY`] denote an unbounded side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntervalDomain {
    lower_bound: Value,
    upper_bound: Value,
}

impl IntervalDomain {
    pub fn new(lower_bound: Value, upper_bound: Value) -> IntervalDomain {
        let mut domain = IntervalDomain {
            lower_bound: lower_bound.max(MINUS_INFINITY),
            upper_bound: upper_bound.min(PLUS_INFINITY),
        };
        domain.normalise();
        domain
    }

    /// The interval without any finite bound.
    pub fn infinite() -> IntervalDomain {
        IntervalDomain::new(MINUS_INFINITY, PLUS_INFINITY)
    }

    pub fn empty() -> IntervalDomain {
        IntervalDomain {
            lower_bound: 1,
            upper_bound: 0,
        }
    }

    pub fn lower_bound(&self) -> Value {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> Value {
        self.upper_bound
    }

    pub fn is_empty(&self) -> bool {
        self.lower_bound > self.upper_bound
    }

    pub fn is_finite(&self) -> bool {
        self.lower_bound > MINUS_INFINITY && self.upper_bound < PLUS_INFINITY
    }

    pub fn contains(&self, value: Value) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    /// Tightens the bounds, returning whether anything changed.
    pub(crate) fn restrict(&mut self, lower_bound: Value, upper_bound: Value) -> bool {
        let old = *self;
        self.lower_bound = self.lower_bound.max(lower_bound);
        self.upper_bound = self.upper_bound.min(upper_bound);
        self.normalise();
        old != *self
    }

    fn normalise(&mut self) {
        if self.is_empty() {
            *self = IntervalDomain::empty();
        }
    }
}

impl Display for IntervalDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "[empty]");
        }

        let format_bound = |bound: Value| {
            if bound >= PLUS_INFINITY {
                "+inf".to_owned()
            } else if bound <= MINUS_INFINITY {
                "-inf".to_owned()
            } else {
                bound.to_string()
            }
        };

        write!(
            f,
            "[{}, {}]",
            format_bound(self.lower_bound),
            format_bound(self.upper_bound)
        )
    }
}
