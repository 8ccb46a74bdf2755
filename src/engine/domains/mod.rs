//! The domain primitive: mutable value sets that variables are restricted and relaxed over.
//!
//! Two representations are provided, a bounded [`IntervalDomain`] and an explicit
//! [`EnumeratedDomain`]. Symbolic values (token states, objects) are encoded as [`Value`]s in
//! enumerated domains.
mod domain;
mod domain_change;
mod enumerated_domain;
mod interval_domain;

pub use domain::*;
pub use domain_change::*;
pub use enumerated_domain::*;
pub use interval_domain::*;

/// The value type of every domain.
pub type Value = i64;

/// Largest finite bound of an interval domain; anything at or above it is treated as infinite.
pub const PLUS_INFINITY: Value = i64::MAX / 4;
/// Smallest finite bound of an interval domain; anything at or below it is treated as infinite.
pub const MINUS_INFINITY: Value = -PLUS_INFINITY;

/// Returned when an operation on a domain removed its last value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("the domain became empty")]
pub struct EmptyDomain;

/// Adds two bounds, keeping infinite bounds infinite.
pub(crate) fn saturating_bound_add(lhs: Value, rhs: Value) -> Value {
    if lhs >= PLUS_INFINITY || rhs >= PLUS_INFINITY {
        PLUS_INFINITY
    } else if lhs <= MINUS_INFINITY || rhs <= MINUS_INFINITY {
        MINUS_INFINITY
    } else {
        (lhs + rhs).clamp(MINUS_INFINITY, PLUS_INFINITY)
    }
}

/// Subtracts two bounds, keeping infinite bounds infinite.
pub(crate) fn saturating_bound_sub(lhs: Value, rhs: Value) -> Value {
    saturating_bound_add(lhs, negate_bound(rhs))
}

fn negate_bound(bound: Value) -> Value {
    if bound >= PLUS_INFINITY {
        MINUS_INFINITY
    } else if bound <= MINUS_INFINITY {
        PLUS_INFINITY
    } else {
        -bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_bounds_absorb_finite_values() {
        assert_eq!(PLUS_INFINITY, saturating_bound_add(PLUS_INFINITY, -10));
        assert_eq!(MINUS_INFINITY, saturating_bound_sub(5, PLUS_INFINITY));
        assert_eq!(7, saturating_bound_sub(10, 3));
    }
}
