use std::fmt::Display;
use std::fmt::Formatter;

use super::EnumeratedDomain;
use super::IntervalDomain;
use super::Value;
use crate::plandb_assert_moderate;

/// A set of values a variable may take.
///
/// All restricting operations return whether the domain changed; an operation that removes the
/// last value leaves the domain empty rather than failing, the caller decides what emptiness
/// means.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Interval(IntervalDomain),
    Enumerated(EnumeratedDomain),
}

impl Domain {
    pub fn interval(lower_bound: Value, upper_bound: Value) -> Domain {
        Domain::Interval(IntervalDomain::new(lower_bound, upper_bound))
    }

    pub fn values(values: impl IntoIterator<Item = Value>) -> Domain {
        Domain::Enumerated(EnumeratedDomain::new(values))
    }

    pub fn singleton(value: Value) -> Domain {
        Domain::values([value])
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Interval(interval) => interval.is_empty(),
            Domain::Enumerated(enumerated) => enumerated.is_empty(),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton_value().is_some()
    }

    pub fn singleton_value(&self) -> Option<Value> {
        match self {
            Domain::Interval(interval) => (!interval.is_empty()
                && interval.lower_bound() == interval.upper_bound())
            .then_some(interval.lower_bound()),
            Domain::Enumerated(enumerated) => {
                if enumerated.len() == 1 {
                    enumerated.min()
                } else {
                    None
                }
            }
        }
    }

    pub fn is_member(&self, value: Value) -> bool {
        match self {
            Domain::Interval(interval) => interval.contains(value),
            Domain::Enumerated(enumerated) => enumerated.contains(value),
        }
    }

    pub fn lower_bound(&self) -> Option<Value> {
        match self {
            Domain::Interval(interval) => (!interval.is_empty()).then_some(interval.lower_bound()),
            Domain::Enumerated(enumerated) => enumerated.min(),
        }
    }

    pub fn upper_bound(&self) -> Option<Value> {
        match self {
            Domain::Interval(interval) => (!interval.is_empty()).then_some(interval.upper_bound()),
            Domain::Enumerated(enumerated) => enumerated.max(),
        }
    }

    /// The number of values, or [`None`] for an interval with an infinite bound.
    pub fn size(&self) -> Option<u64> {
        match self {
            Domain::Interval(interval) if interval.is_empty() => Some(0),
            Domain::Interval(interval) if interval.is_finite() => {
                Some(interval.upper_bound().abs_diff(interval.lower_bound()) + 1)
            }
            Domain::Interval(_) => None,
            Domain::Enumerated(enumerated) => Some(enumerated.len() as u64),
        }
    }

    pub fn is_subset_of(&self, other: &Domain) -> bool {
        if self.is_empty() {
            return true;
        }

        match (self, other) {
            (Domain::Interval(lhs), Domain::Interval(rhs)) => {
                rhs.lower_bound() <= lhs.lower_bound() && lhs.upper_bound() <= rhs.upper_bound()
            }
            (Domain::Enumerated(lhs), _) => lhs.values().all(|value| other.is_member(value)),
            (Domain::Interval(lhs), Domain::Enumerated(rhs)) => {
                lhs.is_finite()
                    && self.size().is_some_and(|size| size <= rhs.len() as u64)
                    && (lhs.lower_bound()..=lhs.upper_bound()).all(|value| rhs.contains(value))
            }
        }
    }

    /// Whether the two domains share at least one value.
    pub fn intersects(&self, other: &Domain) -> bool {
        let mut copy = self.clone();
        let _ = copy.intersect(other);
        !copy.is_empty()
    }

    /// Removes every value not in `other`. An interval intersected with an enumeration becomes an
    /// enumeration.
    pub fn intersect(&mut self, other: &Domain) -> bool {
        match (&mut *self, other) {
            (Domain::Interval(lhs), Domain::Interval(rhs)) => {
                lhs.restrict(rhs.lower_bound(), rhs.upper_bound())
            }
            (Domain::Enumerated(lhs), _) => lhs.retain(|value| other.is_member(*value)),
            (Domain::Interval(lhs), Domain::Enumerated(rhs)) => {
                let interval = *lhs;
                let restricted =
                    EnumeratedDomain::new(rhs.values().filter(|value| interval.contains(*value)));
                let changed = match Domain::Interval(interval).size() {
                    Some(size) => size != restricted.len() as u64,
                    None => true,
                };
                *self = Domain::Enumerated(restricted);
                changed
            }
        }
    }

    pub fn restrict_bounds(&mut self, lower_bound: Value, upper_bound: Value) -> bool {
        match self {
            Domain::Interval(interval) => interval.restrict(lower_bound, upper_bound),
            Domain::Enumerated(enumerated) => {
                enumerated.retain(|value| lower_bound <= *value && *value <= upper_bound)
            }
        }
    }

    /// Removes a single value. For intervals only values at a bound can be removed; removing an
    /// interior value is not representable and leaves the domain unchanged.
    pub fn remove(&mut self, value: Value) -> bool {
        match self {
            Domain::Interval(interval) => {
                if interval.is_empty() {
                    false
                } else if interval.lower_bound() == value {
                    interval.restrict(value + 1, interval.upper_bound())
                } else if interval.upper_bound() == value {
                    interval.restrict(interval.lower_bound(), value - 1)
                } else {
                    false
                }
            }
            Domain::Enumerated(enumerated) => enumerated.remove(value),
        }
    }

    /// Restricts the domain to `{value}`; if `value` is not a member the domain becomes empty.
    pub fn set_singleton(&mut self, value: Value) -> bool {
        if self.is_member(value) {
            self.restrict_bounds(value, value)
        } else {
            let was_empty = self.is_empty();
            self.empty();
            !was_empty
        }
    }

    /// Relaxes this domain to `other`, which must be a superset of it.
    pub fn relax(&mut self, other: &Domain) -> bool {
        plandb_assert_moderate!(
            self.is_subset_of(other),
            "relaxing {self} to {other} is not a relaxation"
        );
        let changed = self != other;
        *self = other.clone();
        changed
    }

    /// Replaces the contents of this domain with `other` without any subset requirement.
    pub(crate) fn reset_to(&mut self, other: &Domain) -> bool {
        let changed = self != other;
        *self = other.clone();
        changed
    }

    pub fn empty(&mut self) {
        match self {
            Domain::Interval(interval) => *interval = IntervalDomain::empty(),
            Domain::Enumerated(enumerated) => *enumerated = EnumeratedDomain::default(),
        }
    }

    /// Adds a value to an enumerated domain; intervals are extended to cover it.
    pub fn insert(&mut self, value: Value) -> bool {
        match self {
            Domain::Interval(interval) if interval.is_empty() => {
                *interval = IntervalDomain::new(value, value);
                true
            }
            Domain::Interval(interval) => {
                let widened = IntervalDomain::new(
                    interval.lower_bound().min(value),
                    interval.upper_bound().max(value),
                );
                let changed = widened != *interval;
                *interval = widened;
                changed
            }
            Domain::Enumerated(enumerated) => enumerated.insert(value),
        }
    }
}

impl From<IntervalDomain> for Domain {
    fn from(value: IntervalDomain) -> Self {
        Domain::Interval(value)
    }
}

impl From<EnumeratedDomain> for Domain {
    fn from(value: EnumeratedDomain) -> Self {
        Domain::Enumerated(value)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Interval(interval) => write!(f, "{interval}"),
            Domain::Enumerated(enumerated) => write!(f, "{enumerated}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Domain;
    use crate::engine::domains::PLUS_INFINITY;

    #[test]
    fn interval_intersected_with_enumeration_keeps_members_in_range() {
        let mut domain = Domain::interval(0, 10);
        let changed = domain.intersect(&Domain::values([-3, 2, 5, 11]));

        assert!(changed);
        assert_eq!(Domain::values([2, 5]), domain);
    }

    #[test]
    fn intersecting_with_a_superset_does_not_change_anything() {
        let mut domain = Domain::values([1, 2]);
        assert!(!domain.intersect(&Domain::interval(0, 5)));
        assert_eq!(Domain::values([1, 2]), domain);
    }

    #[test]
    fn set_singleton_outside_domain_empties() {
        let mut domain = Domain::interval(0, 3);
        assert!(domain.set_singleton(7));
        assert!(domain.is_empty());
    }

    #[test]
    fn removing_interior_value_of_interval_is_ignored() {
        let mut domain = Domain::interval(0, 3);
        assert!(!domain.remove(2));
        assert!(domain.remove(0));
        assert_eq!(Domain::interval(1, 3), domain);
    }

    #[test]
    fn subset_checks_mix_representations() {
        assert!(Domain::interval(2, 3).is_subset_of(&Domain::values([1, 2, 3])));
        assert!(!Domain::interval(2, 4).is_subset_of(&Domain::values([1, 2, 3])));
        assert!(Domain::values([4]).is_subset_of(&Domain::interval(0, PLUS_INFINITY)));
        assert!(!Domain::interval(0, PLUS_INFINITY).is_subset_of(&Domain::values([0])));
    }

    #[test]
    fn infinite_interval_has_no_size() {
        assert_eq!(None, Domain::interval(0, PLUS_INFINITY).size());
        assert_eq!(Some(4), Domain::interval(0, 3).size());
        assert_eq!(Some(0), Domain::interval(3, 0).size());
    }

    #[test]
    #[should_panic]
    fn relaxing_to_a_smaller_domain_is_a_contract_violation() {
        let mut domain = Domain::interval(0, 10);
        let _ = domain.relax(&Domain::interval(2, 3));
    }
}
