use enumset::EnumSet;
use enumset::EnumSetType;

/// The kinds of change a variable's derived domain can undergo. Propagation is triggered by these
/// and relations can opt out of the kinds they do not care about.
#[derive(Debug, EnumSetType)]
pub enum DomainChange {
    /// Values were removed by propagation or a client restriction.
    Restricted,
    /// Values were added back, either explicitly or through a relaxation cascade.
    Relaxed,
    /// The variable was specified to a single value.
    Specified,
    /// A specification was retracted.
    Reset,
    /// The last value was removed.
    Emptied,
}

impl DomainChange {
    /// Whether this change can only have removed values.
    pub fn is_restriction(self) -> bool {
        matches!(
            self,
            DomainChange::Restricted | DomainChange::Specified | DomainChange::Emptied
        )
    }

    pub fn all() -> EnumSet<DomainChange> {
        EnumSet::all()
    }
}
