use std::fmt::Display;
use std::fmt::Formatter;

use crate::engine::domains::Domain;
use crate::engine::domains::Value;

/// The derived state of a token.
///
/// Only [`TokenState::Active`], [`TokenState::Merged`] and [`TokenState::Rejected`] are values of
/// the state variable; a token is [`TokenState::Inactive`] while its state variable is not
/// specified and [`TokenState::Incomplete`] until it is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenState {
    Incomplete,
    Inactive,
    Active,
    Merged,
    Rejected,
}

impl TokenState {
    pub(crate) const ACTIVE: Value = 1;
    pub(crate) const MERGED: Value = 2;
    pub(crate) const REJECTED: Value = 3;

    /// The value this state has in the domain of a state variable.
    pub fn value(self) -> Option<Value> {
        match self {
            TokenState::Incomplete | TokenState::Inactive => None,
            TokenState::Active => Some(TokenState::ACTIVE),
            TokenState::Merged => Some(TokenState::MERGED),
            TokenState::Rejected => Some(TokenState::REJECTED),
        }
    }

    pub fn from_value(value: Value) -> Option<TokenState> {
        match value {
            TokenState::ACTIVE => Some(TokenState::Active),
            TokenState::MERGED => Some(TokenState::Merged),
            TokenState::REJECTED => Some(TokenState::Rejected),
            _ => None,
        }
    }

    /// The base domain of a state variable.
    pub(crate) fn base_domain(rejectable: bool) -> Domain {
        if rejectable {
            Domain::values([TokenState::ACTIVE, TokenState::MERGED, TokenState::REJECTED])
        } else {
            Domain::values([TokenState::ACTIVE, TokenState::MERGED])
        }
    }
}

impl Display for TokenState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenState::Incomplete => "INCOMPLETE",
            TokenState::Inactive => "INACTIVE",
            TokenState::Active => "ACTIVE",
            TokenState::Merged => "MERGED",
            TokenState::Rejected => "REJECTED",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::TokenState;

    #[test]
    fn only_decided_states_have_values() {
        for state in [TokenState::Active, TokenState::Merged, TokenState::Rejected] {
            let value = state.value().expect("decided state");
            assert_eq!(Some(state), TokenState::from_value(value));
        }
        assert_eq!(None, TokenState::Inactive.value());
        assert_eq!(None, TokenState::Incomplete.value());
    }

    #[test]
    fn base_domain_only_holds_decided_states() {
        let domain = TokenState::base_domain(true);
        assert_eq!(Some(3), domain.size());
        assert!(!domain.is_member(0));
        assert!(!TokenState::base_domain(false).is_member(TokenState::REJECTED));
    }
}
