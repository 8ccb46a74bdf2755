use super::ObjectId;
use super::TokenId;
use crate::engine::ConstraintId;

/// An event raised by the [`PlanDatabase`](super::PlanDatabase), collected in the order in which
/// it happened until the client [drains](super::PlanDatabase::drain_notifications) them.
///
/// Nothing is raised while the database is being purged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    Token {
        token: TokenId,
        event: TokenEvent,
    },
    Constraint {
        constraint: ConstraintId,
        event: ConstraintEvent,
    },
    /// Raised once for every object in the base domain of the object variable of `token`.
    Object {
        object: ObjectId,
        token: TokenId,
        event: ObjectEvent,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenEvent {
    /// The token was closed and is now part of the plan.
    Added,
    Removed,
    Activated,
    Deactivated,
    Merged,
    Split,
    Rejected,
    Reinstated,
    Committed,
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintEvent {
    Added,
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectEvent {
    Merged,
    Rejected,
    Deleted,
}
