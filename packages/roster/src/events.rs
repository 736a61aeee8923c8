use std::fmt;

use crate::model::{MembershipId, PermissionLevel};

/// Kind of remote call the dispatcher issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Update,
    Accept,
    Reject,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Delete => write!(f, "delete"),
            Operation::Update => write!(f, "update"),
            Operation::Accept => write!(f, "accept"),
            Operation::Reject => write!(f, "reject"),
        }
    }
}

/// Roster events - FACT EVENTS ONLY
///
/// One event per settled remote call. Failures are facts too: the local
/// optimistic state is left as is, so `OperationFailed` is the only signal
/// that the roster may have diverged from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    MembershipDeleted {
        membership_id: MembershipId,
    },

    MembershipUpdated {
        membership_id: MembershipId,
        title: String,
        permission_level: PermissionLevel,
    },

    RequestAccepted {
        membership_id: MembershipId,
    },

    RequestRejected {
        membership_id: MembershipId,
    },

    OperationFailed {
        operation: Operation,
        membership_id: MembershipId,
        reason: String,
    },
}

impl RosterEvent {
    pub fn membership_id(&self) -> MembershipId {
        match self {
            RosterEvent::MembershipDeleted { membership_id }
            | RosterEvent::MembershipUpdated { membership_id, .. }
            | RosterEvent::RequestAccepted { membership_id }
            | RosterEvent::RequestRejected { membership_id }
            | RosterEvent::OperationFailed { membership_id, .. } => *membership_id,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            RosterEvent::MembershipDeleted { .. } => Operation::Delete,
            RosterEvent::MembershipUpdated { .. } => Operation::Update,
            RosterEvent::RequestAccepted { .. } => Operation::Accept,
            RosterEvent::RequestRejected { .. } => Operation::Reject,
            RosterEvent::OperationFailed { operation, .. } => *operation,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RosterEvent::OperationFailed { .. })
    }
}
