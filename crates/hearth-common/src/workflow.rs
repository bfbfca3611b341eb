//! Status workflows for moderated entities.
//!
//! Every moderated entity carries a small status machine. Routes never write a
//! status directly: they ask [`transition`] for the next status, then persist it
//! with a conditional update keyed on the status they read. That keeps resolved
//! join requests and sold listings from ever moving again. Pulses and listings
//! are editable only while `pending`, and an edit leaves the status alone.
//!
//! | Entity      | Transitions                                         |
//! |-------------|-----------------------------------------------------|
//! | JoinRequest | pending -> approved, pending -> rejected            |
//! | Pulse       | pending -> approved, pending -> rejected            |
//! | Listing     | pending -> approved/rejected, approved -> sold      |
//! | Member      | active -> blocked, blocked -> active                |
//! | SosAlert    | open -> acknowledged -> resolved, open -> resolved  |

use crate::error::{HearthError, HearthResult};
use crate::models::{
    join_request::JoinRequestStatus, listing::ListingStatus, member::MemberStatus,
    pulse::PulseStatus, sos::SosStatus,
};

/// A status that only moves through a fixed set of transitions.
pub trait StatusMachine: Copy + Eq + Sized {
    type Action: Copy;

    /// Resource name used in error messages.
    const RESOURCE: &'static str;

    fn as_str(self) -> &'static str;

    fn action_name(action: Self::Action) -> &'static str;

    /// The status reached by applying `action`, or `None` when unreachable.
    fn next(self, action: Self::Action) -> Option<Self>;

    /// No action leads anywhere from this status.
    fn is_terminal(self) -> bool;
}

/// Apply `action` to `from`, failing with `InvalidTransition` when the
/// workflow does not allow it.
pub fn transition<S: StatusMachine>(from: S, action: S::Action) -> HearthResult<S> {
    from.next(action).ok_or_else(|| HearthError::InvalidTransition {
        resource: S::RESOURCE.to_string(),
        from: from.as_str().to_string(),
        action: S::action_name(action).to_string(),
    })
}

/// Error for a conditional update that found the stored status already moved
/// by another reviewer.
pub fn status_changed<S: StatusMachine>(action: S::Action) -> HearthError {
    HearthError::InvalidTransition {
        resource: S::RESOURCE.to_string(),
        from: "changed".to_string(),
        action: S::action_name(action).to_string(),
    }
}

/// Error for editing a pulse or listing that has left the review queue.
/// `from` is `None` when the status moved after it was read.
pub fn edit_refused<S: StatusMachine>(from: Option<S>) -> HearthError {
    HearthError::InvalidTransition {
        resource: S::RESOURCE.to_string(),
        from: from.map_or("changed", S::as_str).to_string(),
        action: "edit".to_string(),
    }
}

/// Manager decision on a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Approve,
    Reject,
    MarkSold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    Block,
    Unblock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosAction {
    Acknowledge,
    Resolve,
}

impl StatusMachine for JoinRequestStatus {
    type Action = ReviewAction;
    const RESOURCE: &'static str = "Join request";

    fn as_str(self) -> &'static str {
        JoinRequestStatus::as_str(self)
    }

    fn action_name(action: ReviewAction) -> &'static str {
        action.as_str()
    }

    fn next(self, action: ReviewAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, ReviewAction::Approve) => Some(Self::Approved),
            (Self::Pending, ReviewAction::Reject) => Some(Self::Rejected),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl StatusMachine for PulseStatus {
    type Action = ReviewAction;
    const RESOURCE: &'static str = "Pulse";

    fn as_str(self) -> &'static str {
        PulseStatus::as_str(self)
    }

    fn action_name(action: ReviewAction) -> &'static str {
        action.as_str()
    }

    fn next(self, action: ReviewAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, ReviewAction::Approve) => Some(Self::Approved),
            (Self::Pending, ReviewAction::Reject) => Some(Self::Rejected),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl StatusMachine for ListingStatus {
    type Action = ListingAction;
    const RESOURCE: &'static str = "Listing";

    fn as_str(self) -> &'static str {
        ListingStatus::as_str(self)
    }

    fn action_name(action: ListingAction) -> &'static str {
        match action {
            ListingAction::Approve => "approve",
            ListingAction::Reject => "reject",
            ListingAction::MarkSold => "mark_sold",
        }
    }

    fn next(self, action: ListingAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, ListingAction::Approve) => Some(Self::Approved),
            (Self::Pending, ListingAction::Reject) => Some(Self::Rejected),
            (Self::Approved, ListingAction::MarkSold) => Some(Self::Sold),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Sold)
    }
}

impl StatusMachine for MemberStatus {
    type Action = BlockAction;
    const RESOURCE: &'static str = "Member";

    fn as_str(self) -> &'static str {
        MemberStatus::as_str(self)
    }

    fn action_name(action: BlockAction) -> &'static str {
        match action {
            BlockAction::Block => "block",
            BlockAction::Unblock => "unblock",
        }
    }

    fn next(self, action: BlockAction) -> Option<Self> {
        match (self, action) {
            (Self::Active, BlockAction::Block) => Some(Self::Blocked),
            (Self::Blocked, BlockAction::Unblock) => Some(Self::Active),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        false
    }
}

impl StatusMachine for SosStatus {
    type Action = SosAction;
    const RESOURCE: &'static str = "SOS alert";

    fn as_str(self) -> &'static str {
        SosStatus::as_str(self)
    }

    fn action_name(action: SosAction) -> &'static str {
        match action {
            SosAction::Acknowledge => "acknowledge",
            SosAction::Resolve => "resolve",
        }
    }

    fn next(self, action: SosAction) -> Option<Self> {
        match (self, action) {
            (Self::Open, SosAction::Acknowledge) => Some(Self::Acknowledged),
            (Self::Open | Self::Acknowledged, SosAction::Resolve) => Some(Self::Resolved),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        self == Self::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_ACTIONS: [ListingAction; 3] = [
        ListingAction::Approve,
        ListingAction::Reject,
        ListingAction::MarkSold,
    ];

    #[test]
    fn test_listing_paths() {
        let approved = transition(ListingStatus::Pending, ListingAction::Approve).unwrap();
        assert_eq!(approved, ListingStatus::Approved);
        assert_eq!(
            transition(approved, ListingAction::MarkSold).unwrap(),
            ListingStatus::Sold
        );
        assert_eq!(
            transition(ListingStatus::Pending, ListingAction::Reject).unwrap(),
            ListingStatus::Rejected
        );
    }

    #[test]
    fn test_listing_reachable_edges_are_exactly_the_workflow() {
        let all = [
            ListingStatus::Pending,
            ListingStatus::Approved,
            ListingStatus::Rejected,
            ListingStatus::Sold,
        ];
        let mut edges = Vec::new();
        for from in all {
            for action in LISTING_ACTIONS {
                if let Some(to) = from.next(action) {
                    edges.push((from, to));
                }
            }
        }
        assert_eq!(
            edges,
            vec![
                (ListingStatus::Pending, ListingStatus::Approved),
                (ListingStatus::Pending, ListingStatus::Rejected),
                (ListingStatus::Approved, ListingStatus::Sold),
            ]
        );
    }

    #[test]
    fn test_pending_listing_cannot_be_sold() {
        let err = transition(ListingStatus::Pending, ListingAction::MarkSold).unwrap_err();
        assert!(matches!(
            err,
            HearthError::InvalidTransition { ref from, ref action, .. }
                if from == "pending" && action == "mark_sold"
        ));
    }

    #[test]
    fn test_resolved_join_requests_never_move() {
        for status in [JoinRequestStatus::Approved, JoinRequestStatus::Rejected] {
            assert!(status.is_terminal());
            for action in [ReviewAction::Approve, ReviewAction::Reject] {
                assert!(transition(status, action).is_err());
            }
        }
    }

    #[test]
    fn test_block_toggles() {
        let blocked = transition(MemberStatus::Active, BlockAction::Block).unwrap();
        assert_eq!(blocked, MemberStatus::Blocked);
        assert!(transition(blocked, BlockAction::Block).is_err());
        assert_eq!(
            transition(blocked, BlockAction::Unblock).unwrap(),
            MemberStatus::Active
        );
    }

    #[test]
    fn test_sos_can_skip_acknowledge() {
        assert_eq!(
            transition(SosStatus::Open, SosAction::Resolve).unwrap(),
            SosStatus::Resolved
        );
        assert!(transition(SosStatus::Resolved, SosAction::Acknowledge).is_err());
        assert!(transition(SosStatus::Acknowledged, SosAction::Acknowledge).is_err());
    }
}
