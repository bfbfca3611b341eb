//! API payload types and client-side status guards.
//!
//! The guards mirror the server workflows so a caller can hide controls for
//! transitions the server would refuse.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    Resident,
    Admin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: PlatformRole,
    pub created_at: String,
}

/// Login / register response.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityStatus {
    Active,
    Inactive,
    Pending,
}

impl CommunityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: CommunityStatus,
    #[serde(default)]
    pub member_count: i64,
}

// ── Members ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Manager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Blocked,
}

/// A directory row: membership plus the account's name and email.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub community_id: String,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_manager(&self) -> bool {
        self.role == MemberRole::Manager
    }

    pub fn is_blocked(&self) -> bool {
        self.status == MemberStatus::Blocked
    }
}

// ── Review workflows ──────────────────────────────────────────────────────────

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

/// Shared by join requests and pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Only pending items can be reviewed; resolved ones never move again.
    pub fn allows(self, _action: ReviewAction) -> bool {
        self == Self::Pending
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub id: String,
    pub user_id: String,
    pub community_id: String,
    #[serde(default)]
    pub message: Option<String>,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pulse {
    pub id: String,
    pub community_id: String,
    pub user_id: String,
    pub content: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Approve,
    Reject,
    MarkSold,
}

impl ListingAction {
    /// Final path segment of the action endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::MarkSold => "sold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
    Sold,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Sold => "sold",
        }
    }

    /// `pending -> approved | rejected`, `approved -> sold`.
    pub fn allows(self, action: ListingAction) -> bool {
        matches!(
            (self, action),
            (Self::Pending, ListingAction::Approve)
                | (Self::Pending, ListingAction::Reject)
                | (Self::Approved, ListingAction::MarkSold)
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub id: String,
    pub community_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub status: ListingStatus,
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub community_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub registered_count: i64,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.registered_count >= cap)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRegistration {
    pub event_id: String,
    pub user_id: String,
    pub registered_at: String,
}

// ── SOS ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl SosStatus {
    /// Whether the alert may move to `target`.
    pub fn can_move_to(self, target: SosStatus) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Acknowledged)
                | (Self::Open, Self::Resolved)
                | (Self::Acknowledged, Self::Resolved)
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SosAlert {
    pub id: String,
    pub community_id: String,
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub location: Option<String>,
    pub status: SosStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_guard_edges() {
        let statuses = [
            ListingStatus::Pending,
            ListingStatus::Approved,
            ListingStatus::Rejected,
            ListingStatus::Sold,
        ];
        let actions = [ListingAction::Approve, ListingAction::Reject, ListingAction::MarkSold];

        let allowed: Vec<_> = statuses
            .iter()
            .flat_map(|s| actions.iter().map(move |a| (*s, *a)))
            .filter(|(s, a)| s.allows(*a))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (ListingStatus::Pending, ListingAction::Approve),
                (ListingStatus::Pending, ListingAction::Reject),
                (ListingStatus::Approved, ListingAction::MarkSold),
            ]
        );
    }

    #[test]
    fn test_resolved_reviews_are_terminal() {
        assert!(ReviewStatus::Pending.allows(ReviewAction::Approve));
        assert!(!ReviewStatus::Approved.allows(ReviewAction::Reject));
        assert!(!ReviewStatus::Rejected.allows(ReviewAction::Approve));
        assert!(ReviewStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_sos_guard() {
        assert!(SosStatus::Open.can_move_to(SosStatus::Resolved));
        assert!(!SosStatus::Resolved.can_move_to(SosStatus::Acknowledged));
        assert!(!SosStatus::Acknowledged.can_move_to(SosStatus::Open));
    }
}
