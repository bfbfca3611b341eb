//! Community permission system.
//!
//! Permissions are a bitfield computed per (user, community) from the
//! platform role, the member role and the member status. Routes ask for the
//! bits they need instead of re-deriving role rules.

use bitflags::bitflags;

use crate::error::HearthError;
use crate::models::{member::Member, user::PlatformRole};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        // === Member ===
        /// Read community content and the member directory
        const VIEW                  = 1 << 0;
        /// Create pulses
        const POST_PULSES           = 1 << 1;
        /// Create marketplace listings
        const LIST_ITEMS            = 1 << 2;
        /// Register for events
        const REGISTER_EVENTS       = 1 << 3;
        /// Raise SOS alerts
        const RAISE_SOS             = 1 << 4;

        // === Manager ===
        /// Approve/reject pulses and listings, delete others' content
        const MODERATE_CONTENT      = 1 << 5;
        /// Approve/reject join requests
        const REVIEW_JOIN_REQUESTS  = 1 << 6;
        /// Block, unblock, change member roles
        const MANAGE_MEMBERS        = 1 << 7;
        /// Create, edit and delete events
        const MANAGE_EVENTS         = 1 << 8;
        /// Edit community details, handle SOS alerts
        const MANAGE_COMMUNITY      = 1 << 9;

        // === Meta ===
        /// Platform admin (all permissions in every community)
        const ADMINISTRATOR         = 1 << 10;
    }
}

impl Permissions {
    /// Permissions of an active, regular member.
    pub fn default_member() -> Self {
        Self::VIEW | Self::POST_PULSES | Self::LIST_ITEMS | Self::REGISTER_EVENTS | Self::RAISE_SOS
    }

    /// Permissions of an active manager.
    pub fn manager() -> Self {
        Self::default_member()
            | Self::MODERATE_CONTENT
            | Self::REVIEW_JOIN_REQUESTS
            | Self::MANAGE_MEMBERS
            | Self::MANAGE_EVENTS
            | Self::MANAGE_COMMUNITY
    }

    /// What a blocked member keeps.
    pub fn blocked() -> Self {
        Self::VIEW | Self::RAISE_SOS
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Self::ADMINISTRATOR)
    }

    pub fn has(&self, required: Permissions) -> bool {
        self.is_admin() || self.contains(required)
    }

    /// Fail with `MissingPermission` naming the absent bits.
    pub fn require(&self, required: Permissions) -> Result<(), HearthError> {
        if self.has(required) {
            return Ok(());
        }
        let missing = required.difference(*self);
        Err(HearthError::MissingPermission {
            permission: missing
                .iter_names()
                .map(|(name, _)| name)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Compute effective permissions for a user in a community.
///
/// 1. Platform admins hold everything.
/// 2. Non-members hold nothing.
/// 3. Blocked members keep only [`Permissions::blocked`], whatever their role.
/// 4. Otherwise the member role decides.
pub fn compute_permissions(role: PlatformRole, membership: Option<&Member>) -> Permissions {
    if role == PlatformRole::Admin {
        return Permissions::all();
    }

    match membership {
        None => Permissions::empty(),
        Some(m) if m.is_blocked() => Permissions::blocked(),
        Some(m) if m.is_manager() => Permissions::manager(),
        Some(_) => Permissions::default_member(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::{MemberRole, MemberStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn member(role: MemberRole, status: MemberStatus) -> Member {
        Member {
            user_id: Uuid::now_v7(),
            community_id: Uuid::now_v7(),
            role,
            status,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_blocked_member_cannot_post() {
        let m = member(MemberRole::Member, MemberStatus::Blocked);
        let perms = compute_permissions(PlatformRole::Resident, Some(&m));
        assert!(!perms.has(Permissions::POST_PULSES));
        assert!(!perms.has(Permissions::LIST_ITEMS));
        assert!(perms.has(Permissions::VIEW));
    }

    #[test]
    fn test_manager_can_moderate() {
        let m = member(MemberRole::Manager, MemberStatus::Active);
        let perms = compute_permissions(PlatformRole::Resident, Some(&m));
        assert!(perms.has(Permissions::MODERATE_CONTENT | Permissions::REVIEW_JOIN_REQUESTS));
        assert!(!perms.is_admin());
    }

    #[test]
    fn test_admin_without_membership() {
        let perms = compute_permissions(PlatformRole::Admin, None);
        assert!(perms.has(Permissions::MANAGE_MEMBERS));
    }

    #[test]
    fn test_require_names_missing_bits() {
        let perms = compute_permissions(PlatformRole::Resident, None);
        let err = perms.require(Permissions::VIEW).unwrap_err();
        assert!(matches!(
            err,
            HearthError::MissingPermission { ref permission } if permission == "VIEW"
        ));
    }
}
