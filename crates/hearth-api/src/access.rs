//! Per-community access checks.
//!
//! Handlers resolve the caller's membership once, then ask for the
//! permission bits the operation needs.

use hearth_common::{
    error::{HearthError, HearthResult},
    models::{community::Community, member::Member},
    permissions::{Permissions, compute_permissions},
};
use hearth_db::{
    Database,
    repository::{communities, members},
};
use uuid::Uuid;

use crate::middleware::AuthContext;

/// The caller's standing in one community.
#[derive(Debug, Clone)]
pub struct CommunityAccess {
    pub community: Community,
    pub member: Option<Member>,
    pub permissions: Permissions,
}

impl CommunityAccess {
    pub async fn load(db: &Database, auth: &AuthContext, community_id: Uuid) -> HearthResult<Self> {
        let community = communities::find_by_id(&db.pool, community_id)
            .await?
            .ok_or_else(|| HearthError::not_found("Community"))?;
        let member = members::find_member(&db.pool, auth.user_id, community_id).await?;
        let permissions = compute_permissions(auth.role, member.as_ref());

        Ok(Self {
            community,
            member,
            permissions,
        })
    }

    pub fn can(&self, required: Permissions) -> bool {
        self.permissions.has(required)
    }

    /// Fail unless the caller holds `required`. Blocked members get
    /// `MemberBlocked` rather than a bare permission error.
    pub fn require(&self, required: Permissions) -> HearthResult<()> {
        if self.can(required) {
            return Ok(());
        }
        if self.member.as_ref().is_some_and(Member::is_blocked) {
            return Err(HearthError::MemberBlocked);
        }
        self.permissions.require(required)
    }
}
