//! Member directory for one community.

use crate::error::Result;
use crate::rest::RestClient;
use crate::types::{Member, MemberRole};

/// A control offered next to a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    Block,
    Unblock,
    Promote,
    Demote,
}

/// Cached member list with search and per-member controls.
pub struct MemberDirectory {
    rest: RestClient,
    community_id: String,
    /// The signed-in user, never offered Block or Demote on themselves.
    viewer_id: String,
    members: Vec<Member>,
}

impl MemberDirectory {
    pub fn new(
        rest: RestClient,
        community_id: impl Into<String>,
        viewer_id: impl Into<String>,
    ) -> Self {
        Self {
            rest,
            community_id: community_id.into(),
            viewer_id: viewer_id.into(),
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Reload every page of the directory.
    pub async fn refresh(&mut self) -> Result<&[Member]> {
        self.members = self.rest.list_members(&self.community_id).await?;
        Ok(&self.members)
    }

    /// Members whose name or email contains `query`, ignoring case. A blank
    /// query matches everyone.
    pub fn search(&self, query: &str) -> Vec<&Member> {
        let needle = query.trim().to_lowercase();
        self.members
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || m.name.to_lowercase().contains(&needle)
                    || m.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Controls to show for `member`. `Block` is absent for managers and for
    /// the viewer.
    pub fn actions_for(&self, member: &Member) -> Vec<MemberAction> {
        let is_viewer = member.user_id == self.viewer_id;
        let mut actions = Vec::new();

        if member.is_blocked() {
            actions.push(MemberAction::Unblock);
        } else if !member.is_manager() && !is_viewer {
            actions.push(MemberAction::Block);
        }

        match member.role {
            MemberRole::Member if !member.is_blocked() => actions.push(MemberAction::Promote),
            MemberRole::Manager if !is_viewer => actions.push(MemberAction::Demote),
            _ => {}
        }
        actions
    }

    pub async fn block(&mut self, user_id: &str) -> Result<&[Member]> {
        self.rest.block_member(&self.community_id, user_id).await?;
        self.refresh().await
    }

    pub async fn unblock(&mut self, user_id: &str) -> Result<&[Member]> {
        self.rest.unblock_member(&self.community_id, user_id).await?;
        self.refresh().await
    }

    pub async fn set_role(&mut self, user_id: &str, role: MemberRole) -> Result<&[Member]> {
        self.rest
            .set_member_role(&self.community_id, user_id, role)
            .await?;
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberStatus;

    fn member(id: &str, name: &str, email: &str, role: MemberRole, status: MemberStatus) -> Member {
        Member {
            user_id: id.into(),
            community_id: "comm1".into(),
            name: name.into(),
            email: email.into(),
            role,
            status,
        }
    }

    fn directory() -> MemberDirectory {
        let rest = RestClient::new(Some("t"), Some("http://localhost:1")).unwrap();
        let mut dir = MemberDirectory::new(rest, "comm1", "u-viewer");
        dir.members = vec![
            member("u-viewer", "Vera", "vera@hearth.test", MemberRole::Manager, MemberStatus::Active),
            member("u-mgr", "Manny", "manny@hearth.test", MemberRole::Manager, MemberStatus::Active),
            member("u-ann", "Ann Lee", "ANN@Example.org", MemberRole::Member, MemberStatus::Active),
            member("u-bob", "Bob", "bob@example.org", MemberRole::Member, MemberStatus::Blocked),
        ];
        dir
    }

    #[test]
    fn test_search_matches_name_or_email_case_insensitively() {
        let dir = directory();
        let names = |q: &str| dir.search(q).iter().map(|m| m.name.clone()).collect::<Vec<_>>();

        assert_eq!(names("LEE"), vec!["Ann Lee"]);
        assert_eq!(names("example.ORG"), vec!["Ann Lee", "Bob"]);
        assert_eq!(names("  "), vec!["Vera", "Manny", "Ann Lee", "Bob"]);
        assert!(names("zzz").is_empty());
    }

    #[test]
    fn test_block_is_absent_for_managers_and_viewer() {
        let dir = directory();
        let actions = |i: usize| dir.actions_for(&dir.members()[i]);

        assert!(!actions(0).contains(&MemberAction::Block));
        assert!(!actions(1).contains(&MemberAction::Block));
        assert_eq!(actions(1), vec![MemberAction::Demote]);
        assert_eq!(actions(2), vec![MemberAction::Block, MemberAction::Promote]);
        assert_eq!(actions(3), vec![MemberAction::Unblock]);
    }
}
