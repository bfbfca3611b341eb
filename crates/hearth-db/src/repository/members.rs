//! Member repository: community membership, roles and blocking.

use hearth_common::models::member::{DirectoryEntry, Member, MemberRole, MemberStatus};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, contains_pattern};

/// Get a member by user ID and community ID.
pub async fn find_member(
    pool: &AnyPool,
    user_id: Uuid,
    community_id: Uuid,
) -> Result<Option<Member>, sqlx::Error> {
    sqlx::query_as::<_, Member>("SELECT * FROM members WHERE user_id = $1 AND community_id = $2")
        .bind(user_id.to_string())
        .bind(community_id.to_string())
        .fetch_optional(pool)
        .await
}

/// Members of a community joined with their account names and emails.
///
/// `search` matches a case-insensitive substring of the name or the email.
pub async fn list_directory(
    pool: &AnyPool,
    community_id: Uuid,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DirectoryEntry>, sqlx::Error> {
    let mut select = Select::new(
        r#"
        SELECT m.user_id, m.community_id, u.name, u.email, m.role, m.status, m.joined_at
        FROM members m
        INNER JOIN users u ON u.id = m.user_id
        WHERE 1 = 1
        "#,
    )
    .and_eq("m.community_id", community_id);

    if let Some(query) = search.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.and_clause(
            r"u.search_key LIKE ? ESCAPE '\'",
            contains_pattern(query),
        );
    }

    select
        .page("m.joined_at ASC", limit, offset)
        .fetch_all(pool)
        .await
}

/// Number of managers in a community.
pub async fn count_managers(pool: &AnyPool, community_id: Uuid) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM members WHERE community_id = $1 AND role = $2")
            .bind(community_id.to_string())
            .bind(MemberRole::Manager.as_str())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Move a member from `from` to `to`. Returns `false` when the member was not
/// in `from` (or is a manager, who can never be blocked).
pub async fn update_status(
    pool: &AnyPool,
    user_id: Uuid,
    community_id: Uuid,
    from: MemberStatus,
    to: MemberStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE members SET status = $1
        WHERE user_id = $2 AND community_id = $3 AND status = $4
          AND NOT ($1 = 'blocked' AND role = 'manager')
        "#,
    )
    .bind(to.as_str())
    .bind(user_id.to_string())
    .bind(community_id.to_string())
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Change a member's role.
pub async fn set_role(
    pool: &AnyPool,
    user_id: Uuid,
    community_id: Uuid,
    role: MemberRole,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE members SET role = $1 WHERE user_id = $2 AND community_id = $3")
            .bind(role.as_str())
            .bind(user_id.to_string())
            .bind(community_id.to_string())
            .execute(pool)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Remove a member and decrement the community's member count.
pub async fn remove_member(
    pool: &AnyPool,
    user_id: Uuid,
    community_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM members WHERE user_id = $1 AND community_id = $2")
        .bind(user_id.to_string())
        .bind(community_id.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed == 1 {
        sqlx::query(
            r#"
            UPDATE communities
            SET member_count = CASE WHEN member_count > 0 THEN member_count - 1 ELSE 0 END
            WHERE id = $1
            "#,
        )
        .bind(community_id.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(removed == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::repository::{communities, fixtures, join_requests, users};
    use hearth_common::models::{join_request::JoinRequestStatus, user::PlatformRole};

    async fn join(db: &Database, user: Uuid, community: Uuid, reviewer: Uuid) {
        let request = join_requests::create_request(&db.pool, Uuid::now_v7(), user, community, None)
            .await
            .unwrap();
        assert!(
            join_requests::resolve(&db.pool, &request, JoinRequestStatus::Approved, reviewer)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_directory_search_matches_name_or_email() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let alice = fixtures::user(&db.pool, "Alice").await;
        let bob = fixtures::user(&db.pool, "Bob").await;
        join(&db, alice.id, community.id, owner.id).await;
        join(&db, bob.id, community.id, owner.id).await;

        let by_name = list_directory(&db.pool, community.id, Some("ALI"), 50, 0)
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].user_id, alice.id);

        // fixture emails are "<name>@hearth.test"
        let by_email = list_directory(&db.pool, community.id, Some("BOB@HEARTH"), 50, 0)
            .await
            .unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "Bob");

        let everyone = list_directory(&db.pool, community.id, Some("  "), 50, 0)
            .await
            .unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn test_directory_search_folds_non_ascii() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let elise = users::create_user(
            &db.pool,
            Uuid::now_v7(),
            "ÉLISE Dupont",
            "Élise@Hearth.test",
            "hash",
            PlatformRole::Resident,
        )
        .await
        .unwrap();
        join(&db, elise.id, community.id, owner.id).await;

        for query in ["ÉLISE", "élise", "Dupont", "élise@hearth"] {
            let hits = list_directory(&db.pool, community.id, Some(query), 50, 0)
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "query {query:?}");
            assert_eq!(hits[0].user_id, elise.id);
        }
    }

    #[tokio::test]
    async fn test_manager_cannot_be_blocked() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        let blocked = update_status(
            &db.pool,
            owner.id,
            community.id,
            MemberStatus::Active,
            MemberStatus::Blocked,
        )
        .await
        .unwrap();
        assert!(!blocked);
    }

    #[tokio::test]
    async fn test_block_and_unblock() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let carol = fixtures::user(&db.pool, "Carol").await;
        join(&db, carol.id, community.id, owner.id).await;

        assert!(update_status(&db.pool, carol.id, community.id, MemberStatus::Active, MemberStatus::Blocked)
            .await
            .unwrap());
        // stale "from" status no longer matches
        assert!(!update_status(&db.pool, carol.id, community.id, MemberStatus::Active, MemberStatus::Blocked)
            .await
            .unwrap());
        let member = find_member(&db.pool, carol.id, community.id).await.unwrap().unwrap();
        assert!(member.is_blocked());

        assert!(update_status(&db.pool, carol.id, community.id, MemberStatus::Blocked, MemberStatus::Active)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_remove_member_updates_count() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let dave = fixtures::user(&db.pool, "Dave").await;
        join(&db, dave.id, community.id, owner.id).await;

        let before = communities::find_by_id(&db.pool, community.id).await.unwrap().unwrap();
        assert_eq!(before.member_count, 2);

        assert!(remove_member(&db.pool, dave.id, community.id).await.unwrap());
        assert!(!remove_member(&db.pool, dave.id, community.id).await.unwrap());

        let after = communities::find_by_id(&db.pool, community.id).await.unwrap().unwrap();
        assert_eq!(after.member_count, 1);
        assert_eq!(count_managers(&db.pool, community.id).await.unwrap(), 1);
    }
}
