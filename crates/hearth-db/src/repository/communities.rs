//! Community repository: CRUD for communities.

use hearth_common::models::{
    community::{Community, CommunityStatus},
    member::{MemberRole, MemberStatus},
};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now};

/// Create a community and make its creator the first manager.
pub async fn create_community(
    pool: &AnyPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
    status: CommunityStatus,
    creator: Uuid,
) -> Result<Community, sqlx::Error> {
    let ts = now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO communities (id, name, description, status, member_count, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 1, $5, $6, $6)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(description)
    .bind(status.as_str())
    .bind(creator.to_string())
    .bind(&ts)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO members (user_id, community_id, role, status, joined_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(creator.to_string())
    .bind(id.to_string())
    .bind(MemberRole::Manager.as_str())
    .bind(MemberStatus::Active.as_str())
    .bind(&ts)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Find a community by ID.
pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// List communities, optionally by status, largest first.
pub async fn list_communities(
    pool: &AnyPool,
    status: Option<CommunityStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Community>, sqlx::Error> {
    let mut select = Select::new("SELECT * FROM communities WHERE 1 = 1");
    if let Some(status) = status {
        select = select.and_eq("status", status.as_str());
    }
    select
        .page("member_count DESC, name ASC", limit, offset)
        .fetch_all(pool)
        .await
}

/// List communities a user is a member of.
pub async fn list_user_communities(
    pool: &AnyPool,
    user_id: Uuid,
) -> Result<Vec<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(
        r#"
        SELECT c.* FROM communities c
        INNER JOIN members m ON m.community_id = c.id
        WHERE m.user_id = $1
        ORDER BY c.name
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await
}

/// Number of communities a user has created.
pub async fn count_created_by(pool: &AnyPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM communities WHERE created_by = $1")
            .bind(user_id.to_string())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Update name and/or description.
pub async fn update_community(
    pool: &AnyPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE communities SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(description)
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await
}

/// Set the community status (admin action).
pub async fn set_status(
    pool: &AnyPool,
    id: Uuid,
    status: CommunityStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE communities SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id.to_string())
        .bind(status.as_str())
        .bind(now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete a community and everything it owns.
///
/// Children are removed explicitly so the result does not depend on the
/// backend enforcing `ON DELETE CASCADE`.
pub async fn delete_community(pool: &AnyPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let id = id.to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM event_registrations WHERE event_id IN (SELECT id FROM events WHERE community_id = $1)",
    )
    .bind(&id)
    .execute(&mut *tx)
    .await?;

    for table in ["events", "sos_alerts", "listings", "pulses", "join_requests", "members"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE community_id = $1"))
            .bind(&id)
            .execute(&mut *tx)
            .await?;
    }

    let result = sqlx::query("DELETE FROM communities WHERE id = $1")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{fixtures, members};
    use crate::Database;

    #[tokio::test]
    async fn test_creator_becomes_manager() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        assert_eq!(community.member_count, 1);
        assert_eq!(community.status, CommunityStatus::Active);
        let member = members::find_member(&db.pool, owner.id, community.id)
            .await
            .unwrap()
            .unwrap();
        assert!(member.is_manager());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let active = fixtures::community(&db.pool, &owner).await;
        let pending = create_community(
            &db.pool,
            Uuid::now_v7(),
            "Birch Lane",
            None,
            CommunityStatus::Pending,
            owner.id,
        )
        .await
        .unwrap();

        let all = list_communities(&db.pool, None, 10, 0).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_pending = list_communities(&db.pool, Some(CommunityStatus::Pending), 10, 0)
            .await
            .unwrap();
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].id, pending.id);
        assert_ne!(only_pending[0].id, active.id);
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        let updated = update_community(&db.pool, community.id, Some("Maple Court East"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Maple Court East");
        assert_eq!(updated.description, community.description);
    }

    #[tokio::test]
    async fn test_delete_removes_memberships() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        assert!(delete_community(&db.pool, community.id).await.unwrap());
        assert!(find_by_id(&db.pool, community.id).await.unwrap().is_none());
        assert!(members::find_member(&db.pool, owner.id, community.id)
            .await
            .unwrap()
            .is_none());
    }
}
