//! Join request repository: the membership workflow.

use hearth_common::models::{
    join_request::{JoinRequest, JoinRequestStatus},
    member::{MemberRole, MemberStatus},
};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now};

/// Open a pending join request.
pub async fn create_request(
    pool: &AnyPool,
    id: Uuid,
    user_id: Uuid,
    community_id: Uuid,
    message: Option<&str>,
) -> Result<JoinRequest, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO join_requests (id, user_id, community_id, message, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(community_id.to_string())
    .bind(message)
    .bind(JoinRequestStatus::Pending.as_str())
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<JoinRequest>, sqlx::Error> {
    sqlx::query_as::<_, JoinRequest>("SELECT * FROM join_requests WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// The open request of a user for a community, if any.
pub async fn find_pending(
    pool: &AnyPool,
    user_id: Uuid,
    community_id: Uuid,
) -> Result<Option<JoinRequest>, sqlx::Error> {
    sqlx::query_as::<_, JoinRequest>(
        "SELECT * FROM join_requests WHERE user_id = $1 AND community_id = $2 AND status = $3",
    )
    .bind(user_id.to_string())
    .bind(community_id.to_string())
    .bind(JoinRequestStatus::Pending.as_str())
    .fetch_optional(pool)
    .await
}

/// Requests for a community, oldest first, optionally by status.
pub async fn list_for_community(
    pool: &AnyPool,
    community_id: Uuid,
    status: Option<JoinRequestStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<JoinRequest>, sqlx::Error> {
    let mut select = Select::new("SELECT * FROM join_requests WHERE 1 = 1")
        .and_eq("community_id", community_id);
    if let Some(status) = status {
        select = select.and_eq("status", status.as_str());
    }
    select.page("created_at ASC", limit, offset).fetch_all(pool).await
}

/// A user's own requests, newest first.
pub async fn list_for_user(pool: &AnyPool, user_id: Uuid) -> Result<Vec<JoinRequest>, sqlx::Error> {
    sqlx::query_as::<_, JoinRequest>(
        "SELECT * FROM join_requests WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await
}

/// Resolve a pending request to `to`.
///
/// Runs in one transaction: the request only moves if it is still pending, and
/// approval inserts the member row and bumps `member_count`. Returns `false`
/// when the request had already been resolved.
pub async fn resolve(
    pool: &AnyPool,
    request: &JoinRequest,
    to: JoinRequestStatus,
    reviewer: Uuid,
) -> Result<bool, sqlx::Error> {
    let ts = now();
    let mut tx = pool.begin().await?;

    let moved = sqlx::query(
        r#"
        UPDATE join_requests SET status = $1, resolved_at = $2, resolved_by = $3
        WHERE id = $4 AND status = $5
        "#,
    )
    .bind(to.as_str())
    .bind(&ts)
    .bind(reviewer.to_string())
    .bind(request.id.to_string())
    .bind(JoinRequestStatus::Pending.as_str())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if moved != 1 {
        tx.rollback().await?;
        return Ok(false);
    }

    if to == JoinRequestStatus::Approved {
        let inserted = sqlx::query(
            r#"
            INSERT INTO members (user_id, community_id, role, status, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, community_id) DO NOTHING
            "#,
        )
        .bind(request.user_id.to_string())
        .bind(request.community_id.to_string())
        .bind(MemberRole::Member.as_str())
        .bind(MemberStatus::Active.as_str())
        .bind(&ts)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 1 {
            sqlx::query("UPDATE communities SET member_count = member_count + 1 WHERE id = $1")
                .bind(request.community_id.to_string())
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::repository::{communities, fixtures, members};

    #[tokio::test]
    async fn test_approval_creates_membership() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let erin = fixtures::user(&db.pool, "Erin").await;

        let request = create_request(&db.pool, Uuid::now_v7(), erin.id, community.id, Some("hi"))
            .await
            .unwrap();
        assert_eq!(request.status, JoinRequestStatus::Pending);
        assert!(members::find_member(&db.pool, erin.id, community.id).await.unwrap().is_none());

        assert!(resolve(&db.pool, &request, JoinRequestStatus::Approved, owner.id).await.unwrap());

        let stored = find_by_id(&db.pool, request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JoinRequestStatus::Approved);
        assert_eq!(stored.resolved_by, Some(owner.id));
        assert!(stored.resolved_at.is_some());

        let member = members::find_member(&db.pool, erin.id, community.id).await.unwrap().unwrap();
        assert_eq!(member.role, MemberRole::Member);
        let community = communities::find_by_id(&db.pool, community.id).await.unwrap().unwrap();
        assert_eq!(community.member_count, 2);
    }

    #[tokio::test]
    async fn test_resolved_request_is_never_mutated() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let finn = fixtures::user(&db.pool, "Finn").await;

        let request = create_request(&db.pool, Uuid::now_v7(), finn.id, community.id, None)
            .await
            .unwrap();
        assert!(resolve(&db.pool, &request, JoinRequestStatus::Rejected, owner.id).await.unwrap());

        // A second reviewer acting on a stale copy cannot flip it.
        assert!(!resolve(&db.pool, &request, JoinRequestStatus::Approved, owner.id).await.unwrap());
        let stored = find_by_id(&db.pool, request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JoinRequestStatus::Rejected);
        assert!(members::find_member(&db.pool, finn.id, community.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_one_pending_request_per_user() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let gus = fixtures::user(&db.pool, "Gus").await;

        let first = create_request(&db.pool, Uuid::now_v7(), gus.id, community.id, None)
            .await
            .unwrap();
        assert!(create_request(&db.pool, Uuid::now_v7(), gus.id, community.id, None)
            .await
            .is_err());

        // Once resolved, a new request may be opened.
        resolve(&db.pool, &first, JoinRequestStatus::Rejected, owner.id).await.unwrap();
        create_request(&db.pool, Uuid::now_v7(), gus.id, community.id, None)
            .await
            .unwrap();

        let pending = list_for_community(&db.pool, community.id, Some(JoinRequestStatus::Pending), 10, 0)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(list_for_user(&db.pool, gus.id).await.unwrap().len(), 2);
        assert!(find_pending(&db.pool, gus.id, community.id).await.unwrap().is_some());
    }
}
