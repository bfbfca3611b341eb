//! Pulse repository: community posts and their moderation queue.

use hearth_common::models::pulse::{Pulse, PulseStatus};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now};

/// Create a pulse awaiting moderation.
pub async fn create_pulse(
    pool: &AnyPool,
    id: Uuid,
    community_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Pulse, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO pulses (id, community_id, user_id, content, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#,
    )
    .bind(id.to_string())
    .bind(community_id.to_string())
    .bind(user_id.to_string())
    .bind(content)
    .bind(PulseStatus::Pending.as_str())
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<Pulse>, sqlx::Error> {
    sqlx::query_as::<_, Pulse>("SELECT * FROM pulses WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// Pulses of a community, newest first.
///
/// With `visible_to` set, only approved pulses plus that user's own are
/// returned (the resident view); `None` is the moderator view.
pub async fn list_pulses(
    pool: &AnyPool,
    community_id: Uuid,
    status: Option<PulseStatus>,
    visible_to: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Pulse>, sqlx::Error> {
    let mut select =
        Select::new("SELECT * FROM pulses WHERE 1 = 1").and_eq("community_id", community_id);
    if let Some(status) = status {
        select = select.and_eq("status", status.as_str());
    }
    if let Some(viewer) = visible_to {
        select = select.and_clause("(status = 'approved' OR user_id = ?)", viewer);
    }
    select.page("created_at DESC", limit, offset).fetch_all(pool).await
}

/// Replace the content of a pulse still waiting for review; `false` once it
/// has been reviewed.
pub async fn update_content(
    pool: &AnyPool,
    id: Uuid,
    content: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE pulses SET content = $1, updated_at = $2 WHERE id = $3 AND status = $4")
            .bind(content)
            .bind(now())
            .bind(id.to_string())
            .bind(PulseStatus::Pending.as_str())
            .execute(pool)
            .await?;
    Ok(result.rows_affected() == 1)
}

/// Move a pulse from `from` to `to`; `false` if it was no longer in `from`.
pub async fn update_status(
    pool: &AnyPool,
    id: Uuid,
    from: PulseStatus,
    to: PulseStatus,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE pulses SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
            .bind(to.as_str())
            .bind(now())
            .bind(id.to_string())
            .bind(from.as_str())
            .execute(pool)
            .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_pulse(pool: &AnyPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pulses WHERE id = $1")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_resident_view_hides_others_pending() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let viewer = fixtures::user(&db.pool, "Viewer").await;

        let approved = create_pulse(&db.pool, Uuid::now_v7(), community.id, owner.id, "Pool opens")
            .await
            .unwrap();
        update_status(&db.pool, approved.id, PulseStatus::Pending, PulseStatus::Approved)
            .await
            .unwrap();
        create_pulse(&db.pool, Uuid::now_v7(), community.id, owner.id, "Draft")
            .await
            .unwrap();
        let own = create_pulse(&db.pool, Uuid::now_v7(), community.id, viewer.id, "Mine")
            .await
            .unwrap();

        let visible = list_pulses(&db.pool, community.id, None, Some(viewer.id), 50, 0)
            .await
            .unwrap();
        let ids: Vec<Uuid> = visible.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&approved.id));
        assert!(ids.contains(&own.id));

        let queue = list_pulses(&db.pool, community.id, Some(PulseStatus::Pending), None, 50, 0)
            .await
            .unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_only_while_pending() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        let pulse = create_pulse(&db.pool, Uuid::now_v7(), community.id, owner.id, "v1")
            .await
            .unwrap();
        assert!(update_content(&db.pool, pulse.id, "v2").await.unwrap());
        assert!(update_status(&db.pool, pulse.id, PulseStatus::Pending, PulseStatus::Approved)
            .await
            .unwrap());
        assert!(!update_content(&db.pool, pulse.id, "v3").await.unwrap());

        let stored = find_by_id(&db.pool, pulse.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "v2");
        assert_eq!(stored.status, PulseStatus::Approved);

        assert!(delete_pulse(&db.pool, pulse.id).await.unwrap());
        assert!(find_by_id(&db.pool, pulse.id).await.unwrap().is_none());
    }
}
