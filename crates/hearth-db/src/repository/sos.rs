//! SOS alert repository.

use hearth_common::models::sos::{SosAlert, SosStatus};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now};

pub async fn create_alert(
    pool: &AnyPool,
    id: Uuid,
    community_id: Uuid,
    user_id: Uuid,
    message: &str,
    location: Option<&str>,
) -> Result<SosAlert, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sos_alerts (id, community_id, user_id, message, location, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        "#,
    )
    .bind(id.to_string())
    .bind(community_id.to_string())
    .bind(user_id.to_string())
    .bind(message)
    .bind(location)
    .bind(SosStatus::Open.as_str())
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<SosAlert>, sqlx::Error> {
    sqlx::query_as::<_, SosAlert>("SELECT * FROM sos_alerts WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// Alerts of a community, newest first.
pub async fn list_alerts(
    pool: &AnyPool,
    community_id: Uuid,
    status: Option<SosStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<SosAlert>, sqlx::Error> {
    let mut select =
        Select::new("SELECT * FROM sos_alerts WHERE 1 = 1").and_eq("community_id", community_id);
    if let Some(status) = status {
        select = select.and_eq("status", status.as_str());
    }
    select.page("created_at DESC", limit, offset).fetch_all(pool).await
}

pub async fn update_status(
    pool: &AnyPool,
    id: Uuid,
    from: SosStatus,
    to: SosStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE sos_alerts SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
    )
    .bind(to.as_str())
    .bind(now())
    .bind(id.to_string())
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_alert(pool: &AnyPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sos_alerts WHERE id = $1")
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
    async fn test_alert_lifecycle() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        let alert = create_alert(
            &db.pool,
            Uuid::now_v7(),
            community.id,
            owner.id,
            "Water leak in lobby",
            Some("Lobby"),
        )
        .await
        .unwrap();
        assert_eq!(alert.status, SosStatus::Open);

        assert!(update_status(&db.pool, alert.id, SosStatus::Open, SosStatus::Acknowledged)
            .await
            .unwrap());
        let open = list_alerts(&db.pool, community.id, Some(SosStatus::Open), 10, 0)
            .await
            .unwrap();
        assert!(open.is_empty());

        assert!(delete_alert(&db.pool, alert.id).await.unwrap());
        assert!(list_alerts(&db.pool, community.id, None, 10, 0).await.unwrap().is_empty());
    }
}
