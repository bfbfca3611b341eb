//! Listing repository: marketplace items, moderation and sale state.

use hearth_common::models::listing::{Listing, ListingStatus};
use sqlx::AnyPool;
use uuid::Uuid;

use crate::any_compat::{Select, now};

/// Create a listing awaiting moderation.
pub async fn create_listing(
    pool: &AnyPool,
    id: Uuid,
    community_id: Uuid,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
    price: f64,
) -> Result<Listing, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO listings (id, community_id, user_id, title, description, price, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        "#,
    )
    .bind(id.to_string())
    .bind(community_id.to_string())
    .bind(user_id.to_string())
    .bind(title)
    .bind(description)
    .bind(price)
    .bind(ListingStatus::Pending.as_str())
    .bind(now())
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &AnyPool, id: Uuid) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}

/// Listings of a community, newest first.
///
/// With `visible_to` set, only approved and sold listings plus that user's
/// own are returned; `None` is the moderator view.
pub async fn list_listings(
    pool: &AnyPool,
    community_id: Uuid,
    status: Option<ListingStatus>,
    visible_to: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Listing>, sqlx::Error> {
    let mut select =
        Select::new("SELECT * FROM listings WHERE 1 = 1").and_eq("community_id", community_id);
    if let Some(status) = status {
        select = select.and_eq("status", status.as_str());
    }
    if let Some(viewer) = visible_to {
        select = select.and_clause("(status IN ('approved', 'sold') OR user_id = ?)", viewer);
    }
    select.page("created_at DESC", limit, offset).fetch_all(pool).await
}

/// Edit a listing still waiting for review; `false` once it has been
/// reviewed or sold.
pub async fn update_listing(
    pool: &AnyPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    price: Option<f64>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE listings SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            updated_at = $4
        WHERE id = $5 AND status = $6
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(price)
    .bind(now())
    .bind(id.to_string())
    .bind(ListingStatus::Pending.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Move a listing from `from` to `to`; `false` if it was no longer in `from`.
pub async fn update_status(
    pool: &AnyPool,
    id: Uuid,
    from: ListingStatus,
    to: ListingStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE listings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
    )
    .bind(to.as_str())
    .bind(now())
    .bind(id.to_string())
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_listing(pool: &AnyPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1")
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
    async fn test_listing_round_trip_keeps_price() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;

        let listing = create_listing(
            &db.pool,
            Uuid::now_v7(),
            community.id,
            owner.id,
            "Bike",
            None,
            12.5,
        )
        .await
        .unwrap();
        assert_eq!(listing.price, 12.5);
        assert_eq!(listing.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_sold_requires_approved_row() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let listing = create_listing(
            &db.pool,
            Uuid::now_v7(),
            community.id,
            owner.id,
            "Lamp",
            Some("Brass"),
            20.0,
        )
        .await
        .unwrap();

        // Conditional update refuses a stale "approved" when the row is pending.
        assert!(!update_status(&db.pool, listing.id, ListingStatus::Approved, ListingStatus::Sold)
            .await
            .unwrap());
        assert!(update_status(&db.pool, listing.id, ListingStatus::Pending, ListingStatus::Approved)
            .await
            .unwrap());
        assert!(update_status(&db.pool, listing.id, ListingStatus::Approved, ListingStatus::Sold)
            .await
            .unwrap());

        let stored = find_by_id(&db.pool, listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Sold);
    }

    #[tokio::test]
    async fn test_edit_only_while_pending() {
        let db = Database::in_memory().await.unwrap();
        let owner = fixtures::user(&db.pool, "Owner").await;
        let community = fixtures::community(&db.pool, &owner).await;
        let listing = create_listing(
            &db.pool,
            Uuid::now_v7(),
            community.id,
            owner.id,
            "Desk",
            None,
            80.0,
        )
        .await
        .unwrap();
        assert!(update_listing(&db.pool, listing.id, None, None, Some(75.0))
            .await
            .unwrap());
        let edited = find_by_id(&db.pool, listing.id).await.unwrap().unwrap();
        assert_eq!(edited.price, 75.0);
        assert_eq!(edited.title, "Desk");
        assert_eq!(edited.status, ListingStatus::Pending);

        update_status(&db.pool, listing.id, ListingStatus::Pending, ListingStatus::Approved)
            .await
            .unwrap();
        assert!(!update_listing(&db.pool, listing.id, Some("Chair"), None, None)
            .await
            .unwrap());
        let stored = find_by_id(&db.pool, listing.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Desk");
        assert_eq!(stored.status, ListingStatus::Approved);
    }
}
