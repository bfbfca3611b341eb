//! Listing model: a marketplace item within a community.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "sold" => Some(Self::Sold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: Uuid,
    pub community_id: Uuid,
    /// Seller.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    pub community_id: Uuid,

    #[validate(length(min = 2, max = 150, message = "Title must be 2-150 characters"))]
    pub title: String,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// Accepts `12.5` or `"12.5"`.
    #[serde(deserialize_with = "price::deserialize")]
    pub price: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 2, max = 150, message = "Title must be 2-150 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "price::deserialize_opt")]
    pub price: Option<f64>,
}
