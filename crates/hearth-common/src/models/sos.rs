//! SOS alert model: a safety alert raised by a member for the managers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl SosStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "acknowledged" => Some(Self::Acknowledged),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SosAlert {
    pub id: Uuid,
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub location: Option<String>,
    pub status: SosStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSosRequest {
    pub community_id: Uuid,

    #[validate(length(min = 1, max = 1000, message = "Message must be 1-1000 characters"))]
    pub message: String,

    #[validate(length(max = 300))]
    pub location: Option<String>,
}

/// PATCH body: the status the alert should move to.
#[derive(Debug, Deserialize)]
pub struct UpdateSosRequest {
    pub status: SosStatus,
}
