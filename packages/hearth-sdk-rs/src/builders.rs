//! Fluent builders for request bodies.

use serde_json::{Value, json};

use crate::error::{HearthError, Result};

// ── Price input ───────────────────────────────────────────────────────────────

/// A price as typed by the user: a number, or the raw text of a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl From<f64> for PriceInput {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PriceInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for PriceInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl PriceInput {
    /// Coerce to a non-negative finite number (`"12.5"` -> `12.5`).
    pub fn to_number(&self) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| HearthError::InvalidInput(format!("price '{s}' is not a number")))?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(HearthError::InvalidInput(
                "price must be a non-negative number".into(),
            ));
        }
        Ok(value)
    }
}

// ── Listing builder ───────────────────────────────────────────────────────────

/// Fluent builder for a marketplace listing.
///
/// ```rust
/// use hearth_sdk::builders::ListingBuilder;
///
/// let body = ListingBuilder::new("community-id")
///     .title("Bike")
///     .price("12.5")
///     .build()
///     .unwrap();
/// assert_eq!(body["price"], 12.5);
/// ```
#[derive(Debug, Clone)]
pub struct ListingBuilder {
    community_id: String,
    title: String,
    description: Option<String>,
    price: Option<PriceInput>,
}

impl ListingBuilder {
    pub fn new(community_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            title: String::new(),
            description: None,
            price: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn price(mut self, price: impl Into<PriceInput>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// The JSON body, with the price already numeric.
    pub fn build(self) -> Result<Value> {
        if self.title.trim().is_empty() {
            return Err(HearthError::InvalidInput("title is required".into()));
        }
        let price = self
            .price
            .ok_or_else(|| HearthError::InvalidInput("price is required".into()))?
            .to_number()?;

        let mut body = json!({
            "community_id": self.community_id,
            "title": self.title,
            "price": price,
        });
        if let Some(d) = self.description {
            body["description"] = json!(d);
        }
        Ok(body)
    }
}

// ── Event builder ─────────────────────────────────────────────────────────────

/// Fluent builder for an event. Times are RFC 3339 strings.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    community_id: String,
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: String,
    ends_at: String,
    capacity: Option<i64>,
}

impl EventBuilder {
    pub fn new(community_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn schedule(mut self, starts_at: impl Into<String>, ends_at: impl Into<String>) -> Self {
        self.starts_at = starts_at.into();
        self.ends_at = ends_at.into();
        self
    }

    pub fn capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn build(self) -> Value {
        let mut body = json!({
            "community_id": self.community_id,
            "title": self.title,
            "starts_at": self.starts_at,
            "ends_at": self.ends_at,
        });
        if let Some(description) = self.description {
            body["description"] = json!(description);
        }
        if let Some(location) = self.location {
            body["location"] = json!(location);
        }
        if let Some(capacity) = self.capacity {
            body["capacity"] = json!(capacity);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_price_is_sent_as_number() {
        let body = ListingBuilder::new("comm1")
            .title("Bike")
            .price("12.5")
            .build()
            .unwrap();
        assert_eq!(body["price"], json!(12.5));
        assert!(body["price"].is_f64());
    }

    #[test]
    fn test_invalid_prices_fail_early() {
        for bad in ["twelve", "-1", "NaN", ""] {
            let err = ListingBuilder::new("comm1").title("Bike").price(bad).build();
            assert!(matches!(err, Err(HearthError::InvalidInput(_))), "{bad}");
        }
        assert!(ListingBuilder::new("comm1").title("Bike").build().is_err());
    }

    #[test]
    fn test_event_builder_skips_unset_fields() {
        let body = EventBuilder::new("comm1")
            .title("Potluck")
            .schedule("2030-06-01T18:00:00Z", "2030-06-01T21:00:00Z")
            .capacity(20)
            .build();
        assert_eq!(body["capacity"], 20);
        assert!(body.get("location").is_none());
    }
}
