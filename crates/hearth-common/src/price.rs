//! Listing price parsing.
//!
//! Marketplace forms submit prices as text, so the API accepts either a JSON
//! number or a numeric string and stores an `f64`.

use serde::{Deserialize, Deserializer};

use crate::error::HearthError;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

/// Parse a price from user input (`"12.5"`, `" 3 "`).
pub fn parse_price(raw: &str) -> Result<f64, HearthError> {
    let value: f64 = raw.trim().parse().map_err(|_| HearthError::Validation {
        message: format!("Price '{raw}' is not a number"),
    })?;
    check_price(value)
}

/// Reject prices that are negative or not finite.
pub fn check_price(value: f64) -> Result<f64, HearthError> {
    if !value.is_finite() || value < 0.0 {
        return Err(HearthError::Validation {
            message: "Price must be a non-negative number".into(),
        });
    }
    Ok(value)
}

fn resolve(raw: RawPrice) -> Result<f64, HearthError> {
    match raw {
        RawPrice::Number(n) => check_price(n),
        RawPrice::Text(s) => parse_price(&s),
    }
}

/// `deserialize_with` helper for a required price.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawPrice::deserialize(deserializer)?;
    resolve(raw).map_err(serde::de::Error::custom)
}

/// `deserialize_with` helper for an optional price.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawPrice>::deserialize(deserializer)?
        .map(resolve)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(deserialize_with = "deserialize")]
        price: f64,
        #[serde(default, deserialize_with = "deserialize_opt")]
        discount: Option<f64>,
    }

    #[test]
    fn test_string_price_is_coerced() {
        let body: Body = serde_json::from_str(r#"{"price":"12.5"}"#).unwrap();
        assert_eq!(body.price, 12.5);
        assert_eq!(body.discount, None);
    }

    #[test]
    fn test_number_price_passes_through() {
        let body: Body = serde_json::from_str(r#"{"price":40,"discount":"2"}"#).unwrap();
        assert_eq!(body.price, 40.0);
        assert_eq!(body.discount, Some(2.0));
    }

    #[test]
    fn test_bad_prices_rejected() {
        assert!(serde_json::from_str::<Body>(r#"{"price":"twelve"}"#).is_err());
        assert!(serde_json::from_str::<Body>(r#"{"price":-1}"#).is_err());
        assert!(parse_price("NaN").is_err());
        assert_eq!(parse_price(" 3 ").unwrap(), 3.0);
    }
}
