//! Input validation utilities.

use validator::Validate;

use crate::error::HearthError;

/// Validate a request body, returning a HearthError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), HearthError> {
    body.validate().map_err(|e| HearthError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// Reject names that are empty or whitespace only.
pub fn validate_name(name: &str) -> Result<(), HearthError> {
    if name.trim().is_empty() {
        return Err(HearthError::Validation {
            message: "Name cannot be empty or whitespace only".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
        name: String,
    }

    #[test]
    fn test_validate_request_reports_message() {
        let err = validate_request(&Body { name: "a".into() }).unwrap_err();
        assert!(matches!(
            err,
            HearthError::Validation { ref message } if message == "Name must be at least 2 characters"
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Maple Court").is_ok());
    }
}
