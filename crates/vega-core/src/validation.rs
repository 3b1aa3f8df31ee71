//! Input validation helpers shared by the scan router and the surfaces.
//!
//! These run before any parsing or lookup, so garbage from a misfiring
//! scanner never reaches the database layer.

use crate::error::ValidationError;
use crate::MAX_PAYLOAD_LEN;

/// Validates a scan payload before routing.
///
/// Trims surrounding whitespace and rejects empty or oversized input.
/// Returns the trimmed payload on success.
pub fn validate_payload(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "payload".to_string(),
        });
    }
    if trimmed.len() > MAX_PAYLOAD_LEN {
        return Err(ValidationError::TooLong {
            field: "payload".to_string(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(trimmed)
}

/// Validates a monetary amount entered by the cashier.
pub fn validate_amount(field: &str, cents: i64) -> Result<i64, ValidationError> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(cents)
}

/// Validates a required free-text field (customer name, cashier id).
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}
