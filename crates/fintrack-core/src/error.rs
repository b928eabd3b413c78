use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinTrackError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Out of range: {field} = {value}, expected {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("{kind} not found with id: {id}")]
    NotFound { kind: String, id: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {kind} {id} is at version {found}, update was based on version {expected}")]
    Conflict {
        kind: String,
        id: u64,
        expected: u64,
        found: u64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl FinTrackError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinTrackError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        FinTrackError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for FinTrackError {
    fn from(e: serde_json::Error) -> Self {
        FinTrackError::SerializationError(e.to_string())
    }
}

/// Reject values that are zero or negative.
pub(crate) fn ensure_positive(field: &str, value: Decimal) -> Result<(), FinTrackError> {
    if value <= Decimal::ZERO {
        return Err(FinTrackError::invalid(field, format!("{field} must be > 0")));
    }
    Ok(())
}

/// Reject negative values; zero is allowed.
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), FinTrackError> {
    if value < Decimal::ZERO {
        return Err(FinTrackError::invalid(field, format!("{field} must be >= 0")));
    }
    Ok(())
}

/// Reject zero-length durations.
pub(crate) fn ensure_nonzero_periods(field: &str, value: u32) -> Result<(), FinTrackError> {
    if value == 0 {
        return Err(FinTrackError::invalid(field, format!("{field} must be > 0")));
    }
    Ok(())
}

/// Range check for per-period queries; `value` must lie in `min..=max`.
pub(crate) fn ensure_in_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), FinTrackError> {
    if value < min || value > max {
        return Err(FinTrackError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ensure_positive_rejects_zero() {
        let err = ensure_positive("principal", Decimal::ZERO).unwrap_err();
        assert!(matches!(err, FinTrackError::InvalidInput { ref field, .. } if field == "principal"));
    }

    #[test]
    fn test_ensure_non_negative_accepts_zero() {
        assert!(ensure_non_negative("annual_rate_pct", Decimal::ZERO).is_ok());
        assert!(ensure_non_negative("annual_rate_pct", dec!(-0.01)).is_err());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = ensure_in_range("target_year", 0, 1, 3).unwrap_err();
        assert_eq!(err.to_string(), "Out of range: target_year = 0, expected 1..=3");
    }
}
