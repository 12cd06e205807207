//! # Validation Module
//!
//! Input validation for the reservation form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard form                                               │
//! │  └── Immediate feedback (required fields, date pickers)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: hotelier-core (THIS MODULE)                                  │
//! │  └── Business rule validation before any store call                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (dates, occupancy, amounts)                     │
//! │  ├── UNIQUE constraints (confirmation_number, room_number)             │
//! │  └── Overlap trigger (no double booking)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{BookingError, ValidationError};
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a stay range: check-out must be strictly after check-in.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use hotelier_core::validation::validate_stay_dates;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
/// assert!(validate_stay_dates(d(1), d(5)).is_ok());
/// assert!(validate_stay_dates(d(5), d(5)).is_err());
/// ```
pub fn validate_stay_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), BookingError> {
    if check_out <= check_in {
        return Err(BookingError::InvalidDateRange {
            check_in,
            check_out,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required person name field (`first_name`, `last_name`).
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// ## Rules
/// - Empty / absent is allowed
/// - Otherwise exactly one `@`, a non-empty local part and a dotted domain
///
/// ## Example
/// ```rust
/// use hotelier_core::validation::validate_email;
///
/// assert!(validate_email(None).is_ok());
/// assert!(validate_email(Some("")).is_ok());
/// assert!(validate_email(Some("ana@example.com")).is_ok());
/// assert!(validate_email(Some("not-an-email")).is_err());
/// ```
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let email = match email.map(str::trim) {
        None | Some("") => return Ok(()),
        Some(email) => email,
    };

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates an ISO 4217 currency code ("EUR").
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a 3-letter ISO code such as EUR".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates party size: at least one adult, no negative children.
pub fn validate_occupancy(adults: i64, children: i64) -> ValidationResult<()> {
    if adults < 1 {
        return Err(ValidationError::OutOfRange {
            field: "adults".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    if children < 0 {
        return Err(ValidationError::Negative {
            field: "children".to_string(),
        });
    }

    Ok(())
}

/// Validates a folio amount in cents (`total_amount`, `paid_amount`).
///
/// Zero is allowed (complimentary stays).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a commission rate in basis points (0% to 100%).
pub fn validate_commission_bps(bps: i64) -> ValidationResult<()> {
    if !(0..=10000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "commission_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn test_validate_stay_dates() {
        assert!(validate_stay_dates(d(1), d(2)).is_ok());
        assert!(matches!(
            validate_stay_dates(d(3), d(3)),
            Err(BookingError::InvalidDateRange { .. })
        ));
        assert!(validate_stay_dates(d(5), d(1)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("first_name", "Ayşe").is_ok());
        assert!(validate_name("first_name", "").is_err());
        assert!(validate_name("first_name", "   ").is_err());
        assert_eq!(
            validate_name("last_name", &"x".repeat(MAX_NAME_LENGTH + 1))
                .unwrap_err()
                .field(),
            "last_name"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(Some("guest@hotel.com.tr")).is_ok());
        assert!(validate_email(Some("@hotel.com")).is_err());
        assert!(validate_email(Some("guest@hotel")).is_err());
        assert!(validate_email(Some("guest@@hotel.com")).is_err());
        assert!(validate_email(Some("gu est@hotel.com")).is_err());
    }

    #[test]
    fn test_validate_occupancy() {
        assert!(validate_occupancy(1, 0).is_ok());
        assert!(validate_occupancy(2, 3).is_ok());
        assert!(validate_occupancy(0, 2).is_err());
        assert!(validate_occupancy(2, -1).is_err());
    }

    #[test]
    fn test_validate_amounts_and_commission() {
        assert!(validate_amount_cents("total_amount", 0).is_ok());
        assert!(validate_amount_cents("paid_amount", -1).is_err());
        assert!(validate_commission_bps(0).is_ok());
        assert!(validate_commission_bps(10000).is_ok());
        assert!(validate_commission_bps(10001).is_err());
        assert!(validate_commission_bps(-1).is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("EUR").is_ok());
        assert!(validate_currency_code("eur").is_err());
        assert!(validate_currency_code("EURO").is_err());
    }
}
