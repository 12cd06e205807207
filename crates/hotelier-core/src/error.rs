//! # Error Types
//!
//! Domain-specific error types for hotelier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hotelier-core errors (this file)                                      │
//! │  ├── BookingError     - Reservation flow failures                      │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StorageError     - Opaque wrapper for store failures              │
//! │                                                                         │
//! │  hotelier-db errors (separate crate)                                   │
//! │  └── DbError          - sqlx failures, converted into StorageError     │
//! │                                                                         │
//! │  UserError            - What the dashboard shows (serialized)          │
//! │                                                                         │
//! │  Flow: DbError → StorageError → BookingError → UserError → View        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing FX rate is deliberately absent from this file: conversion falls
//! back to 1:1 and the analytics result records it as
//! [`crate::fx::RateStatus::Unavailable`].

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::types::ReservationStatus;

// =============================================================================
// Storage Error
// =============================================================================

/// Category of a storage failure, as far as the core needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// A UNIQUE constraint rejected the write.
    UniqueViolation { field: String },
    /// The store's overlap guard rejected a reservation write.
    OverlapViolation,
    /// The addressed row does not exist.
    NotFound,
    /// The store could not be reached (pool exhausted, connection lost).
    Unavailable,
    /// Anything else.
    Other,
}

/// Opaque wrapper for lower-layer failures.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        StorageError {
            kind,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        StorageError::new(StorageErrorKind::Other, message)
    }

    pub fn unique(field: impl Into<String>) -> Self {
        let field = field.into();
        StorageError::new(
            StorageErrorKind::UniqueViolation {
                field: field.clone(),
            },
            format!("duplicate value for {}", field),
        )
    }

    pub fn overlap() -> Self {
        StorageError::new(StorageErrorKind::OverlapViolation, "reservation overlap")
    }

    /// Whether a UNIQUE violation on a column whose name contains `column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(&self.kind, StorageErrorKind::UniqueViolation { field } if field.contains(column))
    }

    pub fn is_overlap(&self) -> bool {
        self.kind == StorageErrorKind::OverlapViolation
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StorageError>;

// =============================================================================
// Booking Error
// =============================================================================

/// Failures of the reservation flow.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Check-out is not strictly after check-in.
    ///
    /// Rejected before any write happens.
    #[error("Check-out date {check_out} must be after check-in date {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// The room already has an active reservation overlapping the stay.
    ///
    /// ## When This Occurs
    /// - The advisory availability check found a conflict
    /// - The store's overlap guard rejected the insert (concurrent booking)
    #[error("Room {room_id} is not available from {check_in} to {check_out}")]
    RoomUnavailable {
        room_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// Room does not exist in this hotel.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Room type does not exist in this hotel.
    #[error("Room type not found: {0}")]
    RoomTypeNotFound(String),

    /// The requested room type is not the type of the chosen room.
    #[error("Room {room_id} is not of room type {room_type_id}")]
    RoomTypeMismatch {
        room_id: String,
        room_type_id: String,
    },

    /// Reservation does not exist in this hotel.
    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    /// The requested status change is not allowed by the state machine.
    #[error("Reservation {reservation_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        reservation_id: String,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// Every generated confirmation number collided.
    #[error("Could not generate a unique confirmation number after {attempts} attempts")]
    ConfirmationCodeExhausted { attempts: u32 },

    /// The guest record could not be written. Nothing was persisted.
    #[error("Guest creation failed: {0}")]
    GuestCreationFailed(#[source] StorageError),

    /// The reservation could not be written after its guest was created.
    ///
    /// `guest_rolled_back` tells the caller whether the compensating delete
    /// of `guest_id` succeeded; when false the guest exists standalone.
    #[error("Reservation insert failed (guest {guest_id}, rolled back: {guest_rolled_back}): {source}")]
    ReservationInsertFailed {
        guest_id: String,
        guest_rolled_back: bool,
        #[source]
        source: StorageError,
    },

    /// Storage failure outside the guest/reservation writes.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// Used for early validation before any store call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, invalid month).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// The form field the error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// User-Facing Error
// =============================================================================

/// Error codes the dashboard switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RoomUnavailable,
    NotFound,
    BusinessRule,
    StorageError,
}

/// What a view receives when a booking operation fails.
///
/// ```json
/// {
///   "code": "ROOM_UNAVAILABLE",
///   "field": "check_in_date",
///   "message": "Room 101 is already booked for part of these dates.",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserError {
    pub code: ErrorCode,
    /// Form field to highlight, when the error is tied to one.
    pub field: Option<String>,
    pub message: String,
    pub retryable: bool,
}

impl UserError {
    fn new(code: ErrorCode, field: Option<&str>, message: impl Into<String>) -> Self {
        UserError {
            code,
            field: field.map(str::to_string),
            message: message.into(),
            retryable: false,
        }
    }

    fn storage() -> Self {
        UserError {
            code: ErrorCode::StorageError,
            field: None,
            message: "Could not reach the reservation system. Please try again in a moment."
                .to_string(),
            retryable: true,
        }
    }
}

impl From<&BookingError> for UserError {
    fn from(err: &BookingError) -> Self {
        match err {
            BookingError::InvalidDateRange { .. } => UserError::new(
                ErrorCode::ValidationError,
                Some("check_out_date"),
                "Check-out date must be after check-in date.",
            ),
            BookingError::RoomUnavailable { .. } => UserError::new(
                ErrorCode::RoomUnavailable,
                Some("check_in_date"),
                "The room is already booked for part of these dates. Choose other dates or another room.",
            ),
            BookingError::RoomNotFound(_) => {
                UserError::new(ErrorCode::NotFound, Some("room_id"), "The selected room no longer exists.")
            }
            BookingError::RoomTypeNotFound(_) => UserError::new(
                ErrorCode::NotFound,
                Some("room_type_id"),
                "The selected room type no longer exists.",
            ),
            BookingError::RoomTypeMismatch { .. } => UserError::new(
                ErrorCode::ValidationError,
                Some("room_type_id"),
                "The selected room is not of the selected room type.",
            ),
            BookingError::ReservationNotFound(_) => {
                UserError::new(ErrorCode::NotFound, None, "The reservation no longer exists.")
            }
            BookingError::InvalidStatusTransition { from, to, .. } => UserError::new(
                ErrorCode::BusinessRule,
                Some("status"),
                format!("A {} reservation cannot be marked {}.", from, to),
            ),
            BookingError::Validation(e) => {
                UserError::new(ErrorCode::ValidationError, Some(e.field()), e.to_string())
            }
            BookingError::ConfirmationCodeExhausted { .. }
            | BookingError::GuestCreationFailed(_)
            | BookingError::ReservationInsertFailed { .. }
            | BookingError::Storage(_) => {
                tracing::error!(error = %err, "Booking failed in storage");
                UserError::storage()
            }
        }
    }
}

impl From<BookingError> for UserError {
    fn from(err: BookingError) -> Self {
        UserError::from(&err)
    }
}

/// Convenience type alias for Results with BookingError.
pub type BookingResult<T> = Result<T, BookingError>;

// =============================================================================
// Unit Tests
// =============================================================================
