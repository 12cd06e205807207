//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (hotelier-core) ← What the booking flow reasons about    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookingError → UserError ← Serialized for the dashboard               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use hotelier_core::{StorageError, StorageErrorKind};
use thiserror::Error;

/// Message raised by the `reservations_no_overlap_*` triggers.
pub const OVERLAP_MESSAGE: &str = "reservation overlap";

/// Message raised by the `reservations_guest_same_hotel_*` triggers.
pub const GUEST_HOTEL_MESSAGE: &str = "guest belongs to another hotel";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate confirmation number
    /// - Duplicate room number within a hotel
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// The overlap trigger rejected a reservation write.
    #[error("Reservation overlaps an active reservation of the same room")]
    OverlapViolation,

    /// Foreign key constraint violation, or a guest from another hotel.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (dates, occupancy, amounts).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored value could not be decoded (e.g. a malformed decimal).
    #[error("Invalid {field} in database: '{value}'")]
    InvalidData { field: String, value: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_data(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::InvalidData {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>[, <table>.<column>]"
                // FK:     "FOREIGN KEY constraint failed"
                // CHECK:  "CHECK constraint failed: <expr>"
                // RAISE:  the trigger's message verbatim
                if msg.contains(OVERLAP_MESSAGE) {
                    DbError::OverlapViolation
                } else if msg.contains(GUEST_HOTEL_MESSAGE) {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::ConstraintViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// What the booking flow needs to know about a database failure.
impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        let message = err.to_string();
        let kind = match err {
            DbError::UniqueViolation { field, .. } => StorageErrorKind::UniqueViolation { field },
            DbError::OverlapViolation => StorageErrorKind::OverlapViolation,
            DbError::NotFound { .. } => StorageErrorKind::NotFound,
            DbError::PoolExhausted | DbError::ConnectionFailed(_) => StorageErrorKind::Unavailable,
            _ => StorageErrorKind::Other,
        };
        StorageError::new(kind, message)
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
