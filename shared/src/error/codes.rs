//! Unified error codes for the catalog sync service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Bulk request errors
//! - 3xxx: Reference lookup errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Credentials were not supplied
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,

    // ==================== 2xxx: Bulk ====================
    /// The record array is empty
    NoRecordsProvided = 2001,
    /// The body does not carry the expected record array
    MissingRecordArray = 2002,
    /// `batchSize` is not a positive integer
    InvalidBatchSize = 2003,
    /// Every record of the call failed
    AllRecordsFailed = 2004,
    /// A record repeats a natural key seen earlier in the same call
    DuplicateInBatch = 2005,
    /// A record lacks one or more required fields
    MissingRequiredFields = 2006,
    /// A record carries fields with invalid type or range
    InvalidFields = 2007,

    // ==================== 3xxx: Reference ====================
    /// Business unit (city) not found
    CityNotFound = 3001,
    /// Catalog not found
    CatalogNotFound = 3002,
    /// Product not found
    ProductNotFound = 3003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Credentials are required",
            ErrorCode::InvalidCredentials => "Invalid credentials",

            // Bulk
            ErrorCode::NoRecordsProvided => "No records provided",
            ErrorCode::MissingRecordArray => "Request body does not contain the record array",
            ErrorCode::InvalidBatchSize => "batchSize must be a positive integer",
            ErrorCode::AllRecordsFailed => "All records failed",
            ErrorCode::DuplicateInBatch => "Duplicate record in batch",
            ErrorCode::MissingRequiredFields => "Missing required field(s)",
            ErrorCode::InvalidFields => "Invalid fields",

            // Reference
            ErrorCode::CityNotFound => "Business unit not found",
            ErrorCode::CatalogNotFound => "Catalog not found",
            ErrorCode::ProductNotFound => "Product not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown numeric value to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),

            // Bulk
            2001 => Ok(ErrorCode::NoRecordsProvided),
            2002 => Ok(ErrorCode::MissingRecordArray),
            2003 => Ok(ErrorCode::InvalidBatchSize),
            2004 => Ok(ErrorCode::AllRecordsFailed),
            2005 => Ok(ErrorCode::DuplicateInBatch),
            2006 => Ok(ErrorCode::MissingRequiredFields),
            2007 => Ok(ErrorCode::InvalidFields),

            // Reference
            3001 => Ok(ErrorCode::CityNotFound),
            3002 => Ok(ErrorCode::CatalogNotFound),
            3003 => Ok(ErrorCode::ProductNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
