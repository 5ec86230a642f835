//! # Error Types
//!
//! Domain-specific error types for shop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shop-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  shop-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (referral code, order id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Eligibility *denial* is not an error; it only becomes one when a
//!    caller insists on writing anyway (see [`CoreError::PurchaseDenied`])

use thiserror::Error;

use crate::eligibility::Denial;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Flash sale cannot be found.
    #[error("Flash sale not found: {0}")]
    FlashSaleNotFound(i64),

    /// Flash sale product cannot be found.
    #[error("Flash sale product not found: {0}")]
    FlashSaleProductNotFound(i64),

    /// Collaborator cannot be found by referral code or slug.
    #[error("CTV not found: {0}")]
    CtvNotFound(String),

    /// A purchase write was attempted while eligibility was denied.
    ///
    /// ## When This Occurs
    /// The recorder re-checks eligibility right before writing; a concurrent
    /// purchase may have consumed the last unit between the caller's
    /// pre-check and the write.
    #[error("Purchase denied: {0}")]
    PurchaseDenied(Denial),

    /// Flash sale is in a state that forbids the requested operation.
    ///
    /// ## When This Occurs
    /// - Editing an ended or cancelled sale
    /// - Deleting an active sale
    #[error("Flash sale {id} is {status}, cannot perform operation")]
    InvalidFlashSaleStatus { id: i64, status: String },

    /// Phone verification for a slug change failed.
    #[error("Phone verification failed for {referral_code}")]
    PhoneMismatch { referral_code: String },

    /// Slug change rate limit reached (3 changes per rolling year).
    #[error("Slug change limit reached for {referral_code}; retry after the window ages out")]
    SlugChangeLimit { referral_code: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad slug characters, bad month string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value collides with a reserved word.
    #[error("{field} '{value}' is reserved")]
    Reserved { field: String, value: String },

    /// Duplicate value (e.g., duplicate slug or referral code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
