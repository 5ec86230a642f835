//! # shop-core: Pure Business Logic for the Shop Back Office
//!
//! This crate is the **heart** of the back office. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Back-Office Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        Callers                                  │   │
//! │  │   storefront checkout ──► admin panel ──► settlement jobs      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shop-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │eligibility │  │   slug   │  │   │
//! │  │   │ FlashSale │  │   Money   │  │   Denial   │  │  rules   │  │   │
//! │  │   │   Order   │  │Commission │  │  checker   │  │  limits  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shop-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (FlashSale, Ctv, Order, etc.)
//! - [`money`] - Money and commission math in integer đồng (no floating point!)
//! - [`eligibility`] - Flash-sale purchase eligibility checker
//! - [`slug`] - Custom referral slug rules and rate limiting
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in whole đồng (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Denial ≠ Error**: a refused purchase is a normal answer, returned as data
//!
//! ## Example Usage
//!
//! ```rust
//! use shop_core::money::{calculate_commission, CommissionRate, Money};
//!
//! // 500.000₫ order, 30.000₫ shipping, 10% referral rate
//! let commission = calculate_commission(
//!     Money::from_dong(500_000),
//!     Money::from_dong(30_000),
//!     CommissionRate::from_fraction(0.1),
//! );
//! assert_eq!(commission.dong(), 47_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod eligibility;
pub mod error;
pub mod money;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shop_core::Money` instead of
// `use shop_core::money::Money`

pub use eligibility::{check_purchase, Denial};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{calculate_commission, CommissionRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default commission rate for newly registered collaborators (10%).
///
/// ## Why a constant?
/// Registration without an explicit rate falls back to this; admins adjust
/// per-collaborator rates afterwards.
pub const DEFAULT_COMMISSION_FRACTION: f64 = 0.1;

/// Maximum units a single purchase may request.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_PURCHASE_QUANTITY: i64 = 999;
