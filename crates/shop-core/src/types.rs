//! # Domain Types
//!
//! Core domain types used throughout the shop back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐      │
//! │  │   FlashSale     │   │ FlashSaleProduct │   │FlashSalePurchase │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ──────────────  │      │
//! │  │  id (rowid)     │◄──│  flash_sale_id   │◄──│  product/order   │      │
//! │  │  start/end time │   │  flash_price     │   │  customer_phone  │      │
//! │  │  status         │   │  stock_limit     │   │  quantity        │      │
//! │  └─────────────────┘   │  sold_count      │   └──────────────────┘      │
//! │                        └──────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌───────────────────┐      │
//! │  │      Ctv        │   │      Order      │   │ CommissionPayment │      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ───────────────  │      │
//! │  │  referral_code  │◄──│  referral_code  │   │  referral_code    │      │
//! │  │  custom_slug    │   │  commission (*) │   │  month (YYYY-MM)  │      │
//! │  │  commission_rate│   │  (captured at   │   │  status           │      │
//! │  └─────────────────┘   │   order time)   │   └───────────────────┘      │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Flash-sale entities and collaborators use SQLite rowids (`i64`); the
//! collaborator additionally carries two interchangeable business keys:
//! the uppercase `referral_code` and the optional lowercase `custom_slug`.
//! Orders use UUID v4 strings.
//!
//! All timestamps are unix seconds; all amounts are whole đồng.

use serde::{Deserialize, Serialize};

use crate::money::{CommissionRate, Money};

// =============================================================================
// Flash Sale Status
// =============================================================================

/// Lifecycle status of a flash sale.
///
/// The stored status is advisory: the time window is authoritative for
/// purchase eligibility (see [`FlashSale::is_running`]). Status rows are
/// reconciled with the clock at query time, not by a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum FlashSaleStatus {
    /// Being set up by an admin, not yet published.
    Draft,
    /// Published, waiting for the start time.
    Scheduled,
    /// Inside the sale window.
    Active,
    /// Past the end time.
    Ended,
    /// Manually cancelled by an admin.
    Cancelled,
}

impl Default for FlashSaleStatus {
    fn default() -> Self {
        FlashSaleStatus::Draft
    }
}

impl FlashSaleStatus {
    /// String form matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashSaleStatus::Draft => "draft",
            FlashSaleStatus::Scheduled => "scheduled",
            FlashSaleStatus::Active => "active",
            FlashSaleStatus::Ended => "ended",
            FlashSaleStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Flash Sale
// =============================================================================

/// A time-boxed promotional pricing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FlashSale {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Window start, unix seconds (inclusive).
    pub start_time: i64,
    /// Window end, unix seconds (exclusive).
    pub end_time: i64,
    pub status: FlashSaleStatus,
    /// Shown on the storefront when true.
    pub is_visible: bool,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

impl FlashSale {
    /// Whether purchases are currently admitted.
    ///
    /// The stored status must say `active` AND the clock must be inside the
    /// window: `start_time <= now < end_time`. A stale status flag never
    /// admits a purchase outside the window.
    pub fn is_running(&self, now: i64) -> bool {
        self.status == FlashSaleStatus::Active && self.start_time <= now && now < self.end_time
    }

    /// Status the sale should hold at `now`, given the window.
    ///
    /// Draft and cancelled sales are not time-driven and keep their status.
    pub fn derived_status(&self, now: i64) -> FlashSaleStatus {
        match self.status {
            FlashSaleStatus::Draft | FlashSaleStatus::Cancelled => self.status,
            _ => derive_window_status(self.start_time, self.end_time, now),
        }
    }
}

/// Maps a time window onto scheduled/active/ended at `now`.
pub fn derive_window_status(start_time: i64, end_time: i64, now: i64) -> FlashSaleStatus {
    if end_time <= now {
        FlashSaleStatus::Ended
    } else if start_time <= now {
        FlashSaleStatus::Active
    } else {
        FlashSaleStatus::Scheduled
    }
}

// =============================================================================
// Flash Sale Product
// =============================================================================

/// A product enrolled in a flash sale with promotional pricing and caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FlashSaleProduct {
    pub id: i64,
    pub flash_sale_id: i64,
    pub product_id: i64,
    pub original_price: i64,
    pub flash_price: i64,
    /// Percentage off the original price, precomputed for display.
    pub discount_percentage: i64,
    /// Total units sellable in this sale. None = unlimited.
    pub stock_limit: Option<i64>,
    /// Denormalized running total of units sold. Maintained by the purchase
    /// recorder with an atomic conditional update; never exceeds
    /// `stock_limit` when one is set.
    pub sold_count: i64,
    /// Per-customer quantity cap. None = unlimited.
    pub max_per_customer: Option<i64>,
    pub is_active: bool,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

impl FlashSaleProduct {
    /// Returns the flash price as Money.
    #[inline]
    pub fn flash_price(&self) -> Money {
        Money::from_dong(self.flash_price)
    }

    /// Units still sellable, clamped to ≥ 0. None = unlimited.
    pub fn remaining(&self) -> Option<i64> {
        self.stock_limit.map(|limit| (limit - self.sold_count).max(0))
    }
}

/// Computes the display discount percentage for a flash price.
///
/// `round((original - flash) / original * 100)`; a non-positive original
/// price yields 0 rather than dividing by zero.
pub fn discount_percentage(original_price: i64, flash_price: i64) -> i64 {
    if original_price <= 0 {
        return 0;
    }
    let off = (original_price - flash_price).max(0);
    (off * 100 + original_price / 2) / original_price
}

// =============================================================================
// Flash Sale Purchase
// =============================================================================

/// One purchase event: an order buying one flash-sale product.
///
/// Created exactly once per order/product/customer purchase; hard-deleted
/// when the order is cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FlashSalePurchase {
    pub id: i64,
    pub flash_sale_id: i64,
    pub flash_sale_product_id: i64,
    pub order_id: String,
    pub customer_phone: String,
    pub customer_name: String,
    pub quantity: i64,
    /// Price per unit at purchase time (frozen).
    pub flash_price: i64,
    /// quantity × flash_price, frozen at purchase time.
    pub total_amount: i64,
    pub purchased_at_unix: i64,
}

// =============================================================================
// Collaborator (CTV)
// =============================================================================

/// Collaborator account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CtvStatus {
    Active,
    Inactive,
}

/// A collaborator (CTV) earning commission on referred orders.
///
/// Referral identity is resolved by either `referral_code` (uppercase) or
/// `custom_slug` (lowercase, human-chosen alias).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ctv {
    pub id: i64,
    pub referral_code: String,
    pub full_name: String,
    pub phone: String,
    /// Fraction 0..1 as persisted; convert with [`Ctv::commission_rate`].
    pub commission_rate: f64,
    pub status: CtvStatus,
    pub custom_slug: Option<String>,
    /// Slug changes made inside the current rate-limit window.
    pub slug_change_count: i64,
    /// Unix seconds of the most recent slug change.
    pub slug_updated_at_unix: Option<i64>,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

impl Ctv {
    /// Returns the commission rate as a typed rate.
    #[inline]
    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_fraction(self.commission_rate)
    }
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipping,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// A customer order, optionally attributed to a collaborator.
///
/// ## Snapshot Pattern
/// `commission_rate` and `commission` are captured when the order is created
/// and never recomputed, so history stays correct when a CTV's rate changes
/// later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// UUID v4.
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: Option<String>,
    pub total_amount: i64,
    pub shipping_fee: i64,
    pub referral_code: Option<String>,
    /// Rate at order time (frozen), fraction 0..1.
    pub commission_rate: Option<f64>,
    /// Commission at order time (frozen), whole đồng.
    pub commission: i64,
    pub status: OrderStatus,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_dong(self.total_amount)
    }

    /// Returns the captured commission as Money.
    #[inline]
    pub fn commission(&self) -> Money {
        Money::from_dong(self.commission)
    }
}

// =============================================================================
// Commission Payment
// =============================================================================

/// Settlement status of a monthly commission payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One month of settled commission for one collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CommissionPayment {
    pub id: i64,
    pub referral_code: String,
    /// Settlement month, `YYYY-MM`.
    pub month: String,
    pub commission_amount: i64,
    pub order_count: i64,
    pub status: PaymentStatus,
    pub created_at_unix: i64,
    pub updated_at_unix: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
