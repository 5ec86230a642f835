//! # Flash-Sale Purchase Eligibility
//!
//! Pure decision logic for whether a customer may buy a flash-sale product.
//! The database layer loads the state; this module only decides.
//!
//! ## Check Order (short-circuits on first failure)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_purchase(sale, product, prior_quantity, requested, now)          │
//! │                                                                         │
//! │  1. product.is_active?          ── no ──► ProductUnavailable            │
//! │  2. sale running at `now`?      ── no ──► SaleNotRunning                │
//! │     (status == active AND start <= now < end; window is authoritative)  │
//! │  3. stock_limit set?                                                    │
//! │     remaining < requested       ── yes ─► OutOfStock { remaining }      │
//! │  4. max_per_customer set?                                               │
//! │     prior + requested > max     ── yes ─► CustomerLimit { can_still_buy}│
//! │  5. Allowed                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checker runs twice in the full flow: once as a UI-facing pre-check
//! and again inside the purchase recorder right before the write. The
//! recorder additionally relies on an atomic conditional `sold_count`
//! update so that two near-simultaneous purchases can never oversell
//! (see shop-db's purchase repository).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{FlashSale, FlashSaleProduct};

// =============================================================================
// Denial
// =============================================================================

/// Why a purchase was refused. A denial is a normal outcome, not an error;
/// callers branch on it and surface `reason` text to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Denial {
    /// Product does not exist or is switched off.
    ProductUnavailable,
    /// Sale is outside its window or not in active status.
    SaleNotRunning,
    /// Stock limit would be exceeded. `remaining` is clamped to ≥ 0 even if
    /// the counter is inconsistent (oversold data never reports negative).
    OutOfStock { remaining: i64 },
    /// Per-customer cap would be exceeded.
    CustomerLimit {
        max_per_customer: i64,
        already_purchased: i64,
        /// Units this customer may still buy, clamped to ≥ 0.
        can_still_buy: i64,
    },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::ProductUnavailable => write!(f, "product inactive or not found"),
            Denial::SaleNotRunning => write!(f, "flash sale not active"),
            Denial::OutOfStock { remaining } => {
                if *remaining > 0 {
                    write!(f, "only {} left in stock", remaining)
                } else {
                    write!(f, "sold out")
                }
            }
            Denial::CustomerLimit {
                max_per_customer,
                can_still_buy,
                ..
            } => write!(
                f,
                "limited to {} per customer ({} more allowed)",
                max_per_customer, can_still_buy
            ),
        }
    }
}

// =============================================================================
// Checker
// =============================================================================

/// Decides whether `requested_quantity` units may be bought.
///
/// ## Arguments
/// * `sale` - Parent flash sale (time window + status)
/// * `product` - Flash-sale product row (caps + counter)
/// * `prior_quantity` - Units this customer already bought of this product
/// * `requested_quantity` - Units being requested now
/// * `now` - Current unix time
///
/// ## Properties
/// - Deterministic: same inputs, same answer
/// - Monotonic in `requested_quantity`: raising the quantity never turns a
///   denial into an approval
pub fn check_purchase(
    sale: &FlashSale,
    product: &FlashSaleProduct,
    prior_quantity: i64,
    requested_quantity: i64,
    now: i64,
) -> Result<(), Denial> {
    if !product.is_active {
        return Err(Denial::ProductUnavailable);
    }

    if !sale.is_running(now) {
        return Err(Denial::SaleNotRunning);
    }

    if let Some(limit) = product.stock_limit {
        let remaining = limit - product.sold_count;
        if remaining < requested_quantity {
            return Err(Denial::OutOfStock {
                remaining: remaining.max(0),
            });
        }
    }

    if let Some(max) = product.max_per_customer {
        if prior_quantity + requested_quantity > max {
            return Err(Denial::CustomerLimit {
                max_per_customer: max,
                already_purchased: prior_quantity,
                can_still_buy: (max - prior_quantity).max(0),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
