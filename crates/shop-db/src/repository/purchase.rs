//! # Purchase Repository
//!
//! Flash-sale purchase recording, cancellation, and history queries.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Purchase Recording                                   │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Load product + parent sale + prior quantity for this phone            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shop_core::check_purchase()  ── denied ──► ROLLBACK, return Denied    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT flash_sale_purchases row                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE flash_sale_products                                             │
//! │     SET sold_count = sold_count + qty                                  │
//! │   WHERE id = ? AND (stock_limit IS NULL                                │
//! │                     OR sold_count + qty <= stock_limit)                │
//! │       │                                                                 │
//! │       ├── 0 rows ──► ROLLBACK, return Denied(OutOfStock)               │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The conditional UPDATE is the oversell guard: two concurrent          │
//! │  recordings both pass the pre-check, but only one can satisfy          │
//! │  sold_count + qty <= stock_limit. The loser rolls back cleanly.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shop_core::eligibility::{check_purchase, Denial};
use shop_core::types::{FlashSale, FlashSalePurchase, FlashSaleProduct};
use shop_core::validation::{validate_name, validate_order_id, validate_phone, validate_quantity};
use shop_core::Money;

// =============================================================================
// Input and Output Types
// =============================================================================

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub flash_sale_product_id: i64,
    /// The order this purchase belongs to (UUID).
    pub order_id: String,
    pub customer_phone: String,
    pub customer_name: String,
    pub quantity: i64,
}

/// Answer to an eligibility pre-check.
///
/// Denial is a normal outcome here, never a `DbError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PurchaseEligibility {
    /// The purchase would be accepted right now.
    Allowed {
        /// Unit price the customer would pay.
        flash_price: Money,
        /// Units still sellable after this purchase. None = unlimited.
        remaining_after: Option<i64>,
    },
    /// The purchase would be refused, with the reason.
    Denied { denial: Denial },
}

/// Outcome of a recording attempt.
#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    /// Committed; carries the stored row.
    Recorded(FlashSalePurchase),
    /// Refused; nothing was written.
    Denied(Denial),
}

/// Aggregate statistics for one flash sale.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleStats {
    pub unique_customers: i64,
    pub order_count: i64,
    pub total_quantity: i64,
    pub total_revenue: i64,
    pub first_purchase_unix: Option<i64>,
    pub last_purchase_unix: Option<i64>,
}

/// One customer's totals inside a flash sale.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerTotal {
    pub customer_phone: String,
    pub customer_name: String,
    pub total_quantity: i64,
    pub total_spent: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for flash-sale purchase operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// UI-facing eligibility pre-check.
    ///
    /// Loads the product, its parent sale, and the customer's prior quantity,
    /// then runs the pure checker. The answer is advisory: the recorder
    /// re-checks inside its transaction, so a stale pre-check can never
    /// oversell.
    pub async fn check_eligibility(
        &self,
        flash_sale_product_id: i64,
        customer_phone: &str,
        quantity: i64,
        now: i64,
    ) -> DbResult<PurchaseEligibility> {
        validate_quantity(quantity)?;
        validate_phone(customer_phone)?;

        let Some(product) = self.load_product(flash_sale_product_id).await? else {
            return Ok(PurchaseEligibility::Denied {
                denial: Denial::ProductUnavailable,
            });
        };
        let sale = self.load_parent_sale(&product).await?;
        let prior = self
            .prior_quantity(flash_sale_product_id, customer_phone)
            .await?;

        Ok(match check_purchase(&sale, &product, prior, quantity, now) {
            Ok(()) => PurchaseEligibility::Allowed {
                flash_price: product.flash_price(),
                remaining_after: product.remaining().map(|r| (r - quantity).max(0)),
            },
            Err(denial) => PurchaseEligibility::Denied { denial },
        })
    }

    /// Records a purchase, or refuses it.
    ///
    /// Runs in one transaction: eligibility re-check, purchase INSERT, then
    /// an atomic conditional `sold_count` bump that doubles as the oversell
    /// guard. Zero rows affected means a concurrent purchase consumed the
    /// stock first; the transaction rolls back and the caller gets a denial,
    /// not an error.
    pub async fn record(&self, input: NewPurchase, now: i64) -> DbResult<PurchaseOutcome> {
        validate_order_id(&input.order_id)?;
        validate_quantity(input.quantity)?;
        validate_phone(&input.customer_phone)?;
        validate_name("customer_name", &input.customer_name)?;

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, FlashSaleProduct>(
            "SELECT * FROM flash_sale_products WHERE id = ?1",
        )
        .bind(input.flash_sale_product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product) = product else {
            tx.rollback().await?;
            return Ok(PurchaseOutcome::Denied(Denial::ProductUnavailable));
        };

        let sale = sqlx::query_as::<_, FlashSale>("SELECT * FROM flash_sales WHERE id = ?1")
            .bind(product.flash_sale_id)
            .fetch_one(&mut *tx)
            .await?;

        let prior: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM flash_sale_purchases
            WHERE flash_sale_product_id = ?1 AND customer_phone = ?2
            "#,
        )
        .bind(input.flash_sale_product_id)
        .bind(&input.customer_phone)
        .fetch_one(&mut *tx)
        .await?;

        if let Err(denial) = check_purchase(&sale, &product, prior, input.quantity, now) {
            tx.rollback().await?;
            debug!(
                product_id = input.flash_sale_product_id,
                order_id = %input.order_id,
                %denial,
                "Purchase refused"
            );
            return Ok(PurchaseOutcome::Denied(denial));
        }

        let total_amount = product.flash_price().multiply_quantity(input.quantity);

        let purchase = sqlx::query_as::<_, FlashSalePurchase>(
            r#"
            INSERT INTO flash_sale_purchases (
                flash_sale_id, flash_sale_product_id, order_id,
                customer_phone, customer_name, quantity,
                flash_price, total_amount, purchased_at_unix
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING *
            "#,
        )
        .bind(product.flash_sale_id)
        .bind(input.flash_sale_product_id)
        .bind(&input.order_id)
        .bind(&input.customer_phone)
        .bind(&input.customer_name)
        .bind(input.quantity)
        .bind(product.flash_price)
        .bind(total_amount.dong())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // The oversell guard. The condition re-evaluates against the current
        // counter, so a concurrent commit between our re-check and this
        // statement makes it affect zero rows.
        let updated = sqlx::query(
            r#"
            UPDATE flash_sale_products
            SET sold_count = sold_count + ?2, updated_at_unix = ?3
            WHERE id = ?1
              AND (stock_limit IS NULL OR sold_count + ?2 <= stock_limit)
            "#,
        )
        .bind(input.flash_sale_product_id)
        .bind(input.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            // The snapshot loaded at the top of the transaction is stale by
            // definition here, so report the committed counter instead.
            let remaining = self
                .load_product(input.flash_sale_product_id)
                .await?
                .and_then(|p| p.remaining())
                .unwrap_or(0);
            return Ok(PurchaseOutcome::Denied(Denial::OutOfStock { remaining }));
        }

        tx.commit().await?;

        debug!(
            purchase_id = purchase.id,
            order_id = %purchase.order_id,
            quantity = purchase.quantity,
            "Purchase recorded"
        );

        Ok(PurchaseOutcome::Recorded(purchase))
    }

    /// Cancels every purchase recorded for an order.
    ///
    /// Returns stock by decrementing each product's `sold_count`, clamped at
    /// zero so inconsistent counters cannot go negative, then hard-deletes
    /// the purchase rows. An order with no recorded purchases is a distinct
    /// `NotFound`.
    pub async fn cancel(&self, order_id: &str, now: i64) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let purchases = sqlx::query_as::<_, FlashSalePurchase>(
            "SELECT * FROM flash_sale_purchases WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if purchases.is_empty() {
            tx.rollback().await?;
            return Err(DbError::not_found("Flash sale purchase", order_id));
        }

        for purchase in &purchases {
            sqlx::query(
                r#"
                UPDATE flash_sale_products
                SET sold_count = MAX(0, sold_count - ?2), updated_at_unix = ?3
                WHERE id = ?1
                "#,
            )
            .bind(purchase.flash_sale_product_id)
            .bind(purchase.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let deleted = sqlx::query("DELETE FROM flash_sale_purchases WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(order_id, deleted, "Cancelled flash sale purchases");

        Ok(deleted)
    }

    /// Purchase history for one customer, optionally scoped to a sale.
    pub async fn customer_history(
        &self,
        customer_phone: &str,
        flash_sale_id: Option<i64>,
    ) -> DbResult<Vec<FlashSalePurchase>> {
        let purchases = sqlx::query_as::<_, FlashSalePurchase>(
            r#"
            SELECT * FROM flash_sale_purchases
            WHERE customer_phone = ?1
              AND (?2 IS NULL OR flash_sale_id = ?2)
            ORDER BY purchased_at_unix DESC
            "#,
        )
        .bind(customer_phone)
        .bind(flash_sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Aggregate purchase statistics for one flash sale.
    pub async fn sale_stats(&self, flash_sale_id: i64) -> DbResult<SaleStats> {
        let stats = sqlx::query_as::<_, SaleStats>(
            r#"
            SELECT
                COUNT(DISTINCT customer_phone) AS unique_customers,
                COUNT(DISTINCT order_id) AS order_count,
                COALESCE(SUM(quantity), 0) AS total_quantity,
                COALESCE(SUM(total_amount), 0) AS total_revenue,
                MIN(purchased_at_unix) AS first_purchase_unix,
                MAX(purchased_at_unix) AS last_purchase_unix
            FROM flash_sale_purchases
            WHERE flash_sale_id = ?1
            "#,
        )
        .bind(flash_sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Biggest customers of one flash sale by quantity bought.
    pub async fn top_customers(
        &self,
        flash_sale_id: i64,
        limit: i64,
    ) -> DbResult<Vec<CustomerTotal>> {
        let customers = sqlx::query_as::<_, CustomerTotal>(
            r#"
            SELECT
                customer_phone,
                MAX(customer_name) AS customer_name,
                SUM(quantity) AS total_quantity,
                SUM(total_amount) AS total_spent
            FROM flash_sale_purchases
            WHERE flash_sale_id = ?1
            GROUP BY customer_phone
            ORDER BY total_quantity DESC, total_spent DESC
            LIMIT ?2
            "#,
        )
        .bind(flash_sale_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    // =========================================================================
    // Internal Loads
    // =========================================================================

    async fn load_product(&self, id: i64) -> DbResult<Option<FlashSaleProduct>> {
        let product = sqlx::query_as::<_, FlashSaleProduct>(
            "SELECT * FROM flash_sale_products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn load_parent_sale(&self, product: &FlashSaleProduct) -> DbResult<FlashSale> {
        let sale = sqlx::query_as::<_, FlashSale>("SELECT * FROM flash_sales WHERE id = ?1")
            .bind(product.flash_sale_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(sale)
    }

    async fn prior_quantity(&self, product_id: i64, customer_phone: &str) -> DbResult<i64> {
        let prior: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM flash_sale_purchases
            WHERE flash_sale_product_id = ?1 AND customer_phone = ?2
            "#,
        )
        .bind(product_id)
        .bind(customer_phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(prior)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::flash_sale::{NewFlashSale, NewFlashSaleProduct};
    use chrono::Utc;

    const PHONE_A: &str = "0912345678";
    const PHONE_B: &str = "0987654321";

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Creates a running sale with one product and returns the product id.
    async fn seed_product(
        db: &Database,
        stock_limit: Option<i64>,
        max_per_customer: Option<i64>,
    ) -> i64 {
        let now = Utc::now().timestamp();
        let sale = db
            .flash_sales()
            .create(NewFlashSale {
                name: "Test Sale".to_string(),
                description: None,
                start_time: now - 3600,
                end_time: now + 3600,
                is_visible: true,
            })
            .await
            .unwrap();

        db.flash_sales()
            .add_product(
                sale.id,
                NewFlashSaleProduct {
                    product_id: 1,
                    original_price: 150_000,
                    flash_price: 99_000,
                    stock_limit,
                    max_per_customer,
                },
            )
            .await
            .unwrap()
            .id
    }

    fn purchase(product_id: i64, order: &str, phone: &str, qty: i64) -> NewPurchase {
        NewPurchase {
            flash_sale_product_id: product_id,
            order_id: order.to_string(),
            customer_phone: phone.to_string(),
            customer_name: "Khách Test".to_string(),
            quantity: qty,
        }
    }

    #[tokio::test]
    async fn test_record_and_counter() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 3), now)
            .await
            .unwrap();

        let PurchaseOutcome::Recorded(row) = outcome else {
            panic!("expected recorded");
        };
        assert_eq!(row.total_amount, 297_000);

        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 3);
    }

    #[tokio::test]
    async fn test_record_requires_order_id() {
        use shop_core::error::{CoreError, ValidationError};

        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        for order_id in ["", "   "] {
            let result = db
                .purchases()
                .record(purchase(product_id, order_id, PHONE_A, 1), now)
                .await;
            assert!(matches!(
                result,
                Err(DbError::Core(CoreError::Validation(
                    ValidationError::Required { .. }
                )))
            ));
        }

        // Nothing was written by the rejected attempts
        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 0);
        assert!(db
            .purchases()
            .customer_history(PHONE_A, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_conditional_update_refuses_oversell() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        db.purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 9), now)
            .await
            .unwrap();

        // 1 unit left: quantity 2 is refused with the true remainder
        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-2", PHONE_B, 2), now)
            .await
            .unwrap();
        match outcome {
            PurchaseOutcome::Denied(Denial::OutOfStock { remaining }) => {
                assert_eq!(remaining, 1)
            }
            other => panic!("expected out of stock, got {:?}", other),
        }

        // Nothing was written by the refused attempt
        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 9);
        assert!(db
            .purchases()
            .customer_history(PHONE_B, None)
            .await
            .unwrap()
            .is_empty());

        // The last unit still sells
        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-3", PHONE_B, 1), now)
            .await
            .unwrap();
        assert!(matches!(outcome, PurchaseOutcome::Recorded(_)));
    }

    #[tokio::test]
    async fn test_guard_rollback_reports_live_counter() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        // Consume the stock between the purchase INSERT and the counter
        // bump, the way a concurrent recording that committed first would.
        sqlx::query(
            r#"
            CREATE TRIGGER drain_stock AFTER INSERT ON flash_sale_purchases
            BEGIN
                UPDATE flash_sale_products
                SET sold_count = stock_limit
                WHERE id = NEW.flash_sale_product_id;
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 2), now)
            .await
            .unwrap();
        match outcome {
            PurchaseOutcome::Denied(Denial::OutOfStock { remaining }) => {
                // Reported from the committed row, which the rollback restored
                assert_eq!(remaining, 10)
            }
            other => panic!("expected out of stock, got {:?}", other),
        }

        // The losing attempt left nothing behind
        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 0);
        assert!(db
            .purchases()
            .customer_history(PHONE_A, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_per_customer_cap_across_orders() {
        let db = test_db().await;
        let product_id = seed_product(&db, None, Some(2)).await;
        let now = Utc::now().timestamp();

        db.purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 1), now)
            .await
            .unwrap();

        // Second order pushing the same phone past the cap is refused
        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-2", PHONE_A, 2), now)
            .await
            .unwrap();
        match outcome {
            PurchaseOutcome::Denied(Denial::CustomerLimit { can_still_buy, .. }) => {
                assert_eq!(can_still_buy, 1)
            }
            other => panic!("expected customer limit, got {:?}", other),
        }

        // A different customer is unaffected
        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-3", PHONE_B, 2), now)
            .await
            .unwrap();
        assert!(matches!(outcome, PurchaseOutcome::Recorded(_)));
    }

    #[tokio::test]
    async fn test_check_eligibility_is_advisory() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(5), Some(2)).await;
        let now = Utc::now().timestamp();

        let answer = db
            .purchases()
            .check_eligibility(product_id, PHONE_A, 2, now)
            .await
            .unwrap();
        match answer {
            PurchaseEligibility::Allowed {
                flash_price,
                remaining_after,
            } => {
                assert_eq!(flash_price.dong(), 99_000);
                assert_eq!(remaining_after, Some(3));
            }
            other => panic!("expected allowed, got {:?}", other),
        }

        // Unknown product is a denial, not an error
        let answer = db
            .purchases()
            .check_eligibility(9999, PHONE_A, 1, now)
            .await
            .unwrap();
        assert_eq!(
            answer,
            PurchaseEligibility::Denied {
                denial: Denial::ProductUnavailable
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_returns_stock_and_deletes() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        db.purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 4), now)
            .await
            .unwrap();

        let deleted = db.purchases().cancel("order-1", now).await.unwrap();
        assert_eq!(deleted, 1);

        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 0);
        assert!(db
            .purchases()
            .customer_history(PHONE_A, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_cancel_clamps_counter_at_zero() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        let now = Utc::now().timestamp();

        db.purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 4), now)
            .await
            .unwrap();

        // Simulate a counter that drifted low
        sqlx::query("UPDATE flash_sale_products SET sold_count = 1 WHERE id = ?1")
            .bind(product_id)
            .execute(db.pool())
            .await
            .unwrap();

        db.purchases().cancel("order-1", now).await.unwrap();

        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        assert_eq!(product.sold_count, 0);
    }

    #[tokio::test]
    async fn test_cancel_missing_purchase_is_not_found() {
        let db = test_db().await;
        let now = Utc::now().timestamp();

        let result = db.purchases().cancel("no-such-order", now).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stats_and_top_customers() {
        let db = test_db().await;
        let product_id = seed_product(&db, None, None).await;
        let now = Utc::now().timestamp();

        db.purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 3), now)
            .await
            .unwrap();
        db.purchases()
            .record(purchase(product_id, "order-2", PHONE_B, 1), now + 10)
            .await
            .unwrap();

        let product = db.flash_sales().get_product(product_id).await.unwrap().unwrap();
        let stats = db.purchases().sale_stats(product.flash_sale_id).await.unwrap();
        assert_eq!(stats.unique_customers, 2);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.total_quantity, 4);
        assert_eq!(stats.total_revenue, 4 * 99_000);
        assert_eq!(stats.first_purchase_unix, Some(now));
        assert_eq!(stats.last_purchase_unix, Some(now + 10));

        let top = db
            .purchases()
            .top_customers(product.flash_sale_id, 1)
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].customer_phone, PHONE_A);
        assert_eq!(top[0].total_quantity, 3);
    }

    #[tokio::test]
    async fn test_ended_sale_refuses_recording() {
        let db = test_db().await;
        let product_id = seed_product(&db, Some(10), None).await;
        // Well past any window
        let far_future = Utc::now().timestamp() + 100_000;

        let outcome = db
            .purchases()
            .record(purchase(product_id, "order-1", PHONE_A, 1), far_future)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            PurchaseOutcome::Denied(Denial::SaleNotRunning)
        ));
    }
}
