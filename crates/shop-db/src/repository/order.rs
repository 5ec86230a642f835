//! # Order Repository
//!
//! Order creation and lifecycle, with commission captured at order time.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Commission Snapshot at Order Time                       │
//! │                                                                         │
//! │  create(order with referral "mai-shop")                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve CTV ──► commission_rate = 0.10 (today's rate)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commission = round((total − shipping) × 0.10)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT orders (rate AND amount frozen on the row)                     │
//! │                                                                         │
//! │  The CTV's rate changing to 0.15 next week does not touch this order:  │
//! │  settlement sums the stored commission column, never recomputes.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shop_core::money::{calculate_commission, Money};
use shop_core::types::{Ctv, Order, OrderStatus};
use shop_core::validation::{validate_name, validate_phone, validate_price};

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub address: Option<String>,
    /// Whole đồng, includes shipping.
    pub total_amount: i64,
    /// Whole đồng; excluded from the commission base.
    pub shipping_fee: i64,
    /// Referral identifier: custom slug or referral code, any case.
    pub referral: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order.
    ///
    /// When a referral identifier is supplied the active collaborator is
    /// resolved (slug or code), and both the rate and the computed commission
    /// are frozen onto the row. An identifier that resolves to nobody is an
    /// error rather than a silently unattributed order.
    pub async fn create(&self, input: NewOrder, now: i64) -> DbResult<Order> {
        validate_name("customer_name", &input.customer_name)?;
        validate_phone(&input.customer_phone)?;
        validate_price("total_amount", input.total_amount)?;
        validate_price("shipping_fee", input.shipping_fee)?;

        let referrer = match input.referral.as_deref().map(str::trim) {
            Some(identifier) if !identifier.is_empty() => {
                let ctv = sqlx::query_as::<_, Ctv>(
                    r#"
                    SELECT * FROM ctv
                    WHERE (custom_slug = LOWER(?1) OR referral_code = UPPER(?1))
                      AND status = 'active'
                    LIMIT 1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("CTV", identifier))?;
                Some(ctv)
            }
            _ => None,
        };

        let (referral_code, commission_rate, commission) = match &referrer {
            Some(ctv) => {
                let commission = calculate_commission(
                    Money::from_dong(input.total_amount),
                    Money::from_dong(input.shipping_fee),
                    ctv.commission_rate(),
                );
                (
                    Some(ctv.referral_code.clone()),
                    Some(ctv.commission_rate),
                    commission.dong(),
                )
            }
            None => (None, None, 0),
        };

        let id = Uuid::new_v4().to_string();

        debug!(
            order_id = %id,
            referral_code = ?referral_code,
            commission,
            "Creating order"
        );

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, customer_name, customer_phone, address,
                total_amount, shipping_fee, referral_code, commission_rate,
                commission, status, created_at_unix, updated_at_unix
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', ?10, ?10)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(input.customer_name.trim())
        .bind(input.customer_phone.trim())
        .bind(&input.address)
        .bind(input.total_amount)
        .bind(input.shipping_fee)
        .bind(&referral_code)
        .bind(commission_rate)
        .bind(commission)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// All orders attributed to one referral code, newest first.
    pub async fn by_referral_code(&self, referral_code: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE referral_code = UPPER(?1)
            ORDER BY created_at_unix DESC
            "#,
        )
        .bind(referral_code.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// All orders from one customer phone, newest first.
    pub async fn by_phone(&self, customer_phone: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE customer_phone = ?1
            ORDER BY created_at_unix DESC
            "#,
        )
        .bind(customer_phone.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// The most recent orders.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at_unix DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Sets the status of an order.
    pub async fn set_status(&self, id: &str, status: OrderStatus, now: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at_unix = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Cancels an order.
    ///
    /// Flash-sale stock return is the caller's responsibility: cancel the
    /// order's purchases through the purchase repository as well.
    pub async fn cancel(&self, id: &str, now: i64) -> DbResult<()> {
        self.set_status(id, OrderStatus::Cancelled, now).await
    }

    /// Corrects an order's total and frozen commission (manual adjustment).
    pub async fn update_amount(&self, id: &str, total_amount: i64, commission: i64) -> DbResult<()> {
        validate_price("total_amount", total_amount)?;
        validate_price("commission", commission)?;

        let now = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE orders SET total_amount = ?2, commission = ?3, updated_at_unix = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(total_amount)
        .bind(commission)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::ctv::NewCtv;
    use shop_core::types::PaymentStatus;

    async fn test_db_with_ctv() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ctv()
            .register(NewCtv {
                referral_code: "CTV001".to_string(),
                full_name: "Nguyễn Thị Mai".to_string(),
                phone: "0912345678".to_string(),
                commission_rate: Some(0.1),
            })
            .await
            .unwrap();
        db
    }

    fn order(referral: Option<&str>) -> NewOrder {
        NewOrder {
            customer_name: "Khách Test".to_string(),
            customer_phone: "0900111222".to_string(),
            address: Some("Hà Nội".to_string()),
            total_amount: 500_000,
            shipping_fee: 30_000,
            referral: referral.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_captures_commission() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();

        let created = db.orders().create(order(Some("CTV001")), now).await.unwrap();
        assert_eq!(created.referral_code.as_deref(), Some("CTV001"));
        assert_eq!(created.commission_rate, Some(0.1));
        // round((500000 - 30000) * 0.1) = 47000
        assert_eq!(created.commission, 47_000);
        assert_eq!(created.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_without_referral() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();

        let created = db.orders().create(order(None), now).await.unwrap();
        assert_eq!(created.referral_code, None);
        assert_eq!(created.commission_rate, None);
        assert_eq!(created.commission, 0);
    }

    #[tokio::test]
    async fn test_create_with_unknown_referral_fails() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();

        let result = db.orders().create(order(Some("NOBODY")), now).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_commission_survives_rate_change() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();

        let created = db.orders().create(order(Some("CTV001")), now).await.unwrap();
        db.ctv().set_commission_rate("CTV001", 0.2).await.unwrap();

        let reloaded = db.orders().get(&created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.commission_rate, Some(0.1));
        assert_eq!(reloaded.commission, 47_000);
    }

    #[tokio::test]
    async fn test_referral_resolves_by_slug() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();
        db.ctv()
            .update_custom_slug("CTV001", "mai-shop", "0912345678", now)
            .await
            .unwrap();

        let created = db.orders().create(order(Some("mai-shop")), now).await.unwrap();
        // The canonical code is what lands on the order, not the slug
        assert_eq!(created.referral_code.as_deref(), Some("CTV001"));
    }

    #[tokio::test]
    async fn test_settlement_excludes_cancelled_orders() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();
        let month = chrono::DateTime::from_timestamp(now, 0)
            .unwrap()
            .format("%Y-%m")
            .to_string();

        let kept = db.orders().create(order(Some("CTV001")), now).await.unwrap();
        let dropped = db.orders().create(order(Some("CTV001")), now).await.unwrap();
        db.orders().cancel(&dropped.id, now).await.unwrap();

        let result = db.ctv().settle_month(&month).await.unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.updated, 0);

        let payments = db.ctv().monthly_payments(&month).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].commission_amount, kept.commission);
        assert_eq!(payments[0].order_count, 1);

        // Re-settling refreshes instead of duplicating
        let again = db.ctv().settle_month(&month).await.unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.updated, 1);

        // Paying out, then re-settling, keeps the paid status
        db.ctv()
            .set_payment_status("CTV001", &month, PaymentStatus::Paid)
            .await
            .unwrap();
        db.ctv().settle_month(&month).await.unwrap();
        let payments = db.ctv().monthly_payments(&month).await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_lookups_and_status() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();

        let created = db.orders().create(order(Some("CTV001")), now).await.unwrap();

        assert_eq!(db.orders().by_referral_code("ctv001").await.unwrap().len(), 1);
        assert_eq!(db.orders().by_phone("0900111222").await.unwrap().len(), 1);
        assert_eq!(db.orders().recent(10).await.unwrap().len(), 1);

        db.orders()
            .set_status(&created.id, OrderStatus::Confirmed, now)
            .await
            .unwrap();
        let reloaded = db.orders().get(&created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Confirmed);

        assert!(db
            .orders()
            .set_status("missing-id", OrderStatus::Confirmed, now)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_amount() {
        let db = test_db_with_ctv().await;
        let now = Utc::now().timestamp();
        let created = db.orders().create(order(Some("CTV001")), now).await.unwrap();

        db.orders()
            .update_amount(&created.id, 400_000, 37_000)
            .await
            .unwrap();
        let reloaded = db.orders().get(&created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_amount, 400_000);
        assert_eq!(reloaded.commission, 37_000);
    }
}
