//! # Flash Sale Repository
//!
//! Database operations for flash sales and their enrolled products.
//!
//! ## Flash Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Flash Sale Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → FlashSale { status derived from the clock }          │
//! │                                                                         │
//! │  2. ENROLL PRODUCTS                                                     │
//! │     └── add_product() → FlashSaleProduct { sold_count: 0 }              │
//! │                                                                         │
//! │  3. TIME PASSES                                                         │
//! │     └── sync_statuses(now) → scheduled→active, active→ended             │
//! │         (statuses chase the clock; the window itself is authoritative   │
//! │          for eligibility, so a late sync never oversells)               │
//! │                                                                         │
//! │  4. EDIT / DELETE GUARDS                                                │
//! │     └── update() refuses ended/cancelled sales                          │
//! │     └── delete() refuses active sales                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shop_core::types::{
    derive_window_status, discount_percentage, FlashSale, FlashSaleProduct, FlashSaleStatus,
};
use shop_core::validation::{validate_flash_pricing, validate_name, validate_time_range};
use shop_core::CoreError;

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating a flash sale.
#[derive(Debug, Clone)]
pub struct NewFlashSale {
    pub name: String,
    pub description: Option<String>,
    /// Window start, unix seconds (inclusive).
    pub start_time: i64,
    /// Window end, unix seconds (exclusive).
    pub end_time: i64,
    pub is_visible: bool,
}

/// Partial update for a flash sale. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FlashSaleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub is_visible: Option<bool>,
}

/// Input for enrolling a product in a flash sale.
#[derive(Debug, Clone)]
pub struct NewFlashSaleProduct {
    pub product_id: i64,
    pub original_price: i64,
    pub flash_price: i64,
    /// None = unlimited stock.
    pub stock_limit: Option<i64>,
    /// None = no per-customer cap.
    pub max_per_customer: Option<i64>,
}

/// A flash sale row with enrollment aggregates for list views.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FlashSaleSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: FlashSale,
    pub product_count: i64,
    pub total_sold: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for flash sale database operations.
#[derive(Debug, Clone)]
pub struct FlashSaleRepository {
    pool: SqlitePool,
}

impl FlashSaleRepository {
    /// Creates a new FlashSaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FlashSaleRepository { pool }
    }

    /// Creates a flash sale.
    ///
    /// The initial status is derived from the clock: a sale created inside
    /// its window starts `active`, a future one `scheduled`, a past one
    /// `ended`.
    pub async fn create(&self, input: NewFlashSale) -> DbResult<FlashSale> {
        validate_name("name", &input.name)?;
        validate_time_range(input.start_time, input.end_time)?;

        let now = Utc::now().timestamp();
        let status = derive_window_status(input.start_time, input.end_time, now);

        debug!(name = %input.name, status = status.as_str(), "Creating flash sale");

        let sale = sqlx::query_as::<_, FlashSale>(
            r#"
            INSERT INTO flash_sales (
                name, description, start_time, end_time,
                status, is_visible, created_at_unix, updated_at_unix
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(status)
        .bind(input.is_visible)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a flash sale by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<FlashSale>> {
        let sale = sqlx::query_as::<_, FlashSale>("SELECT * FROM flash_sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists all flash sales, newest first, with enrollment aggregates.
    pub async fn list_all(&self) -> DbResult<Vec<FlashSaleSummary>> {
        let sales = sqlx::query_as::<_, FlashSaleSummary>(
            r#"
            SELECT
                fs.*,
                COUNT(fsp.id) AS product_count,
                COALESCE(SUM(fsp.sold_count), 0) AS total_sold
            FROM flash_sales fs
            LEFT JOIN flash_sale_products fsp ON fsp.flash_sale_id = fs.id
            GROUP BY fs.id
            ORDER BY fs.created_at_unix DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales that are visible and running at `now`.
    ///
    /// Filters on the window, not the stored status, so a sale whose status
    /// sync is late still shows up exactly when it should.
    pub async fn list_active(&self, now: i64) -> DbResult<Vec<FlashSale>> {
        let sales = sqlx::query_as::<_, FlashSale>(
            r#"
            SELECT * FROM flash_sales
            WHERE is_visible = 1
              AND status NOT IN ('draft', 'cancelled')
              AND start_time <= ?1 AND ?1 < end_time
            ORDER BY end_time ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Applies a partial update to a flash sale.
    ///
    /// Ended and cancelled sales are frozen history and refuse edits.
    pub async fn update(&self, id: i64, update: FlashSaleUpdate) -> DbResult<FlashSale> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Flash sale", id.to_string()))?;

        if matches!(
            existing.status,
            FlashSaleStatus::Ended | FlashSaleStatus::Cancelled
        ) {
            return Err(DbError::Core(CoreError::InvalidFlashSaleStatus {
                id,
                status: existing.status.as_str().to_string(),
            }));
        }

        let start = update.start_time.unwrap_or(existing.start_time);
        let end = update.end_time.unwrap_or(existing.end_time);
        validate_time_range(start, end)?;
        if let Some(name) = &update.name {
            validate_name("name", name)?;
        }

        let now = Utc::now().timestamp();

        let sale = sqlx::query_as::<_, FlashSale>(
            r#"
            UPDATE flash_sales SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                start_time = ?4,
                end_time = ?5,
                is_visible = COALESCE(?6, is_visible),
                updated_at_unix = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(start)
        .bind(end)
        .bind(update.is_visible)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Sets the status of a flash sale directly (admin action).
    pub async fn set_status(&self, id: i64, status: FlashSaleStatus) -> DbResult<()> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE flash_sales SET status = ?2, updated_at_unix = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Flash sale", id.to_string()));
        }

        Ok(())
    }

    /// Reconciles stored statuses with the clock.
    ///
    /// ## Transitions
    /// - scheduled → active (window started)
    /// - scheduled → ended (window already over, never activated)
    /// - active → ended (window over)
    ///
    /// Draft and cancelled sales are never touched. Returns
    /// `(activated, ended)` row counts.
    pub async fn sync_statuses(&self, now: i64) -> DbResult<(u64, u64)> {
        let activated = sqlx::query(
            r#"
            UPDATE flash_sales SET status = 'active', updated_at_unix = ?1
            WHERE status = 'scheduled' AND start_time <= ?1 AND ?1 < end_time
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let ended = sqlx::query(
            r#"
            UPDATE flash_sales SET status = 'ended', updated_at_unix = ?1
            WHERE status IN ('scheduled', 'active') AND end_time <= ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if activated > 0 || ended > 0 {
            debug!(activated, ended, "Synced flash sale statuses");
        }

        Ok((activated, ended))
    }

    /// Deletes a flash sale and (via cascade) its enrolled products.
    ///
    /// Active sales cannot be deleted; cancel or end them first.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Flash sale", id.to_string()))?;

        if existing.status == FlashSaleStatus::Active {
            return Err(DbError::Core(CoreError::InvalidFlashSaleStatus {
                id,
                status: existing.status.as_str().to_string(),
            }));
        }

        sqlx::query("DELETE FROM flash_sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Enrolled Products
    // =========================================================================

    /// Enrolls a product in a flash sale.
    ///
    /// The flash price must undercut the original price; the display
    /// discount percentage is computed here and stored denormalized.
    pub async fn add_product(
        &self,
        flash_sale_id: i64,
        input: NewFlashSaleProduct,
    ) -> DbResult<FlashSaleProduct> {
        validate_flash_pricing(input.original_price, input.flash_price)?;

        // A UNIQUE(flash_sale_id, product_id) index backs this up; checking
        // first gives the caller a value-carrying duplicate error.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM flash_sale_products WHERE flash_sale_id = ?1 AND product_id = ?2)",
        )
        .bind(flash_sale_id)
        .bind(input.product_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(DbError::duplicate("product_id", input.product_id.to_string()));
        }

        let now = Utc::now().timestamp();
        let discount = discount_percentage(input.original_price, input.flash_price);

        debug!(
            flash_sale_id,
            product_id = input.product_id,
            discount,
            "Enrolling product in flash sale"
        );

        let product = sqlx::query_as::<_, FlashSaleProduct>(
            r#"
            INSERT INTO flash_sale_products (
                flash_sale_id, product_id, original_price, flash_price,
                discount_percentage, stock_limit, sold_count, max_per_customer,
                is_active, created_at_unix, updated_at_unix
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, 1, ?8, ?8)
            RETURNING *
            "#,
        )
        .bind(flash_sale_id)
        .bind(input.product_id)
        .bind(input.original_price)
        .bind(input.flash_price)
        .bind(discount)
        .bind(input.stock_limit)
        .bind(input.max_per_customer)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets all products enrolled in a flash sale.
    pub async fn products(&self, flash_sale_id: i64) -> DbResult<Vec<FlashSaleProduct>> {
        let products = sqlx::query_as::<_, FlashSaleProduct>(
            "SELECT * FROM flash_sale_products WHERE flash_sale_id = ?1 ORDER BY id",
        )
        .bind(flash_sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets one enrolled product by its row ID.
    pub async fn get_product(&self, id: i64) -> DbResult<Option<FlashSaleProduct>> {
        let product = sqlx::query_as::<_, FlashSaleProduct>(
            "SELECT * FROM flash_sale_products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Switches an enrolled product on or off.
    pub async fn set_product_active(&self, id: i64, active: bool) -> DbResult<()> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE flash_sale_products SET is_active = ?2, updated_at_unix = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Flash sale product", id.to_string()));
        }

        Ok(())
    }

    /// Removes a product from a flash sale.
    pub async fn remove_product(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM flash_sale_products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Flash sale product", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
