//! # Collaborator (CTV) Repository
//!
//! Collaborator registration, commission rates, custom slug management,
//! and monthly commission settlement.
//!
//! ## Dual Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Referral Identity Resolution                          │
//! │                                                                         │
//! │  A collaborator is reachable by two interchangeable keys:              │
//! │                                                                         │
//! │    referral_code  "CTV001"     uppercase, assigned at registration     │
//! │    custom_slug    "mai-shop"   lowercase, chosen by the collaborator   │
//! │                                                                         │
//! │  resolve("mai-shop") and resolve("CTV001") find the same row.          │
//! │  Slugs therefore may not collide with any referral code either.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Slug Change Rules
//! Format checks live in shop_core::slug; this repository adds the collision
//! lookups, phone verification, and the 3-changes-per-365-days rate limit.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use shop_core::slug::{can_change_slug, phones_match, slug_changes_remaining, validate_slug, SLUG_CHANGE_WINDOW_SECS};
use shop_core::types::{CommissionPayment, Ctv, PaymentStatus};
use shop_core::validation::{
    validate_commission_fraction, validate_month, validate_name, validate_phone,
    validate_referral_code,
};
use shop_core::{CoreError, DEFAULT_COMMISSION_FRACTION};

// =============================================================================
// Input and Output Types
// =============================================================================

/// Input for registering a collaborator.
#[derive(Debug, Clone)]
pub struct NewCtv {
    /// Uppercase business key, e.g. `CTV001`.
    pub referral_code: String,
    pub full_name: String,
    pub phone: String,
    /// Fraction 0..1. None falls back to the default rate.
    pub commission_rate: Option<f64>,
}

/// Result of a successful slug change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugUpdate {
    pub custom_slug: String,
    /// Changes left inside the current rate-limit window.
    pub changes_remaining: i64,
}

/// Result of settling one month of commissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    /// New commission_payments rows.
    pub created: u64,
    /// Existing rows whose amounts were refreshed.
    pub updated: u64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for collaborator database operations.
#[derive(Debug, Clone)]
pub struct CtvRepository {
    pool: SqlitePool,
}

impl CtvRepository {
    /// Creates a new CtvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CtvRepository { pool }
    }

    /// Registers a collaborator.
    ///
    /// The referral code is stored uppercase; a duplicate surfaces as
    /// `DbError::UniqueViolation` via the UNIQUE index.
    pub async fn register(&self, input: NewCtv) -> DbResult<Ctv> {
        let code = input.referral_code.trim().to_uppercase();
        validate_referral_code(&code)?;
        validate_name("full_name", &input.full_name)?;
        validate_phone(&input.phone)?;

        let rate = input.commission_rate.unwrap_or(DEFAULT_COMMISSION_FRACTION);
        validate_commission_fraction(rate)?;

        let now = Utc::now().timestamp();

        debug!(referral_code = %code, rate, "Registering collaborator");

        let ctv = sqlx::query_as::<_, Ctv>(
            r#"
            INSERT INTO ctv (
                referral_code, full_name, phone, commission_rate,
                status, created_at_unix, updated_at_unix
            ) VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?5)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(input.full_name.trim())
        .bind(input.phone.trim())
        .bind(rate)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(ctv)
    }

    /// Gets a collaborator by referral code (case-insensitive).
    pub async fn get_by_code(&self, referral_code: &str) -> DbResult<Option<Ctv>> {
        let ctv = sqlx::query_as::<_, Ctv>("SELECT * FROM ctv WHERE referral_code = UPPER(?1)")
            .bind(referral_code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(ctv)
    }

    /// Resolves a referral identifier: custom slug first, then referral code.
    ///
    /// `resolve("mai-shop")` and `resolve("CTV001")` both work; matching is
    /// case-insensitive on both keys.
    pub async fn resolve(&self, identifier: &str) -> DbResult<Option<Ctv>> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let ctv = sqlx::query_as::<_, Ctv>(
            r#"
            SELECT * FROM ctv
            WHERE custom_slug = LOWER(?1) OR referral_code = UPPER(?1)
            LIMIT 1
            "#,
        )
        .bind(trimmed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ctv)
    }

    /// Sets one collaborator's commission rate.
    pub async fn set_commission_rate(&self, referral_code: &str, fraction: f64) -> DbResult<()> {
        validate_commission_fraction(fraction)?;

        let now = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE ctv SET commission_rate = ?2, updated_at_unix = ?3
            WHERE referral_code = UPPER(?1)
            "#,
        )
        .bind(referral_code.trim())
        .bind(fraction)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CTV", referral_code));
        }

        Ok(())
    }

    /// Sets the commission rate for a batch of collaborators.
    ///
    /// Unknown codes are skipped; the count of actually updated rows is
    /// returned so the caller can report the difference.
    pub async fn bulk_set_commission_rate(
        &self,
        referral_codes: &[String],
        fraction: f64,
    ) -> DbResult<u64> {
        validate_commission_fraction(fraction)?;

        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;

        for code in referral_codes {
            updated += sqlx::query(
                r#"
                UPDATE ctv SET commission_rate = ?2, updated_at_unix = ?3
                WHERE referral_code = UPPER(?1)
                "#,
            )
            .bind(code.trim())
            .bind(fraction)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        info!(requested = referral_codes.len(), updated, fraction, "Bulk rate update");

        Ok(updated)
    }

    // =========================================================================
    // Custom Slugs
    // =========================================================================

    /// Whether `slug` is valid and free.
    ///
    /// Checks the format rules first, then collisions against every other
    /// collaborator's custom slug and referral code. `exclude_code` skips the
    /// caller's own row so re-claiming your current slug reads as available.
    pub async fn check_slug_availability(
        &self,
        slug: &str,
        exclude_code: Option<&str>,
    ) -> DbResult<bool> {
        validate_slug(slug)?;

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM ctv
                WHERE (custom_slug = ?1 OR LOWER(referral_code) = ?1)
                  AND (?2 IS NULL OR referral_code != UPPER(?2))
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(!taken)
    }

    /// Changes a collaborator's custom slug.
    ///
    /// ## Steps
    /// 1. Load the collaborator (NotFound if missing)
    /// 2. Validate the slug format
    /// 3. Verify the registered phone (leading-zero tolerant)
    /// 4. Enforce the 3-changes-per-365-days limit
    /// 5. Check availability against slugs and referral codes
    /// 6. Write the slug and advance the change counter
    ///
    /// The counter resets to 1 when the previous change has aged out of the
    /// rolling window.
    pub async fn update_custom_slug(
        &self,
        referral_code: &str,
        new_slug: &str,
        phone_verify: &str,
        now: i64,
    ) -> DbResult<SlugUpdate> {
        let ctv = self
            .get_by_code(referral_code)
            .await?
            .ok_or_else(|| DbError::not_found("CTV", referral_code))?;

        let slug = new_slug.trim().to_lowercase();
        validate_slug(&slug)?;

        if !phones_match(&ctv.phone, phone_verify) {
            return Err(DbError::Core(CoreError::PhoneMismatch {
                referral_code: ctv.referral_code,
            }));
        }

        if !can_change_slug(ctv.slug_change_count, ctv.slug_updated_at_unix, now) {
            return Err(DbError::Core(CoreError::SlugChangeLimit {
                referral_code: ctv.referral_code,
            }));
        }

        if !self
            .check_slug_availability(&slug, Some(ctv.referral_code.as_str()))
            .await?
        {
            return Err(DbError::duplicate("custom_slug", slug));
        }

        let window_aged_out = ctv
            .slug_updated_at_unix
            .map(|last| now - last >= SLUG_CHANGE_WINDOW_SECS)
            .unwrap_or(true);
        let new_count = if window_aged_out {
            1
        } else {
            ctv.slug_change_count + 1
        };

        sqlx::query(
            r#"
            UPDATE ctv SET
                custom_slug = ?2,
                slug_change_count = ?3,
                slug_updated_at_unix = ?4,
                updated_at_unix = ?4
            WHERE id = ?1
            "#,
        )
        .bind(ctv.id)
        .bind(&slug)
        .bind(new_count)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(referral_code = %ctv.referral_code, slug = %slug, "Custom slug updated");

        Ok(SlugUpdate {
            custom_slug: slug,
            changes_remaining: slug_changes_remaining(new_count),
        })
    }

    // =========================================================================
    // Monthly Settlement
    // =========================================================================

    /// Settles one month of commissions.
    ///
    /// Groups the month's non-cancelled referred orders by referral code and
    /// upserts one `commission_payments` row per collaborator. Re-running a
    /// month refreshes the amounts without touching payment status, so a
    /// late-cancelled order corrects the pending figure.
    pub async fn settle_month(&self, month: &str) -> DbResult<SettlementResult> {
        validate_month(month)?;

        #[derive(sqlx::FromRow)]
        struct MonthTotal {
            referral_code: String,
            commission_total: i64,
            order_count: i64,
        }

        let mut tx = self.pool.begin().await?;

        let totals = sqlx::query_as::<_, MonthTotal>(
            r#"
            SELECT
                referral_code,
                COALESCE(SUM(commission), 0) AS commission_total,
                COUNT(*) AS order_count
            FROM orders
            WHERE referral_code IS NOT NULL
              AND status != 'cancelled'
              AND strftime('%Y-%m', created_at_unix, 'unixepoch') = ?1
            GROUP BY referral_code
            "#,
        )
        .bind(month)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now().timestamp();
        let mut result = SettlementResult::default();

        for total in &totals {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM commission_payments WHERE referral_code = ?1 AND month = ?2)",
            )
            .bind(&total.referral_code)
            .bind(month)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO commission_payments (
                    referral_code, month, commission_amount, order_count,
                    status, created_at_unix, updated_at_unix
                ) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)
                ON CONFLICT (referral_code, month) DO UPDATE SET
                    commission_amount = excluded.commission_amount,
                    order_count = excluded.order_count,
                    updated_at_unix = excluded.updated_at_unix
                "#,
            )
            .bind(&total.referral_code)
            .bind(month)
            .bind(total.commission_total)
            .bind(total.order_count)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if exists {
                result.updated += 1;
            } else {
                result.created += 1;
            }
        }

        tx.commit().await?;

        info!(
            month,
            created = result.created,
            updated = result.updated,
            "Commission settlement complete"
        );

        Ok(result)
    }

    /// All settlement rows for one month, largest first.
    pub async fn monthly_payments(&self, month: &str) -> DbResult<Vec<CommissionPayment>> {
        validate_month(month)?;

        let payments = sqlx::query_as::<_, CommissionPayment>(
            r#"
            SELECT * FROM commission_payments
            WHERE month = ?1
            ORDER BY commission_amount DESC
            "#,
        )
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Marks one settlement row as paid.
    pub async fn set_payment_status(
        &self,
        referral_code: &str,
        month: &str,
        status: PaymentStatus,
    ) -> DbResult<()> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE commission_payments SET status = ?3, updated_at_unix = ?4
            WHERE referral_code = UPPER(?1) AND month = ?2
            "#,
        )
        .bind(referral_code.trim())
        .bind(month)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Commission payment",
                format!("{}/{}", referral_code, month),
            ));
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
    use shop_core::slug::MAX_SLUG_CHANGES;

    const DAY: i64 = 24 * 60 * 60;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn mai() -> NewCtv {
        NewCtv {
            referral_code: "CTV001".to_string(),
            full_name: "Nguyễn Thị Mai".to_string(),
            phone: "0912345678".to_string(),
            commission_rate: Some(0.1),
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve_dual_identity() {
        let db = test_db().await;
        let ctv = db.ctv().register(mai()).await.unwrap();
        assert_eq!(ctv.referral_code, "CTV001");
        assert_eq!(ctv.commission_rate, 0.1);

        // Resolvable by code in any case
        assert!(db.ctv().resolve("ctv001").await.unwrap().is_some());

        // Claim a slug, then both identities resolve
        let now = Utc::now().timestamp();
        db.ctv()
            .update_custom_slug("CTV001", "mai-shop", "0912345678", now)
            .await
            .unwrap();
        let by_slug = db.ctv().resolve("mai-shop").await.unwrap().unwrap();
        assert_eq!(by_slug.referral_code, "CTV001");
    }

    #[tokio::test]
    async fn test_register_duplicate_code() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();
        let result = db.ctv().register(mai()).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_register_defaults_commission_rate() {
        let db = test_db().await;
        let mut input = mai();
        input.commission_rate = None;
        let ctv = db.ctv().register(input).await.unwrap();
        assert_eq!(ctv.commission_rate, DEFAULT_COMMISSION_FRACTION);
    }

    #[tokio::test]
    async fn test_slug_availability_covers_referral_codes() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();

        // A slug equal to an existing referral code (lowercased) is taken
        assert!(!db.ctv().check_slug_availability("ctv001", None).await.unwrap());
        assert!(db.ctv().check_slug_availability("mai-shop", None).await.unwrap());

        // Excluding your own code frees your own identifiers
        assert!(db
            .ctv()
            .check_slug_availability("ctv001", Some("CTV001"))
            .await
            .unwrap());

        // Format problems are errors, not "unavailable"
        assert!(db.ctv().check_slug_availability("ab", None).await.is_err());
    }

    #[tokio::test]
    async fn test_slug_change_requires_matching_phone() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();
        let now = Utc::now().timestamp();

        let result = db
            .ctv()
            .update_custom_slug("CTV001", "mai-shop", "0900000000", now)
            .await;
        assert!(matches!(
            result,
            Err(DbError::Core(CoreError::PhoneMismatch { .. }))
        ));

        // Leading-zero variant of the registered phone is accepted
        let update = db
            .ctv()
            .update_custom_slug("CTV001", "mai-shop", "912345678", now)
            .await
            .unwrap();
        assert_eq!(update.custom_slug, "mai-shop");
        assert_eq!(update.changes_remaining, MAX_SLUG_CHANGES - 1);
    }

    #[tokio::test]
    async fn test_slug_change_rate_limit_and_window_reset() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();
        let now = Utc::now().timestamp();

        for (i, slug) in ["slug-one", "slug-two", "slug-three"].iter().enumerate() {
            let update = db
                .ctv()
                .update_custom_slug("CTV001", slug, "0912345678", now + i as i64)
                .await
                .unwrap();
            assert_eq!(update.changes_remaining, MAX_SLUG_CHANGES - 1 - i as i64);
        }

        // Fourth change inside the window is refused
        let result = db
            .ctv()
            .update_custom_slug("CTV001", "slug-four", "0912345678", now + 10)
            .await;
        assert!(matches!(
            result,
            Err(DbError::Core(CoreError::SlugChangeLimit { .. }))
        ));

        // After the window ages out the counter resets
        let later = now + 366 * DAY;
        let update = db
            .ctv()
            .update_custom_slug("CTV001", "slug-four", "0912345678", later)
            .await
            .unwrap();
        assert_eq!(update.changes_remaining, MAX_SLUG_CHANGES - 1);
    }

    #[tokio::test]
    async fn test_slug_collision_with_other_ctv() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();
        db.ctv()
            .register(NewCtv {
                referral_code: "CTV002".to_string(),
                full_name: "Trần Văn An".to_string(),
                phone: "0987654321".to_string(),
                commission_rate: None,
            })
            .await
            .unwrap();

        let now = Utc::now().timestamp();
        db.ctv()
            .update_custom_slug("CTV001", "mai-shop", "0912345678", now)
            .await
            .unwrap();

        let result = db
            .ctv()
            .update_custom_slug("CTV002", "mai-shop", "0987654321", now)
            .await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_bulk_rate_update_counts_hits() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();

        let updated = db
            .ctv()
            .bulk_set_commission_rate(
                &["CTV001".to_string(), "NOPE99".to_string()],
                0.15,
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let ctv = db.ctv().get_by_code("CTV001").await.unwrap().unwrap();
        assert_eq!(ctv.commission_rate, 0.15);
    }

    #[tokio::test]
    async fn test_set_commission_rate_rejects_bad_fraction() {
        let db = test_db().await;
        db.ctv().register(mai()).await.unwrap();

        assert!(db.ctv().set_commission_rate("CTV001", 1.5).await.is_err());
        assert!(db.ctv().set_commission_rate("CTV001", -0.1).await.is_err());
        assert!(db.ctv().set_commission_rate("MISSING", 0.1).await.is_err());
    }

    #[tokio::test]
    async fn test_settle_month_rejects_bad_month_key() {
        let db = test_db().await;
        assert!(db.ctv().settle_month("2025-13").await.is_err());
        assert!(db.ctv().settle_month("202501").await.is_err());

        // A valid but empty month settles nothing
        let result = db.ctv().settle_month("2025-01").await.unwrap();
        assert_eq!(result, SettlementResult::default());
    }
}
