//! # shop-db: Database Layer for the Shop Back Office
//!
//! This crate provides database access for the shop back office.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back-Office Data Flow                            │
//! │                                                                         │
//! │  Caller (checkout handler, admin panel, settlement job)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shop-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │(purchase.rs..)│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ FlashSaleRepo │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ PurchaseRepo  │    │ 002_track.sql│  │   │
//! │  │   │ Management    │    │ CtvRepo       │    │ 003_slugs.sql│  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL, foreign keys on)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shop.db")).await?;
//!
//! // Eligibility pre-check, then record inside one transaction
//! match db.purchases().check_eligibility(product_id, phone, 2, now).await? {
//!     PurchaseEligibility::Allowed { .. } => {
//!         db.purchases().record(new_purchase, now).await?;
//!     }
//!     PurchaseEligibility::Denied { denial } => show_reason(denial),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ctv::{CtvRepository, NewCtv, SettlementResult, SlugUpdate};
pub use repository::flash_sale::{
    FlashSaleRepository, FlashSaleSummary, FlashSaleUpdate, NewFlashSale, NewFlashSaleProduct,
};
pub use repository::order::{NewOrder, OrderRepository};
pub use repository::purchase::{
    NewPurchase, PurchaseEligibility, PurchaseOutcome, PurchaseRepository, SaleStats,
};
