//! # Repository Module
//!
//! Database repository implementations for the shop back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller (API handler, job, seed)                                       │
//! │       │                                                                 │
//! │       │  db.purchases().check_eligibility(product, phone, qty, now)     │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  PurchaseRepository                                                     │
//! │  ├── check_eligibility(...)                                             │
//! │  ├── record(...)                                                        │
//! │  ├── cancel(...)                                                        │
//! │  └── sale_stats(...)                                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory SQLite per test)                            │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`FlashSaleRepository`] - Flash sale CRUD, product enrollment, status sync
//! - [`PurchaseRepository`] - Eligibility checks, purchase recording, stats
//! - [`CtvRepository`] - Collaborators, slugs, commission settlement
//! - [`OrderRepository`] - Orders with commission captured at order time
//!
//! [`FlashSaleRepository`]: flash_sale::FlashSaleRepository
//! [`PurchaseRepository`]: purchase::PurchaseRepository
//! [`CtvRepository`]: ctv::CtvRepository
//! [`OrderRepository`]: order::OrderRepository

pub mod ctv;
pub mod flash_sale;
pub mod order;
pub mod purchase;
