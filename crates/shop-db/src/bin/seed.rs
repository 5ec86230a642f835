//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p shop-db --bin seed
//!
//! # Specify database path
//! cargo run -p shop-db --bin seed -- --db ./data/shop.db
//!
//! # Number of demo orders
//! cargo run -p shop-db --bin seed -- --orders 40
//! ```
//!
//! ## Generated Data
//! - A handful of collaborators (CTV) with varying commission rates,
//!   one with a custom slug
//! - A running flash sale with limited-stock products and per-customer caps
//! - A scheduled flash sale starting tomorrow
//! - Referred and unreferred orders, a few of them cancelled
//! - Flash-sale purchases against the running sale

use chrono::Utc;
use std::env;

use shop_db::repository::ctv::NewCtv;
use shop_db::repository::flash_sale::{NewFlashSale, NewFlashSaleProduct};
use shop_db::repository::order::NewOrder;
use shop_db::repository::purchase::{NewPurchase, PurchaseOutcome};
use shop_db::{Database, DbConfig};

/// Demo collaborators: (code, name, phone, rate)
const CTVS: &[(&str, &str, &str, f64)] = &[
    ("CTV001", "Nguyễn Thị Mai", "0912345678", 0.10),
    ("CTV002", "Trần Văn An", "0987654321", 0.08),
    ("CTV003", "Lê Hoàng Yến", "0901234567", 0.12),
];

/// Demo customers: (name, phone)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Phạm Minh Tuấn", "0933111222"),
    ("Đỗ Thu Hà", "0944222333"),
    ("Vũ Quang Huy", "0955333444"),
    ("Bùi Ngọc Lan", "0966444555"),
];

/// Flash-sale products: (product_id, original, flash, stock, per-customer cap)
const FLASH_PRODUCTS: &[(i64, i64, i64, Option<i64>, Option<i64>)] = &[
    (101, 150_000, 99_000, Some(50), Some(2)),
    (102, 320_000, 249_000, Some(20), Some(1)),
    (103, 89_000, 59_000, None, Some(5)),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shop_dev.db");
    let mut order_count: usize = 20;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shop Back-Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./shop_dev.db)");
                println!("  -o, --orders <N>    Number of demo orders (default: 20)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shop Back-Office Seed Data Generator");
    println!("=======================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if already seeded
    if db.ctv().get_by_code("CTV001").await?.is_some() {
        println!("⚠ Database already seeded.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now().timestamp();

    // Collaborators
    println!();
    println!("Seeding collaborators...");
    for (code, name, phone, rate) in CTVS {
        db.ctv()
            .register(NewCtv {
                referral_code: code.to_string(),
                full_name: name.to_string(),
                phone: phone.to_string(),
                commission_rate: Some(*rate),
            })
            .await?;
    }
    db.ctv()
        .update_custom_slug("CTV001", "mai-shop", "0912345678", now)
        .await?;
    println!("  {} collaborators ('mai-shop' slug on CTV001)", CTVS.len());

    // Flash sales
    println!("Seeding flash sales...");
    let running = db
        .flash_sales()
        .create(NewFlashSale {
            name: "Flash Sale Cuối Tuần".to_string(),
            description: Some("Giảm giá sốc cuối tuần".to_string()),
            start_time: now - 3600,
            end_time: now + 2 * 24 * 3600,
            is_visible: true,
        })
        .await?;

    db.flash_sales()
        .create(NewFlashSale {
            name: "Flash Sale Ngày Mai".to_string(),
            description: None,
            start_time: now + 24 * 3600,
            end_time: now + 2 * 24 * 3600,
            is_visible: true,
        })
        .await?;

    let mut product_ids = Vec::new();
    for (product_id, original, flash, stock, cap) in FLASH_PRODUCTS {
        let product = db
            .flash_sales()
            .add_product(
                running.id,
                NewFlashSaleProduct {
                    product_id: *product_id,
                    original_price: *original,
                    flash_price: *flash,
                    stock_limit: *stock,
                    max_per_customer: *cap,
                },
            )
            .await?;
        product_ids.push(product.id);
    }
    println!(
        "  Sale '{}' running with {} products",
        running.name,
        product_ids.len()
    );

    // Orders
    println!("Seeding orders...");
    let mut created = 0usize;
    let mut cancelled = 0usize;
    let mut purchases = 0usize;

    for seq in 0..order_count {
        let (customer_name, customer_phone) = CUSTOMERS[seq % CUSTOMERS.len()];
        // Roughly two thirds of orders referred, rotating identifiers,
        // including the slug form
        let referral = match seq % 3 {
            0 => Some("mai-shop".to_string()),
            1 => Some(CTVS[seq % CTVS.len()].0.to_string()),
            _ => None,
        };

        let total = 200_000 + (seq as i64 * 37_000) % 800_000;
        let order = db
            .orders()
            .create(
                NewOrder {
                    customer_name: customer_name.to_string(),
                    customer_phone: customer_phone.to_string(),
                    address: Some("Hà Nội".to_string()),
                    total_amount: total,
                    shipping_fee: 30_000,
                    referral,
                },
                now - (seq as i64 * 600),
            )
            .await?;
        created += 1;

        // Attach a flash purchase to every fourth order
        if seq % 4 == 0 {
            let product_id = product_ids[seq % product_ids.len()];
            let outcome = db
                .purchases()
                .record(
                    NewPurchase {
                        flash_sale_product_id: product_id,
                        order_id: order.id.clone(),
                        customer_phone: customer_phone.to_string(),
                        customer_name: customer_name.to_string(),
                        quantity: 1,
                    },
                    now - (seq as i64 * 600),
                )
                .await?;
            if matches!(outcome, PurchaseOutcome::Recorded(_)) {
                purchases += 1;
            }
        }

        // Cancel every seventh order (with its purchases)
        if seq % 7 == 6 {
            db.orders().cancel(&order.id, now).await?;
            if db.purchases().cancel(&order.id, now).await.is_ok() {
                purchases = purchases.saturating_sub(1);
            }
            cancelled += 1;
        }
    }

    println!(
        "  {} orders ({} cancelled), {} flash purchases",
        created, cancelled, purchases
    );

    // Settle the current month so the payments table has data
    let month = Utc::now().format("%Y-%m").to_string();
    let settlement = db.ctv().settle_month(&month).await?;
    println!(
        "  Settled {}: {} payment rows",
        month,
        settlement.created + settlement.updated
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
