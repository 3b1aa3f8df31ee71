//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p vega-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p vega-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p vega-db --bin seed -- --db ./data/vega.db
//! ```
//!
//! Each product gets a unique EAN-13-shaped barcode (no valid checksum),
//! a price between 0.99 and 9.99, and a stock level between 0 and 100 so
//! out-of-stock paths can be exercised from a fresh database.

use std::env;
use vega_db::{Database, DbConfig};

/// Base product names for demo data, by category.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Cola", "Diet Cola", "Orange Soda", "Lemonade", "Iced Tea",
            "Still Water", "Sparkling Water", "Apple Juice", "Energy Drink",
            "Cold Brew Coffee",
        ],
    ),
    (
        "Snacks",
        &[
            "Salted Chips", "Paprika Chips", "Pretzels", "Chocolate Bar",
            "Gummy Bears", "Trail Mix", "Granola Bar", "Cookies", "Crackers",
            "Popcorn",
        ],
    ),
    (
        "Dairy",
        &[
            "Whole Milk", "Skim Milk", "Oat Milk", "Butter", "Cheddar",
            "Mozzarella", "Greek Yogurt", "Cream Cheese", "Eggs Dozen",
            "Sour Cream",
        ],
    ),
    (
        "Grocery",
        &[
            "White Bread", "Wheat Bread", "Spaghetti", "Penne", "White Rice",
            "Canned Beans", "Canned Corn", "Tomato Sauce", "Peanut Butter",
            "Honey",
        ],
    ),
];

/// Size variants with price addons in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 50),
    ("Large", 120),
    ("330ml", 0),
    ("500ml", 40),
    ("1L", 90),
    ("6-Pack", 280),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./vega_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vega POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./vega_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vega POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (_, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + name_idx * 20 + size_idx;
                let full_name = format!("{name} {size}");
                let barcode = format!("590{seed:010}");
                let price_cents = 99 + ((seed * 17) % 900) as i64 + addon;
                let cost_cents = price_cents * (60 + (seed % 20) as i64) / 100;
                let stock = (seed % 101) as i64;

                if let Err(e) = db
                    .products()
                    .insert(&full_name, Some(&barcode), price_cents, Some(cost_cents), stock)
                    .await
                {
                    eprintln!("Failed to insert {full_name}: {e}");
                    continue;
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Quick sanity lookup against the barcode index
    let probe = db.products().find_by_barcode("5900000000000").await?;
    println!(
        "  Probe lookup 5900000000000: {}",
        probe.map_or_else(|| "miss".to_string(), |p| p.name)
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
