//! # Seed Data Generator
//!
//! Populates the database with a demo phone-shop catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed every model (default)
//! cargo run -p lats-db --bin seed
//!
//! # Only the first 5 models
//! cargo run -p lats-db --bin seed -- --count 5
//!
//! # Specify database path
//! cargo run -p lats-db --bin seed -- --db ./data/lats.db
//! ```
//!
//! Each model gets one variant per storage/colour option:
//! - SKU: `{CODE}-{OPTION}`
//! - price: model base + option addon
//! - cost: 70-85% of price
//! - stock: 0 - 12

use std::collections::BTreeMap;
use std::env;

use chrono::Utc;
use lats_core::{Money, Product, ProductVariant};
use lats_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (category, code, name, base price)
const MODELS: &[(&str, &str, &str, i64)] = &[
    ("Phones", "IP13", "iPhone 13", 1_450_000),
    ("Phones", "IP14", "iPhone 14", 1_750_000),
    ("Phones", "SGA54", "Samsung Galaxy A54", 950_000),
    ("Phones", "SGS23", "Samsung Galaxy S23", 1_900_000),
    ("Phones", "TCS20", "Tecno Spark 20", 320_000),
    ("Phones", "INFH40", "Infinix Hot 40", 360_000),
    ("Phones", "RMN13", "Redmi Note 13", 520_000),
    ("Accessories", "USBC", "USB-C Cable", 8_000),
    ("Accessories", "CHG20", "20W Charger", 25_000),
    ("Accessories", "CASE", "Silicone Case", 15_000),
    ("Accessories", "SCRN", "Screen Protector", 10_000),
    ("Accessories", "EARB", "Wireless Earbuds", 65_000),
];

/// (option, attribute key, addon)
const PHONE_OPTIONS: &[(&str, &str, i64)] = &[
    ("128GB", "storage", 0),
    ("256GB", "storage", 150_000),
    ("512GB", "storage", 350_000),
];

const ACCESSORY_OPTIONS: &[(&str, &str, i64)] = &[
    ("Black", "colour", 0),
    ("White", "colour", 0),
    ("Blue", "colour", 1_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,lats_db=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = MODELS.len();
    let mut db_path = String::from("./lats_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(MODELS.len());
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
                println!("LATS POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of models to seed (default: all {})", MODELS.len());
                println!("  -d, --db <PATH>    Database file path (default: ./lats_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("LATS POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Models:   {}", count.min(MODELS.len()));
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products = 0;
    let mut variants = 0;
    for (seed, (category, code, name, base)) in MODELS.iter().take(count).enumerate() {
        let product = generate_product(category, code, name, *base, seed);
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        products += 1;
        variants += product.variants.len();
    }

    println!("✓ Seeded {} products ({} variants)", products, variants);

    let hits = db.products().search("iphone", 10).await?;
    println!("  Search 'iphone': {} results", hits.len());

    db.close().await;
    Ok(())
}

fn generate_product(category: &str, code: &str, name: &str, base: i64, seed: usize) -> Product {
    let now = Utc::now();
    let product_id = Uuid::new_v4().to_string();
    let options = if category == "Phones" {
        PHONE_OPTIONS
    } else {
        ACCESSORY_OPTIONS
    };

    let variants = options
        .iter()
        .enumerate()
        .map(|(idx, (option, key, addon))| {
            let price = base + addon;
            let cost_pct = 70 + ((seed + idx) % 16) as i64;
            let mut attributes = BTreeMap::new();
            attributes.insert(key.to_string(), option.to_string());

            ProductVariant {
                id: Uuid::new_v4().to_string(),
                product_id: product_id.clone(),
                sku: format!("{}-{}", code, option.to_uppercase()),
                name: option.to_string(),
                selling_price: Money::from_minor(price),
                cost_price: Money::from_minor(price * cost_pct / 100),
                quantity: ((seed * 7 + idx * 5) % 13) as i64,
                attributes,
            }
        })
        .collect();

    Product {
        id: product_id,
        name: name.to_string(),
        description: None,
        category: Some(category.to_string()),
        is_active: true,
        variants,
        created_at: now,
        updated_at: now,
    }
}
