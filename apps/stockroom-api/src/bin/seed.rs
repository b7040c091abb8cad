//! # Seed Data Generator
//!
//! Populates a database with a demo user, categories and stocked products.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom.db (or $DATABASE_PATH)
//! cargo run -p stockroom-api --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-api --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Stock is never written directly: every product is created at zero and
//! then brought up with one IN transaction per category, initiated by the
//! demo user, exactly as a client would.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use stockroom_api::{init_tracing, ApiConfig, AppState, Services};
use stockroom_core::{CategoryRequest, CreateTransactionRequest, ProductRequest, RegisterRequest};

const DEMO_EMAIL: &str = "demo@stockroom.local";
const DEMO_PASSWORD: &str = "stockroom-demo";

/// Categories and their products.
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Beverages",
        "Soft drinks, water and juice",
        &["Cola 330ml", "Mineral Water 600ml", "Orange Juice 1L", "Iced Tea 500ml"],
    ),
    (
        "Snacks",
        "Chips, biscuits and candy",
        &["Potato Chips", "Cassava Crackers", "Chocolate Wafer", "Peanut Brittle"],
    ),
    (
        "Pantry",
        "Dry goods and staples",
        &["Rice 5kg", "Sugar 1kg", "Cooking Oil 2L", "Instant Noodles"],
    ),
    (
        "Household",
        "Cleaning and laundry",
        &["Dish Soap", "Laundry Powder 1kg", "Floor Cleaner", "Sponges 3-Pack"],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut config = ApiConfig::load().context("loading configuration")?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--db needs a path");
                };
                config.database_path = PathBuf::from(path);
                i += 1;
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./stockroom.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let state = AppState::connect(config).await.context("opening database")?;
    let services = Services::new(state);

    let existing = services.state().db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let user_id = services
        .auth()
        .register(&RegisterRequest {
            first_name: "Demo".to_string(),
            last_name: "Clerk".to_string(),
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            date_of_birth: "1990-01-01".to_string(),
            gender: "L".to_string(),
        })
        .await
        .context("registering demo user")?;
    println!("Demo user: {} / {}", DEMO_EMAIL, DEMO_PASSWORD);

    let mut products = 0usize;
    let mut units = 0i64;

    for (category_idx, (name, description, items)) in CATALOG.iter().enumerate() {
        let category = services
            .categories()
            .create(&CategoryRequest {
                name: name.to_string(),
                description: description.to_string(),
            })
            .await
            .with_context(|| format!("creating category {name}"))?;

        let mut restock = Vec::with_capacity(items.len());
        for (item_idx, item) in items.iter().enumerate() {
            let product = services
                .products()
                .create(&ProductRequest {
                    name: item.to_string(),
                    description: format!("{} ({})", item, name),
                    image_url: format!("https://img.stockroom.local/{}/{}.png", category.id, item_idx),
                    category_id: category.id,
                })
                .await
                .with_context(|| format!("creating product {item}"))?;

            let quantity = 12 + (category_idx as i64 * 7 + item_idx as i64 * 5) % 40;
            restock.push((product.id, quantity));
            units += quantity;
            products += 1;
        }

        let header_id = services
            .transactions()
            .create(user_id, &CreateTransactionRequest::inbound(restock))
            .await
            .with_context(|| format!("stocking category {name}"))?;

        println!("  {:<10} {} products, restock #{}", name, items.len(), header_id);
    }

    println!();
    println!("Seed complete: {} products, {} units in stock", products, units);

    services.state().db.close().await;
    Ok(())
}
