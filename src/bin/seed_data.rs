//! Seed data script - resets the catalog to a demo data set
//!
//! Run with: cargo run --bin seed-data
//!
//! Clears orders, carts, wishlists, products and categories, then inserts the
//! demo categories and products. Several categories share a slug; products
//! are attached to the first category inserted with their slug.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tracing::info;
use uuid::Uuid;

use storefront_api::entities::{
    category, product, CartItem, Category, Order, OrderItem, Product, WishlistItem,
};

const CATEGORIES: &[(&str, &str)] = &[
    ("Mobiles & Tablets", "electronics"),
    ("Fashion", "fashion"),
    ("Electronics", "electronics"),
    ("TVs & Appliances", "home-furniture"),
    ("Home & Furniture", "home-furniture"),
    ("Beauty, Food & More", "beauty"),
    ("Grocery", "grocery"),
];

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    original_price: Decimal,
    discount_percent: i32,
    category: &'static str,
    stock: i32,
    rating: Decimal,
    review_count: i32,
    brand: &'static str,
    images: serde_json::Value,
    specifications: serde_json::Value,
}

fn products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Samsung Galaxy S23 Ultra",
            description: "Latest flagship smartphone with 200MP camera, 12GB RAM, 256GB storage",
            price: dec!(124999),
            original_price: dec!(139999),
            discount_percent: 11,
            category: "electronics",
            stock: 50,
            rating: dec!(4.5),
            review_count: 1234,
            brand: "Samsung",
            images: json!([
                "https://images.unsplash.com/photo-1610945265064-0e34e5519bbf?w=500",
                "https://images.unsplash.com/photo-1601784551446-20c9e07cdbdb?w=500"
            ]),
            specifications: json!({
                "display": "6.8 inch Dynamic AMOLED",
                "processor": "Snapdragon 8 Gen 2",
                "ram": "12GB",
                "storage": "256GB",
                "battery": "5000mAh"
            }),
        },
        SeedProduct {
            name: "Apple iPhone 15 Pro",
            description: "Titanium design, A17 Pro chip, Pro camera system",
            price: dec!(134900),
            original_price: dec!(149900),
            discount_percent: 10,
            category: "electronics",
            stock: 30,
            rating: dec!(4.7),
            review_count: 2345,
            brand: "Apple",
            images: json!([
                "https://images.unsplash.com/photo-1592750475338-74b7b21085ab?w=500"
            ]),
            specifications: json!({
                "display": "6.1 inch Super Retina XDR",
                "processor": "A17 Pro",
                "storage": "256GB"
            }),
        },
        SeedProduct {
            name: "Sony WH-1000XM5 Wireless Headphones",
            description: "Industry-leading noise cancellation with premium sound quality",
            price: dec!(29990),
            original_price: dec!(34990),
            discount_percent: 14,
            category: "electronics",
            stock: 100,
            rating: dec!(4.6),
            review_count: 567,
            brand: "Sony",
            images: json!([
                "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=500"
            ]),
            specifications: json!({
                "type": "Over-ear",
                "connectivity": "Bluetooth 5.2",
                "battery": "30 hours"
            }),
        },
        SeedProduct {
            name: "Nike Air Max 270",
            description: "Comfortable running shoes with Air Max cushioning",
            price: dec!(8999),
            original_price: dec!(10999),
            discount_percent: 18,
            category: "fashion",
            stock: 150,
            rating: dec!(4.4),
            review_count: 234,
            brand: "Nike",
            images: json!([
                "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=500"
            ]),
            specifications: json!({
                "material": "Mesh and Synthetic",
                "sole": "Rubber",
                "closure": "Lace-up"
            }),
        },
        SeedProduct {
            name: "Levi's 501 Original Jeans",
            description: "Classic straight-fit jeans, 100% cotton",
            price: dec!(3999),
            original_price: dec!(4999),
            discount_percent: 20,
            category: "fashion",
            stock: 200,
            rating: dec!(4.3),
            review_count: 456,
            brand: "Levi's",
            images: json!([
                "https://images.unsplash.com/photo-1542272604-787c3835535d?w=500"
            ]),
            specifications: json!({
                "material": "100% Cotton",
                "fit": "Straight",
                "sizes": "28-40"
            }),
        },
        SeedProduct {
            name: "IKEA MALM Bed Frame",
            description: "Modern bed frame with storage drawers, Queen size",
            price: dec!(24999),
            original_price: dec!(29999),
            discount_percent: 17,
            category: "home-furniture",
            stock: 40,
            rating: dec!(4.5),
            review_count: 234,
            brand: "IKEA",
            images: json!([
                "https://images.unsplash.com/photo-1505693416388-ac5ce068fe85?w=500"
            ]),
            specifications: json!({
                "material": "Particleboard",
                "size": "Queen (160x200 cm)"
            }),
        },
        SeedProduct {
            name: "Samsung 55-inch 4K Smart TV",
            description: "Crystal UHD 4K Smart TV with Tizen OS",
            price: dec!(54999),
            original_price: dec!(69999),
            discount_percent: 21,
            category: "home-furniture",
            stock: 60,
            rating: dec!(4.6),
            review_count: 567,
            brand: "Samsung",
            images: json!([
                "https://images.unsplash.com/photo-1593359677879-a4bb92f829d1?w=500"
            ]),
            specifications: json!({
                "screen_size": "55 inch",
                "resolution": "4K UHD (3840x2160)",
                "hdr": "HDR10+"
            }),
        },
        SeedProduct {
            name: "Atomic Habits",
            description: "An Easy & Proven Way to Build Good Habits & Break Bad Ones",
            price: dec!(399),
            original_price: dec!(499),
            discount_percent: 20,
            category: "books",
            stock: 400,
            rating: dec!(4.8),
            review_count: 2345,
            brand: "Penguin",
            images: json!([
                "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=500"
            ]),
            specifications: json!({
                "author": "James Clear",
                "pages": "320",
                "format": "Paperback"
            }),
        },
        SeedProduct {
            name: "L'Oreal Paris Revitalift Serum",
            description: "Anti-aging face serum with hyaluronic acid",
            price: dec!(899),
            original_price: dec!(1299),
            discount_percent: 31,
            category: "beauty",
            stock: 200,
            rating: dec!(4.3),
            review_count: 567,
            brand: "L'Oreal",
            images: json!([
                "https://images.unsplash.com/photo-1620916566398-39f1143ab7be?w=500"
            ]),
            specifications: json!({
                "volume": "30ml",
                "key_ingredient": "Hyaluronic Acid"
            }),
        },
        SeedProduct {
            name: "Maybelline New York Mascara",
            description: "Volumizing mascara for dramatic lashes",
            price: dec!(499),
            original_price: dec!(699),
            discount_percent: 29,
            category: "beauty",
            stock: 250,
            rating: dec!(4.5),
            review_count: 890,
            brand: "Maybelline",
            images: json!([
                "https://images.unsplash.com/photo-1631214540553-ff044a3ff1d4?w=500"
            ]),
            specifications: json!({
                "volume": "9.2ml",
                "color": "Black",
                "waterproof": "No"
            }),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Storefront Seed Data ===");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://storefront.db?mode=rwc".to_string());

    let mut options = ConnectOptions::new(database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(StdDuration::from_secs(10))
        .acquire_timeout(StdDuration::from_secs(10))
        .sqlx_logging(false);

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(options).await?;
    storefront_api::db::run_migrations(&db).await?;

    let txn = db.begin().await?;

    info!("Clearing existing data...");
    clear_tables(&txn).await?;

    info!("Inserting categories...");
    let slugs = create_categories(&txn).await?;
    info!("  Created {} categories", CATEGORIES.len());

    info!("Inserting products...");
    let count = create_products(&txn, &slugs).await?;
    info!("  Created {} products", count);

    txn.commit().await?;

    info!("Database seeded successfully!");
    Ok(())
}

async fn clear_tables(txn: &DatabaseTransaction) -> anyhow::Result<()> {
    OrderItem::delete_many().exec(txn).await?;
    Order::delete_many().exec(txn).await?;
    CartItem::delete_many().exec(txn).await?;
    WishlistItem::delete_many().exec(txn).await?;
    Product::delete_many().exec(txn).await?;
    Category::delete_many().exec(txn).await?;
    Ok(())
}

/// Inserts the categories and returns slug -> id of the first category with that slug
async fn create_categories(
    txn: &DatabaseTransaction,
) -> anyhow::Result<HashMap<&'static str, Uuid>> {
    let mut by_slug = HashMap::new();

    for (name, slug) in CATEGORIES {
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;

        by_slug.entry(*slug).or_insert(model.id);
    }

    Ok(by_slug)
}

async fn create_products(
    txn: &DatabaseTransaction,
    slugs: &HashMap<&'static str, Uuid>,
) -> anyhow::Result<usize> {
    let catalog = products();
    let now = Utc::now();

    for seed in &catalog {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(seed.name.to_string()),
            description: Set(Some(seed.description.to_string())),
            price: Set(seed.price),
            original_price: Set(Some(seed.original_price)),
            discount_percent: Set(seed.discount_percent),
            category_id: Set(slugs.get(seed.category).copied()),
            stock: Set(seed.stock),
            rating: Set(seed.rating),
            review_count: Set(seed.review_count),
            brand: Set(Some(seed.brand.to_string())),
            images: Set(seed.images.clone()),
            specifications: Set(seed.specifications.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;
    }

    Ok(catalog.len())
}
