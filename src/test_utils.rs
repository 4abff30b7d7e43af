//! Shared test utilities for `StockBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and building products with sensible defaults.

use crate::{
    core::{
        catalog::{DEFAULT_CATEGORY, ProductDraft},
        sku::generate_sku,
    },
    entities::product,
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A product draft in the default category.
pub fn draft(
    name: &str,
    price: f64,
    cost_price: f64,
    quantity: i64,
    min_threshold: i64,
) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: None,
        price,
        cost_price,
        quantity,
        min_threshold,
    }
}

/// An unsaved product model, for tests that never touch the database.
///
/// # Defaults
/// * sku: generated from `name` with `id` as the sequence
/// * category: "General"
/// * `min_threshold`: 5
pub fn product_model(
    id: i64,
    name: &str,
    price: f64,
    cost_price: f64,
    quantity: i64,
) -> product::Model {
    product::Model {
        id,
        sku: generate_sku(name, id.unsigned_abs()),
        name: name.to_string(),
        category: DEFAULT_CATEGORY.to_string(),
        price,
        cost_price,
        quantity,
        min_threshold: 5,
        last_updated: Utc::now(),
    }
}

/// Inserts a product row with a fixed SKU, bypassing the SKU counter.
/// Use this to simulate rows that existed before the counter was seeded.
pub async fn insert_product_with_sku(
    db: &DatabaseConnection,
    name: &str,
    sku: &str,
) -> Result<product::Model> {
    let product = product::ActiveModel {
        sku: Set(sku.to_string()),
        name: Set(name.to_string()),
        category: Set(DEFAULT_CATEGORY.to_string()),
        price: Set(1.0),
        cost_price: Set(0.5),
        quantity: Set(10),
        min_threshold: Set(2),
        last_updated: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(product)
}
