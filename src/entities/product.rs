//! Product entity - Represents one stocked item in the store catalog.
//!
//! Each product carries a generated SKU, a sale price, an acquisition cost, the
//! current quantity on hand and the threshold at which it is flagged as low stock.
//! Quantity is never stored below zero; sales that oversell clamp it at zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stock-keeping code (e.g., `"RS107"`), assigned once at creation
    #[sea_orm(unique)]
    pub sku: String,
    /// Display name of the product (e.g., "Red Apples")
    pub name: String,
    /// Free-text grouping used for search and listings
    pub category: String,
    /// Sale price per unit
    pub price: f64,
    /// Acquisition cost per unit
    pub cost_price: f64,
    /// Units currently on hand
    pub quantity: i64,
    /// Quantity at or below which the product counts as low stock
    pub min_threshold: i64,
    /// When the product was last created, edited, sold or restocked
    pub last_updated: DateTimeUtc,
}

impl Model {
    /// Nothing left on hand.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }

    /// Some stock left, but at or below the configured threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity > 0 && self.quantity <= self.min_threshold
    }
}

/// Products have no foreign keys; ledger items copy the fields they need.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
