//! Transaction item entity - A point-in-time copy of one product line.
//!
//! Items reference the product by id but copy its name, SKU, price and cost so
//! that historical reports do not change when the catalog is edited later.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_items")]
pub struct Model {
    /// Unique identifier for the item row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning transaction
    pub transaction_id: i64,
    /// Product this line was taken from (not enforced; the product may be deleted later)
    pub product_id: i64,
    /// Product name at the time of the transaction
    pub name: String,
    /// Product SKU at the time of the transaction
    pub sku: String,
    /// Units sold or restocked
    pub quantity: i64,
    /// Unit sale price at the time of the transaction
    pub price: f64,
    /// Unit cost price at the time of the transaction
    pub cost_price: f64,
}

/// Defines relationships between `TransactionItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one transaction
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "Cascade"
    )]
    Transaction,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
