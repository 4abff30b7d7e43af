//! Transaction entity - One completed sale or restock in the ledger.
//!
//! A transaction stores its totals at the time it was written; the individual
//! lines live in `transaction_items`. Rows are written once and never updated.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored value of `transaction_type` for a checkout.
pub const SALE: &str = "SALE";
/// Stored value of `transaction_type` for a stock replenishment.
pub const RESTOCK: &str = "RESTOCK";

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Type of transaction: `"SALE"` or `"RESTOCK"`
    pub transaction_type: String,
    /// Sum of price x quantity over all items
    pub total: f64,
    /// Sum of cost price x quantity over all items
    pub total_cost: f64,
    /// Display name of the user who performed the transaction
    pub user_name: String,
    /// When the transaction was recorded
    pub timestamp: DateTimeUtc,
}

impl Model {
    /// Whether this row records a checkout.
    #[must_use]
    pub fn is_sale(&self) -> bool {
        self.transaction_type == SALE
    }

    /// Revenue minus cost for this transaction.
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.total - self.total_cost
    }
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One transaction has many item snapshots
    #[sea_orm(has_many = "super::transaction_item::Entity")]
    Items,
}

impl Related<super::transaction_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
