//! Ledger business logic - the append-only record of sales and restocks.
//!
//! Every entry is a `transactions` row plus one `transaction_items` row per line.
//! Items copy name, SKU, price and cost from the product at the moment the entry
//! is written, so later catalog edits never change historical figures. Nothing in
//! this module updates or deletes an entry once it has been appended.

use crate::{
    entities::{
        Transaction, TransactionItem, product, transaction,
        transaction::{RESTOCK, SALE},
        transaction_item,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::fmt;
use tracing::{debug, instrument};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Goods left the store through checkout
    Sale,
    /// Goods arrived and stock was increased
    Restock,
}

impl TransactionKind {
    /// Value stored in the `transaction_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => SALE,
            Self::Restock => RESTOCK,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of one product line, ready to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    /// Product the line was taken from
    pub product_id: i64,
    /// Product name at snapshot time
    pub name: String,
    /// Product SKU at snapshot time
    pub sku: String,
    /// Units in this line
    pub quantity: i64,
    /// Unit sale price at snapshot time
    pub price: f64,
    /// Unit cost at snapshot time
    pub cost_price: f64,
}

impl ItemSnapshot {
    /// Snapshot of `product` for `quantity` units.
    #[must_use]
    pub fn of_product(product: &product::Model, quantity: i64) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            quantity,
            price: product.price,
            cost_price: product.cost_price,
        }
    }

    /// `price x quantity`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// `cost_price x quantity`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_cost(&self) -> f64 {
        self.cost_price * self.quantity as f64
    }
}

/// A transaction together with its item rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The transaction header
    pub transaction: transaction::Model,
    /// Item snapshots, in insertion order
    pub items: Vec<transaction_item::Model>,
}

/// Appends one transaction and its items.
///
/// `total` and `total_cost` are computed from the snapshots. Pass an open database
/// transaction when the append must commit together with a stock change.
///
/// # Errors
/// Returns [`Error::EmptyTransaction`] when `items` is empty, or a database error.
#[instrument(skip(db, items), fields(items = items.len()))]
pub async fn append_transaction<C>(
    db: &C,
    kind: TransactionKind,
    user_name: &str,
    items: &[ItemSnapshot],
) -> Result<LedgerEntry>
where
    C: ConnectionTrait,
{
    if items.is_empty() {
        return Err(Error::EmptyTransaction);
    }

    let total: f64 = items.iter().map(ItemSnapshot::line_total).sum();
    let total_cost: f64 = items.iter().map(ItemSnapshot::line_cost).sum();

    let header = transaction::ActiveModel {
        transaction_type: Set(kind.as_str().to_string()),
        total: Set(total),
        total_cost: Set(total_cost),
        user_name: Set(user_name.to_string()),
        timestamp: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row = transaction_item::ActiveModel {
            transaction_id: Set(header.id),
            product_id: Set(item.product_id),
            name: Set(item.name.clone()),
            sku: Set(item.sku.clone()),
            quantity: Set(item.quantity),
            price: Set(item.price),
            cost_price: Set(item.cost_price),
            ..Default::default()
        }
        .insert(db)
        .await?;
        rows.push(row);
    }

    debug!(id = header.id, %kind, total, "Appended ledger entry");
    Ok(LedgerEntry {
        transaction: header,
        items: rows,
    })
}

/// Retrieves every transaction, newest first.
pub async fn get_all_transactions(db: &DatabaseConnection) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the most recent `limit` transactions of one kind, newest first.
pub async fn get_recent_transactions(
    db: &DatabaseConnection,
    kind: TransactionKind,
    limit: u64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::TransactionType.eq(kind.as_str()))
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the items belonging to any of `transaction_ids`.
pub async fn get_items_for_transactions(
    db: &DatabaseConnection,
    transaction_ids: &[i64],
) -> Result<Vec<transaction_item::Model>> {
    if transaction_ids.is_empty() {
        return Ok(Vec::new());
    }

    TransactionItem::find()
        .filter(transaction_item::Column::TransactionId.is_in(transaction_ids.iter().copied()))
        .order_by_asc(transaction_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn snapshot(product_id: i64, quantity: i64, price: f64, cost_price: f64) -> ItemSnapshot {
        ItemSnapshot {
            product_id,
            name: format!("Product {product_id}"),
            sku: format!("PT{product_id:03}"),
            quantity,
            price,
            cost_price,
        }
    }

    #[test]
    fn test_transaction_kind_round_trip_strings() {
        assert_eq!(TransactionKind::Sale.as_str(), "SALE");
        assert_eq!(TransactionKind::Restock.to_string(), "RESTOCK");
    }

    #[test]
    fn test_snapshot_line_totals() {
        let item = snapshot(1, 3, 2.5, 1.0);
        assert_eq!(item.line_total(), 7.5);
        assert_eq!(item.line_cost(), 3.0);
    }

    #[tokio::test]
    async fn test_append_transaction_computes_totals() -> Result<()> {
        let db = setup_test_db().await?;

        let entry = append_transaction(
            &db,
            TransactionKind::Sale,
            "Dana",
            &[snapshot(1, 2, 100.0, 60.0), snapshot(2, 1, 5.0, 2.0)],
        )
        .await?;

        assert_eq!(entry.transaction.total, 205.0);
        assert_eq!(entry.transaction.total_cost, 122.0);
        assert_eq!(entry.transaction.transaction_type, "SALE");
        assert_eq!(entry.transaction.user_name, "Dana");
        assert!(entry.transaction.is_sale());
        assert_eq!(entry.items.len(), 2);
        assert!(
            entry
                .items
                .iter()
                .all(|item| item.transaction_id == entry.transaction.id)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_append_empty_transaction_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let result = append_transaction(&db, TransactionKind::Sale, "Dana", &[]).await;
        assert!(matches!(result, Err(Error::EmptyTransaction)));

        assert!(get_all_transactions(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_items_for_transactions() -> Result<()> {
        let db = setup_test_db().await?;
        let written = append_transaction(
            &db,
            TransactionKind::Restock,
            "Admin",
            &[snapshot(7, 10, 3.0, 1.5)],
        )
        .await?;

        let items = get_items_for_transactions(&db, &[written.transaction.id]).await?;
        assert_eq!(items, written.items);

        assert!(get_items_for_transactions(&db, &[999]).await?.is_empty());
        assert!(get_items_for_transactions(&db, &[]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_transactions_filters_kind_and_orders_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let first = append_transaction(&db, TransactionKind::Sale, "a", &[snapshot(1, 1, 1.0, 0.5)])
            .await?;
        append_transaction(&db, TransactionKind::Restock, "a", &[snapshot(1, 5, 1.0, 0.5)])
            .await?;
        let third = append_transaction(&db, TransactionKind::Sale, "a", &[snapshot(1, 2, 1.0, 0.5)])
            .await?;

        let sales = get_recent_transactions(&db, TransactionKind::Sale, 10).await?;
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].id, third.transaction.id);
        assert_eq!(sales[1].id, first.transaction.id);

        let limited = get_recent_transactions(&db, TransactionKind::Sale, 1).await?;
        assert_eq!(limited.len(), 1);

        assert_eq!(get_all_transactions(&db).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_items_for_transactions() -> Result<()> {
        let db = setup_test_db().await?;
        let a = append_transaction(&db, TransactionKind::Sale, "a", &[snapshot(1, 1, 1.0, 0.5)])
            .await?;
        let b = append_transaction(
            &db,
            TransactionKind::Sale,
            "a",
            &[snapshot(2, 1, 1.0, 0.5), snapshot(3, 1, 1.0, 0.5)],
        )
        .await?;

        let items = get_items_for_transactions(&db, &[a.transaction.id, b.transaction.id]).await?;
        assert_eq!(items.len(), 3);

        assert!(get_items_for_transactions(&db, &[]).await?.is_empty());
        Ok(())
    }
}
