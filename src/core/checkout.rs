//! Checkout processing - turns a cart into a SALE ledger entry.
//!
//! Stock decrements and the ledger append run inside one database transaction:
//! either every line is deducted and the sale is recorded, or nothing changes.
//! The cart is priced from its own snapshots and is cleared only after the
//! database transaction commits, so a failed checkout can simply be retried.

use crate::{
    core::{
        cart::{Cart, CartLine},
        catalog,
        ledger::{self, ItemSnapshot, LedgerEntry, TransactionKind},
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// A line that asked for more units than were on hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oversell {
    /// Product that was oversold
    pub product_id: i64,
    /// Its SKU
    pub sku: String,
    /// Units in the cart
    pub requested: i64,
    /// Units on hand before the sale
    pub available: i64,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// The recorded sale
    pub entry: LedgerEntry,
    /// Lines whose stock was clamped at zero
    pub oversold: Vec<Oversell>,
}

impl Receipt {
    /// Sale total.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.entry.transaction.total
    }

    /// Revenue minus cost for this sale.
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.entry.transaction.profit()
    }
}

/// Completes the sale of everything in `cart` on behalf of `user_name`.
///
/// Steps, in order: reject an empty cart, snapshot the lines, decrement stock for
/// every line (clamping at zero), append the SALE entry, commit, clear the cart.
///
/// # Errors
/// Returns [`Error::EmptyCart`] without touching anything when the cart is empty.
/// Returns [`Error::ProductNotFound`] when a line's product was deleted after it was
/// added; the whole checkout is rolled back and the cart is left as it was.
#[instrument(skip(db, cart), fields(lines = cart.len()))]
pub async fn complete_checkout(
    db: &DatabaseConnection,
    cart: &mut Cart,
    user_name: &str,
) -> Result<Receipt> {
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let snapshots: Vec<ItemSnapshot> = cart.lines().iter().map(CartLine::to_snapshot).collect();

    let txn = db.begin().await?;

    let mut oversold = Vec::new();
    for line in cart.lines() {
        let (previous, _) =
            catalog::decrement_stock_tracked(&txn, line.product_id, line.quantity).await?;
        if line.quantity > previous {
            oversold.push(Oversell {
                product_id: line.product_id,
                sku: line.sku.clone(),
                requested: line.quantity,
                available: previous,
            });
        }
    }

    let entry = ledger::append_transaction(&txn, TransactionKind::Sale, user_name, &snapshots).await?;

    txn.commit().await?;
    cart.clear();

    if !oversold.is_empty() {
        warn!(
            transaction = entry.transaction.id,
            count = oversold.len(),
            "Checkout oversold stock"
        );
    }
    info!(
        transaction = entry.transaction.id,
        total = entry.transaction.total,
        items = entry.items.len(),
        "Checkout complete"
    );

    Ok(Receipt { entry, oversold })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::catalog::{create_product, delete_product, get_product_by_id},
        entities::Transaction,
        test_utils::*,
    };
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_checkout_empty_cart_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let mut cart = Cart::new();

        let result = complete_checkout(&db, &mut cart, "Dana").await;
        assert!(matches!(result, Err(Error::EmptyCart)));
        assert!(Transaction::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_single_line_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_product(&db, draft("A", 100.0, 60.0, 10, 2)).await?;

        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&a);

        let receipt = complete_checkout(&db, &mut cart, "Dana").await?;

        assert_eq!(receipt.entry.transaction.total, 200.0);
        assert_eq!(receipt.entry.transaction.total_cost, 120.0);
        assert_eq!(receipt.profit(), 80.0);
        assert_eq!(receipt.entry.transaction.transaction_type, "SALE");
        assert_eq!(receipt.entry.items.len(), 1);
        assert!(receipt.oversold.is_empty());

        assert_eq!(get_product_by_id(&db, a.id).await?.unwrap().quantity, 8);
        assert_eq!(Transaction::find().all(&db).await?.len(), 1);
        assert!(cart.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_multiple_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let tea = create_product(&db, draft("Tea", 3.0, 1.0, 10, 2)).await?;
        let milk = create_product(&db, draft("Milk", 1.5, 0.5, 10, 2)).await?;

        let mut cart = Cart::new();
        cart.add(&tea);
        cart.add(&milk);
        cart.update_quantity(milk.id, 3)?;
        let expected_total = cart.total();

        let receipt = complete_checkout(&db, &mut cart, "Dana").await?;

        assert_eq!(receipt.total(), expected_total);
        assert_eq!(receipt.total(), 9.0);
        assert_eq!(receipt.entry.items.len(), 2);
        assert_eq!(get_product_by_id(&db, tea.id).await?.unwrap().quantity, 9);
        assert_eq!(get_product_by_id(&db, milk.id).await?.unwrap().quantity, 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_uses_cart_snapshot_price() -> Result<()> {
        let db = setup_test_db().await?;
        let tea = create_product(&db, draft("Tea", 3.0, 1.0, 10, 2)).await?;

        let mut cart = Cart::new();
        cart.add(&tea);

        catalog::update_product(
            &db,
            tea.id,
            catalog::ProductUpdate {
                price: Some(99.0),
                ..Default::default()
            },
        )
        .await?;

        let receipt = complete_checkout(&db, &mut cart, "Dana").await?;
        assert_eq!(receipt.total(), 3.0);
        assert_eq!(receipt.entry.items[0].price, 3.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_oversell_clamps_and_reports() -> Result<()> {
        let db = setup_test_db().await?;
        let tea = create_product(&db, draft("Tea", 3.0, 1.0, 1, 2)).await?;

        let mut cart = Cart::new();
        cart.add(&tea);
        cart.update_quantity(tea.id, 2)?;

        let receipt = complete_checkout(&db, &mut cart, "Dana").await?;

        assert_eq!(get_product_by_id(&db, tea.id).await?.unwrap().quantity, 0);
        assert_eq!(
            receipt.oversold,
            vec![Oversell {
                product_id: tea.id,
                sku: tea.sku.clone(),
                requested: 3,
                available: 1,
            }]
        );
        assert_eq!(receipt.total(), 9.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_rolls_back_when_product_deleted() -> Result<()> {
        let db = setup_test_db().await?;
        let tea = create_product(&db, draft("Tea", 3.0, 1.0, 10, 2)).await?;
        let gone = create_product(&db, draft("Gone", 1.0, 0.5, 10, 2)).await?;

        let mut cart = Cart::new();
        cart.add(&tea);
        cart.add(&gone);
        delete_product(&db, gone.id).await?;

        let result = complete_checkout(&db, &mut cart, "Dana").await;
        assert!(matches!(result, Err(Error::ProductNotFound { id }) if id == gone.id));

        // The first line's decrement was rolled back and the cart is intact.
        assert_eq!(get_product_by_id(&db, tea.id).await?.unwrap().quantity, 10);
        assert!(Transaction::find().all(&db).await?.is_empty());
        assert_eq!(cart.len(), 2);
        Ok(())
    }
}
