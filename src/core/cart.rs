//! Shopping cart - an in-memory multiset of product lines for one session.
//!
//! Lines hold a snapshot of the product taken when it was first added; checkout
//! prices the sale from that snapshot rather than re-reading the catalog. Totals
//! are recomputed on every read. The cart is never persisted.

use crate::{
    core::ledger::ItemSnapshot,
    entities::product,
    errors::{Error, Result},
};

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Product the line refers to
    pub product_id: i64,
    /// SKU when added
    pub sku: String,
    /// Name when added
    pub name: String,
    /// Unit price when added
    pub price: f64,
    /// Unit cost when added
    pub cost_price: f64,
    /// Units to purchase, always at least 1
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &product::Model) -> Self {
        Self {
            product_id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            price: product.price,
            cost_price: product.cost_price,
            quantity: 1,
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

    /// Ledger snapshot of this line.
    #[must_use]
    pub fn to_snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            product_id: self.product_id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            quantity: self.quantity,
            price: self.price,
            cost_price: self.cost_price,
        }
    }
}

/// Cart owned by a single session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Adds one unit of `product`: bumps the existing line or appends a new line at 1.
    pub fn add(&mut self, product: &product::Model) -> &CartLine {
        let index = if let Some(index) = self.position(product.id) {
            self.lines[index].quantity = self.lines[index].quantity.saturating_add(1);
            index
        } else {
            self.lines.push(CartLine::from_product(product));
            self.lines.len() - 1
        };
        &self.lines[index]
    }

    /// Adjusts a line's quantity by `delta`, never going below 1.
    ///
    /// Use [`Cart::remove`] to drop a line.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: i64, delta: i64) -> Result<&CartLine> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or(Error::ProductNotFound { id: product_id })?;
        line.quantity = line.quantity.saturating_add(delta).max(1);
        Ok(&*line)
    }

    /// Removes a line outright.
    ///
    /// # Errors
    /// Returns [`Error::ProductNotFound`] if the product is not in the cart.
    pub fn remove(&mut self, product_id: i64) -> Result<CartLine> {
        let index = self
            .position(product_id)
            .ok_or(Error::ProductNotFound { id: product_id })?;
        Ok(self.lines.remove(index))
    }

    /// Drops the line for a product that left the catalog. Returns whether one was present.
    pub fn purge_product(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Sum of `price x quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of `cost_price x quantity` over all lines.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(CartLine::line_cost).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn position(&self, product_id: i64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }
}
