//! Catalog business logic - the source of truth for products and stock levels.
//!
//! This module creates, edits, looks up and deletes products, and applies stock
//! changes. Stock decrements clamp at zero: overselling is allowed and simply
//! leaves the product out of stock. Creation allocates a SKU from the persisted
//! counter inside the same database transaction as the insert.
//!
//! Deleting a product does not reach into carts; callers holding sessions must
//! purge the product from every cart afterwards (see
//! [`SessionStore::purge_product`](crate::core::session::SessionStore::purge_product)).

use crate::{
    core::{
        ledger::{self, ItemSnapshot, LedgerEntry, TransactionKind},
        sku,
    },
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::cmp::Ordering;
use tracing::{info, instrument, warn};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Fields for a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    /// Display name
    pub name: String,
    /// Category, defaults to [`DEFAULT_CATEGORY`]
    pub category: Option<String>,
    /// Sale price per unit
    pub price: f64,
    /// Acquisition cost per unit
    pub cost_price: f64,
    /// Opening stock
    pub quantity: i64,
    /// Low-stock threshold
    pub min_threshold: i64,
}

/// Partial edit of an existing product; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New sale price
    pub price: Option<f64>,
    /// New acquisition cost
    pub cost_price: Option<f64>,
    /// New stock count
    pub quantity: Option<i64>,
    /// New low-stock threshold
    pub min_threshold: Option<i64>,
}

impl From<ProductDraft> for ProductUpdate {
    fn from(draft: ProductDraft) -> Self {
        Self {
            name: Some(draft.name),
            category: draft.category,
            price: Some(draft.price),
            cost_price: Some(draft.cost_price),
            quantity: Some(draft.quantity),
            min_threshold: Some(draft.min_threshold),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_money(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

const fn validate_count(quantity: i64) -> Result<()> {
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

fn normalize_category(category: Option<&str>) -> String {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

/// Retrieves all products, ordered alphabetically by name.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by id, or `None` if it does not exist.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by SKU, ignoring case and surrounding whitespace.
pub async fn get_product_by_sku(
    db: &DatabaseConnection,
    sku: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Sku.eq(sku.trim().to_ascii_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_product_by_sku`] but a miss is an error.
///
/// # Errors
/// Returns [`Error::SkuNotFound`] when no product carries `sku`.
pub async fn require_product_by_sku(
    db: &DatabaseConnection,
    sku: &str,
) -> Result<product::Model> {
    get_product_by_sku(db, sku)
        .await?
        .ok_or_else(|| Error::SkuNotFound {
            sku: sku.trim().to_string(),
        })
}

/// Creates a product and assigns its SKU.
///
/// The SKU counter bump and the insert commit together.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - Price or cost is negative or not finite
/// - Quantity or threshold is negative
/// - A database operation fails
#[instrument(skip(db))]
pub async fn create_product(
    db: &DatabaseConnection,
    draft: ProductDraft,
) -> Result<product::Model> {
    validate_name(&draft.name)?;
    validate_money(draft.price)?;
    validate_money(draft.cost_price)?;
    validate_count(draft.quantity)?;
    validate_count(draft.min_threshold)?;

    let txn = db.begin().await?;

    let name = draft.name.trim().to_string();
    let sequence = sku::next_sku_sequence(&txn).await?;
    let sku = sku::generate_sku(&name, sequence);

    let product = product::ActiveModel {
        sku: Set(sku),
        name: Set(name),
        category: Set(normalize_category(draft.category.as_deref())),
        price: Set(draft.price),
        cost_price: Set(draft.cost_price),
        quantity: Set(draft.quantity),
        min_threshold: Set(draft.min_threshold),
        last_updated: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(id = product.id, sku = %product.sku, "Created product");
    Ok(product)
}

/// Applies a partial edit. The SKU never changes.
///
/// # Errors
/// Returns an error if:
/// - Any provided field fails the same validation as [`create_product`]
/// - The product does not exist
/// - The database update fails
#[instrument(skip(db))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: ProductUpdate,
) -> Result<product::Model> {
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(price) = update.price {
        validate_money(price)?;
    }
    if let Some(cost_price) = update.cost_price {
        validate_money(cost_price)?;
    }
    if let Some(quantity) = update.quantity {
        validate_count(quantity)?;
    }
    if let Some(min_threshold) = update.min_threshold {
        validate_count(min_threshold)?;
    }

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(name) = update.name {
        product.name = Set(name.trim().to_string());
    }
    if let Some(category) = update.category {
        product.category = Set(normalize_category(Some(&category)));
    }
    if let Some(price) = update.price {
        product.price = Set(price);
    }
    if let Some(cost_price) = update.cost_price {
        product.cost_price = Set(cost_price);
    }
    if let Some(quantity) = update.quantity {
        product.quantity = Set(quantity);
    }
    if let Some(min_threshold) = update.min_threshold {
        product.min_threshold = Set(min_threshold);
    }
    product.last_updated = Set(Utc::now());

    let product = product.update(db).await?;
    info!(id = product.id, sku = %product.sku, "Updated product");
    Ok(product)
}

/// Creates the product when `product_id` is `None`, otherwise replaces the fields
/// of the existing product with those in `draft`.
///
/// # Errors
/// Same as [`create_product`] and [`update_product`].
pub async fn upsert_product(
    db: &DatabaseConnection,
    product_id: Option<i64>,
    draft: ProductDraft,
) -> Result<product::Model> {
    match product_id {
        Some(id) => update_product(db, id, draft.into()).await,
        None => create_product(db, draft).await,
    }
}

/// Removes `amount` units, clamping the stock at zero.
///
/// Returns the updated product. Overselling is not an error.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for a negative amount and
/// [`Error::ProductNotFound`] when the id does not resolve.
pub async fn decrement_stock<C>(db: &C, product_id: i64, amount: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let (_, product) = decrement_stock_tracked(db, product_id, amount).await?;
    Ok(product)
}

/// [`decrement_stock`] that also reports the quantity on hand before the change.
pub(crate) async fn decrement_stock_tracked<C>(
    db: &C,
    product_id: i64,
    amount: i64,
) -> Result<(i64, product::Model)>
where
    C: ConnectionTrait,
{
    validate_count(amount)?;

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let previous = product.quantity;
    let remaining = previous.saturating_sub(amount).max(0);
    if amount > previous {
        warn!(
            id = product_id,
            sku = %product.sku,
            on_hand = previous,
            requested = amount,
            "Oversold product, clamping stock at zero"
        );
    }

    let mut active_model: product::ActiveModel = product.into();
    active_model.quantity = Set(remaining);
    active_model.last_updated = Set(Utc::now());
    let updated = active_model.update(db).await?;

    Ok((previous, updated))
}

/// Adds `amount` units and records a RESTOCK ledger entry, atomically.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] unless `amount` is positive,
/// [`Error::ProductNotFound`] for an unknown id, or a database error.
#[instrument(skip(db))]
pub async fn restock_product(
    db: &DatabaseConnection,
    product_id: i64,
    amount: i64,
    user_name: &str,
) -> Result<(product::Model, LedgerEntry)> {
    if amount <= 0 {
        return Err(Error::InvalidQuantity { quantity: amount });
    }

    let txn = db.begin().await?;

    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let snapshot = ItemSnapshot::of_product(&product, amount);
    let new_quantity = product.quantity.max(0).saturating_add(amount);

    let mut active_model: product::ActiveModel = product.into();
    active_model.quantity = Set(new_quantity);
    active_model.last_updated = Set(Utc::now());
    let updated = active_model.update(&txn).await?;

    let entry =
        ledger::append_transaction(&txn, TransactionKind::Restock, user_name, &[snapshot]).await?;

    txn.commit().await?;

    info!(id = product_id, amount, quantity = new_quantity, "Restocked product");
    Ok((updated, entry))
}

/// Deletes a product and returns the removed row.
///
/// Ledger items that reference the product keep their snapshots.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] for an unknown id, or a database error.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    product.clone().delete(db).await?;

    info!(id = product.id, sku = %product.sku, "Deleted product");
    Ok(product)
}

/// Products with some stock left but at or below their threshold.
pub async fn get_low_stock_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Ok(get_all_products(db)
        .await?
        .into_iter()
        .filter(product::Model::is_low_stock)
        .collect())
}

/// Products with nothing on hand.
pub async fn get_out_of_stock_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Ok(get_all_products(db)
        .await?
        .into_iter()
        .filter(product::Model::is_out_of_stock)
        .collect())
}

/// How closely a product matched a search query; lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Query equals the SKU
    ExactSku,
    /// Name or SKU starts with the query
    Prefix,
    /// Query appears inside the name, SKU or category
    Substring,
    /// Query characters appear in order within the name
    Subsequence,
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut haystack = haystack.chars();
    needle
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| haystack.any(|h| h == c))
}

/// Ranks `product` against `query`, or `None` when it does not match at all.
///
/// Matching ignores case. An empty query matches everything as a substring.
#[must_use]
pub fn rank_match(product: &product::Model, query: &str) -> Option<MatchRank> {
    let query = query.trim().to_lowercase();
    let name = product.name.to_lowercase();
    let sku = product.sku.to_lowercase();
    let category = product.category.to_lowercase();

    if query.is_empty() {
        Some(MatchRank::Substring)
    } else if sku == query {
        Some(MatchRank::ExactSku)
    } else if name.starts_with(&query) || sku.starts_with(&query) {
        Some(MatchRank::Prefix)
    } else if name.contains(&query) || sku.contains(&query) || category.contains(&query) {
        Some(MatchRank::Substring)
    } else if is_subsequence(&query, &name) {
        Some(MatchRank::Subsequence)
    } else {
        None
    }
}

/// Orders `products` by match quality for `query`, dropping non-matches.
/// Ties are broken alphabetically by name.
#[must_use]
pub fn filter_and_rank(products: Vec<product::Model>, query: &str) -> Vec<product::Model> {
    let mut ranked: Vec<(MatchRank, product::Model)> = products
        .into_iter()
        .filter_map(|p| rank_match(&p, query).map(|rank| (rank, p)))
        .collect();

    ranked.sort_by(|(rank_a, a), (rank_b, b)| match rank_a.cmp(rank_b) {
        Ordering::Equal => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        other => other,
    });

    ranked.into_iter().map(|(_, p)| p).collect()
}

/// Fuzzy search over name, SKU and category.
pub async fn search_products(db: &DatabaseConnection, query: &str) -> Result<Vec<product::Model>> {
    Ok(filter_and_rank(get_all_products(db).await?, query))
}
