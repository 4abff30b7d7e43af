//! Report generation business logic.
//!
//! Pure computations over already-loaded catalog and ledger rows: inventory
//! valuation, stock alert counts, date-windowed revenue and margin, and best
//! sellers. Nothing here touches the database; callers load the rows and
//! recompute whenever either side changes.

use crate::entities::{product, transaction, transaction_item};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

/// Catalog-wide stock and valuation figures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryStats {
    /// Number of products in the catalog
    pub product_count: usize,
    /// Units on hand across all products
    pub total_units: i64,
    /// Sum of `price x quantity`
    pub total_value: f64,
    /// Sum of `cost_price x quantity`
    pub total_cost_value: f64,
    /// Products with `0 < quantity <= min_threshold`
    pub low_stock_count: usize,
    /// Products with `quantity <= 0`
    pub out_of_stock_count: usize,
}

impl InventoryStats {
    /// Computes the figures over `products`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_products(products: &[product::Model]) -> Self {
        products.iter().fold(
            Self {
                product_count: products.len(),
                ..Self::default()
            },
            |mut stats, p| {
                let units = p.quantity.max(0);
                stats.total_units = stats.total_units.saturating_add(units);
                stats.total_value += p.price * units as f64;
                stats.total_cost_value += p.cost_price * units as f64;
                if p.is_low_stock() {
                    stats.low_stock_count += 1;
                }
                if p.is_out_of_stock() {
                    stats.out_of_stock_count += 1;
                }
                stats
            },
        )
    }

    /// Potential profit if everything on hand sold at list price.
    #[must_use]
    pub fn potential_profit(&self) -> f64 {
        self.total_value - self.total_cost_value
    }
}

/// Stock level classification for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// Above the threshold
    InStock,
    /// Above zero but at or below the threshold
    LowStock,
    /// Nothing on hand
    OutOfStock,
}

impl StockStatus {
    /// Classifies `product`. Zero stock is out of stock even when the threshold is zero.
    #[must_use]
    pub const fn of(product: &product::Model) -> Self {
        if product.is_out_of_stock() {
            Self::OutOfStock
        } else if product.is_low_stock() {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Short label for listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::LowStock => "Low stock",
            Self::OutOfStock => "Out of stock",
        }
    }
}

/// Reporting window for revenue figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// Since midnight UTC of the current day
    Today,
    /// The last 7 x 24 hours
    Last7Days,
    /// The last 30 x 24 hours
    Last30Days,
    /// Everything ever recorded
    #[default]
    All,
}

impl DateRange {
    /// Earliest timestamp included in the window, or `None` for [`DateRange::All`].
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            Self::Last7Days => Some(now - TimeDelta::days(7)),
            Self::Last30Days => Some(now - TimeDelta::days(30)),
            Self::All => None,
        }
    }

    /// Human-readable window name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::All => "All time",
        }
    }

    /// Whether `timestamp` falls inside the window ending at `now`. The cutoff itself is included.
    #[must_use]
    pub fn contains(self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.cutoff(now).is_none_or(|cutoff| timestamp >= cutoff)
    }
}

/// Keeps the transactions whose timestamp is inside `range` as of `now`.
#[must_use]
pub fn filter_transactions(
    transactions: &[transaction::Model],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<transaction::Model> {
    transactions
        .iter()
        .filter(|t| range.contains(t.timestamp, now))
        .cloned()
        .collect()
}

/// Margin as a percentage of revenue; 0 when there is no revenue.
#[must_use]
pub fn calculate_margin(revenue: f64, cost: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }

    (revenue - cost) / revenue * 100.0
}

/// Revenue figures over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceSummary {
    /// Sum of SALE totals
    pub revenue: f64,
    /// Sum of SALE costs
    pub cost: f64,
    /// `revenue - cost`
    pub profit: f64,
    /// `profit / revenue x 100`, 0 without revenue
    pub margin: f64,
    /// Number of SALE transactions
    pub sale_count: usize,
    /// `revenue / sale_count`, 0 without sales
    pub average_sale: f64,
    /// Sum of RESTOCK costs
    pub restock_spend: f64,
}

impl FinanceSummary {
    /// Summarises `transactions`. Only SALE rows count toward revenue; RESTOCK rows
    /// count toward `restock_spend`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_transactions(transactions: &[transaction::Model]) -> Self {
        let mut summary = Self::default();
        for t in transactions {
            if t.is_sale() {
                summary.revenue += t.total;
                summary.cost += t.total_cost;
                summary.sale_count += 1;
            } else {
                summary.restock_spend += t.total_cost;
            }
        }

        summary.profit = summary.revenue - summary.cost;
        summary.margin = calculate_margin(summary.revenue, summary.cost);
        if summary.sale_count > 0 {
            summary.average_sale = summary.revenue / summary.sale_count as f64;
        }
        summary
    }

    /// Summarises only the transactions inside `range` as of `now`.
    #[must_use]
    pub fn for_range(
        transactions: &[transaction::Model],
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Self {
        Self::from_transactions(&filter_transactions(transactions, range, now))
    }
}

/// Revenue summary of today's sales, the figure shown on the register.
#[must_use]
pub fn today_sales(transactions: &[transaction::Model], now: DateTime<Utc>) -> FinanceSummary {
    FinanceSummary::for_range(transactions, DateRange::Today, now)
}

/// Units and revenue for one product across a set of sale items.
#[derive(Debug, Clone, PartialEq)]
pub struct TopSeller {
    /// Product id the items refer to
    pub product_id: i64,
    /// Most recent name seen in the items
    pub name: String,
    /// Most recent SKU seen in the items
    pub sku: String,
    /// Units sold
    pub units: i64,
    /// Revenue from those units
    pub revenue: f64,
}

/// Aggregates sale items by product and returns the `limit` best by units sold.
///
/// Pass only items that belong to SALE transactions. Ties are broken by revenue, then name.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn top_sellers(items: &[transaction_item::Model], limit: usize) -> Vec<TopSeller> {
    let mut by_product: HashMap<i64, TopSeller> = HashMap::new();
    for item in items {
        let entry = by_product
            .entry(item.product_id)
            .or_insert_with(|| TopSeller {
                product_id: item.product_id,
                name: item.name.clone(),
                sku: item.sku.clone(),
                units: 0,
                revenue: 0.0,
            });
        entry.units = entry.units.saturating_add(item.quantity);
        entry.revenue += item.price * item.quantity as f64;
        entry.name.clone_from(&item.name);
        entry.sku.clone_from(&item.sku);
    }

    let mut ranked: Vec<TopSeller> = by_product.into_values().collect();
    ranked.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then_with(|| b.revenue.total_cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Formats an amount with the store's currency symbol, e.g. `"$12.50"` or `"-$3.00"`.
#[must_use]
pub fn format_currency(symbol: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{symbol}{:.2}", amount.abs())
    } else {
        format!("{symbol}{amount:.2}")
    }
}

/// Formats a margin percentage, e.g. `"40.0%"`.
#[must_use]
pub fn format_margin(margin: f64) -> String {
    format!("{margin:.1}%")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::product_model;
    use chrono::TimeZone;

    fn sale(id: i64, total: f64, total_cost: f64, timestamp: DateTime<Utc>) -> transaction::Model {
        transaction::Model {
            id,
            transaction_type: transaction::SALE.to_string(),
            total,
            total_cost,
            user_name: "Dana".to_string(),
            timestamp,
        }
    }

    fn item(product_id: i64, name: &str, quantity: i64, price: f64) -> transaction_item::Model {
        transaction_item::Model {
            id: 0,
            transaction_id: 1,
            product_id,
            name: name.to_string(),
            sku: format!("SK{product_id:03}"),
            quantity,
            price,
            cost_price: price / 2.0,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn test_inventory_stats() {
        let mut plenty = product_model(1, "Plenty", 2.0, 1.0, 10);
        plenty.min_threshold = 3;
        let mut boundary = product_model(2, "Boundary", 5.0, 4.0, 3);
        boundary.min_threshold = 3;
        let mut empty = product_model(3, "Empty", 9.0, 1.0, 0);
        empty.min_threshold = 0;

        let stats = InventoryStats::from_products(&[plenty, boundary, empty]);

        assert_eq!(stats.product_count, 3);
        assert_eq!(stats.total_units, 13);
        assert_eq!(stats.total_value, 35.0);
        assert_eq!(stats.total_cost_value, 22.0);
        assert_eq!(stats.potential_profit(), 13.0);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.out_of_stock_count, 1);
    }

    #[test]
    fn test_inventory_units_saturate() {
        let huge = product_model(1, "Huge", 0.0, 0.0, i64::MAX);
        let more = product_model(2, "More", 0.0, 0.0, 7);

        let stats = InventoryStats::from_products(&[huge, more]);
        assert_eq!(stats.total_units, i64::MAX);
    }

    #[test]
    fn test_stock_status_boundaries() {
        let mut at_threshold = product_model(1, "A", 1.0, 1.0, 5);
        at_threshold.min_threshold = 5;
        assert_eq!(StockStatus::of(&at_threshold), StockStatus::LowStock);

        let mut zero_with_zero_threshold = product_model(2, "B", 1.0, 1.0, 0);
        zero_with_zero_threshold.min_threshold = 0;
        assert_eq!(
            StockStatus::of(&zero_with_zero_threshold),
            StockStatus::OutOfStock
        );

        let mut above = product_model(3, "C", 1.0, 1.0, 6);
        above.min_threshold = 5;
        assert_eq!(StockStatus::of(&above), StockStatus::InStock);
        assert_eq!(StockStatus::of(&above).label(), "In stock");
    }

    #[test]
    fn test_margin_zero_revenue() {
        assert_eq!(calculate_margin(0.0, 0.0), 0.0);
        assert_eq!(calculate_margin(0.0, 15.0), 0.0);
        assert_eq!(calculate_margin(200.0, 120.0), 40.0);
    }

    #[test]
    fn test_date_range_cutoffs() {
        let now = at(15, 30);
        assert_eq!(DateRange::Today.cutoff(now), Some(at(0, 0)));
        assert_eq!(
            DateRange::Last7Days.cutoff(now),
            Some(now - TimeDelta::days(7))
        );
        assert_eq!(DateRange::All.cutoff(now), None);
    }

    #[test]
    fn test_filter_inclusive_of_cutoff() {
        let now = at(15, 30);
        let cutoff = now - TimeDelta::days(7);
        let transactions = vec![
            sale(1, 10.0, 5.0, cutoff),
            sale(2, 10.0, 5.0, cutoff - TimeDelta::seconds(1)),
            sale(3, 10.0, 5.0, now),
        ];

        let kept = filter_transactions(&transactions, DateRange::Last7Days, now);
        let ids: Vec<i64> = kept.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(
            filter_transactions(&transactions, DateRange::All, now).len(),
            3
        );
    }

    #[test]
    fn test_filter_today_starts_at_midnight() {
        let now = at(15, 30);
        let midnight = at(0, 0);
        let transactions = vec![
            sale(1, 10.0, 5.0, midnight),
            sale(2, 10.0, 5.0, midnight - TimeDelta::seconds(1)),
        ];

        let kept = filter_transactions(&transactions, DateRange::Today, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn test_finance_summary() {
        let now = at(15, 30);
        let mut restock = sale(3, 0.0, 40.0, now);
        restock.transaction_type = transaction::RESTOCK.to_string();
        let transactions = vec![
            sale(1, 200.0, 120.0, now),
            sale(2, 100.0, 30.0, now - TimeDelta::days(10)),
            restock,
        ];

        let all = FinanceSummary::from_transactions(&transactions);
        assert_eq!(all.revenue, 300.0);
        assert_eq!(all.cost, 150.0);
        assert_eq!(all.profit, 150.0);
        assert_eq!(all.margin, 50.0);
        assert_eq!(all.sale_count, 2);
        assert_eq!(all.average_sale, 150.0);
        assert_eq!(all.restock_spend, 40.0);

        let week = FinanceSummary::for_range(&transactions, DateRange::Last7Days, now);
        assert_eq!(week.revenue, 200.0);
        assert_eq!(week.margin, 40.0);
    }

    #[test]
    fn test_today_sales() {
        let now = at(15, 30);
        let transactions = vec![
            sale(1, 20.0, 10.0, at(9, 0)),
            sale(2, 50.0, 10.0, at(0, 0) - TimeDelta::hours(2)),
        ];

        let today = today_sales(&transactions, now);
        assert_eq!(today.sale_count, 1);
        assert_eq!(today.revenue, 20.0);
    }

    #[test]
    fn test_finance_summary_empty() {
        let summary = FinanceSummary::from_transactions(&[]);
        assert_eq!(summary, FinanceSummary::default());
        assert_eq!(summary.margin, 0.0);
        assert!(!summary.margin.is_nan());
    }

    #[test]
    fn test_top_sellers() {
        let items = vec![
            item(1, "Tea", 2, 3.0),
            item(2, "Milk", 5, 1.0),
            item(1, "Tea", 4, 3.0),
            item(3, "Bread", 1, 2.0),
        ];

        let top = top_sellers(&items, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, 1);
        assert_eq!(top[0].units, 6);
        assert_eq!(top[0].revenue, 18.0);
        assert_eq!(top[1].product_id, 2);
    }

    #[test]
    fn test_top_seller_units_saturate() {
        let items = vec![item(1, "Tea", i64::MAX, 0.0), item(1, "Tea", 3, 0.0)];

        let top = top_sellers(&items, 1);
        assert_eq!(top[0].units, i64::MAX);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_currency("$", 12.5), "$12.50");
        assert_eq!(format_currency("€", -3.0), "-€3.00");
        assert_eq!(format_margin(40.0), "40.0%");
    }
}
