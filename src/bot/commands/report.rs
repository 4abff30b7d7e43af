//! Report Discord commands - `/report inventory` and `/report finance`.
//!
//! Both load the current rows and recompute from scratch; nothing is cached.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, require_user},
        core::{
            catalog, ledger,
            report::{self, DateRange, FinanceSummary, InventoryStats},
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;

    /// How many best sellers the finance report lists.
    const TOP_SELLER_COUNT: usize = 5;

    /// Reporting window offered to Discord users.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RangeChoice {
        #[name = "Today"]
        Today,
        #[name = "Last 7 days"]
        Last7Days,
        #[name = "Last 30 days"]
        Last30Days,
        #[name = "All time"]
        All,
    }

    impl From<RangeChoice> for DateRange {
        fn from(choice: RangeChoice) -> Self {
            match choice {
                RangeChoice::Today => Self::Today,
                RangeChoice::Last7Days => Self::Last7Days,
                RangeChoice::Last30Days => Self::Last30Days,
                RangeChoice::All => Self::All,
            }
        }
    }

    /// Parent command for store reports.
    #[poise::command(slash_command, subcommands("report_inventory", "report_finance"))]
    pub async fn report(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/report inventory` or `/report finance`.")
            .await?;
        Ok(())
    }

    /// Stock valuation and alert counts across the catalog.
    #[poise::command(slash_command, rename = "inventory")]
    pub async fn report_inventory(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_user(ctx).await?;
        let data = ctx.data();

        let products = catalog::get_all_products(&data.database).await?;
        let stats = InventoryStats::from_products(&products);

        let embed = serenity::CreateEmbed::default()
            .title(format!("📦 **{} Inventory**", data.config.store.name))
            .color(0x0058_65F2) // Discord purple
            .field("Products", stats.product_count.to_string(), true)
            .field("Units on hand", stats.total_units.to_string(), true)
            .field("Retail value", data.money(stats.total_value), true)
            .field("Cost value", data.money(stats.total_cost_value), true)
            .field("Potential profit", data.money(stats.potential_profit()), true)
            .field(
                "Alerts",
                format!(
                    "{} low · {} out of stock",
                    stats.low_stock_count, stats.out_of_stock_count
                ),
                true,
            );

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Revenue, cost and margin over a date range, with best sellers.
    #[poise::command(slash_command, rename = "finance")]
    pub async fn report_finance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Reporting window (defaults to all time)"] range: Option<RangeChoice>,
    ) -> Result<()> {
        require_user(ctx).await?;
        let data = ctx.data();
        let range = range.map_or_else(DateRange::default, DateRange::from);
        let now = Utc::now();

        let transactions = ledger::get_all_transactions(&data.database).await?;
        let in_range = report::filter_transactions(&transactions, range, now);
        let summary = FinanceSummary::from_transactions(&in_range);
        let today = report::today_sales(&transactions, now);

        let sale_ids: Vec<i64> = in_range
            .iter()
            .filter(|t| t.is_sale())
            .map(|t| t.id)
            .collect();
        let items = ledger::get_items_for_transactions(&data.database, &sale_ids).await?;
        let top = report::top_sellers(&items, TOP_SELLER_COUNT);

        let top_text = if top.is_empty() {
            "No sales in this window.".to_string()
        } else {
            top.iter()
                .enumerate()
                .map(|(rank, seller)| {
                    format!(
                        "{}. `{}` {} · {} sold · {}",
                        rank + 1,
                        seller.sku,
                        seller.name,
                        seller.units,
                        data.money(seller.revenue)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("💰 **Finance · {}**", range.label()))
            .color(0x0057_F287) // Discord green
            .field("Revenue", data.money(summary.revenue), true)
            .field("Cost", data.money(summary.cost), true)
            .field("Profit", data.money(summary.profit), true)
            .field("Margin", report::format_margin(summary.margin), true)
            .field("Sales", summary.sale_count.to_string(), true)
            .field("Average sale", data.money(summary.average_sale), true)
            .field("Restock spend", data.money(summary.restock_spend), true)
            .field(
                "Today",
                format!("{} from {} sale(s)", data.money(today.revenue), today.sale_count),
                true,
            )
            .field("Top sellers", top_text, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
