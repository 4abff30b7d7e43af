//! Product Discord commands - the `/product` group.
//!
//! Listing, searching and the low-stock view are open to any signed-in user.
//! Adding, editing, deleting and restocking require the admin role. Every
//! mutation bumps the insight board's catalog version.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, MAX_EMBED_FIELDS, handlers::autocomplete, require_admin, require_user,
        },
        core::{
            catalog::{self, ProductDraft, ProductUpdate},
            report::StockStatus,
        },
        entities::product,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    fn product_fields(data: &BotData, products: &[product::Model]) -> Vec<(String, String, bool)> {
        products
            .iter()
            .take(MAX_EMBED_FIELDS)
            .map(|p| {
                (
                    format!("{} · {}", p.sku, p.name),
                    format!(
                        "{} · {} on hand (min {}) · {}\n{}",
                        data.money(p.price),
                        p.quantity,
                        p.min_threshold,
                        p.category,
                        StockStatus::of(p).label()
                    ),
                    false,
                )
            })
            .collect()
    }

    async fn send_product_list(
        ctx: poise::Context<'_, BotData, Error>,
        title: String,
        products: &[product::Model],
    ) -> Result<()> {
        let mut embed = serenity::CreateEmbed::default()
            .title(title)
            .color(0x0058_65F2) // Discord purple
            .fields(product_fields(ctx.data(), products));
        if products.len() > MAX_EMBED_FIELDS {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {MAX_EMBED_FIELDS} of {}. Narrow it down with /product search.",
                products.len()
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for the product catalog.
    #[poise::command(
        slash_command,
        subcommands(
            "product_add",
            "product_list",
            "product_edit",
            "product_delete",
            "product_restock",
            "product_search",
            "product_low"
        )
    )]
    pub async fn product(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product commands. Available subcommands:\n\
            `/product add` - Add a product (admin)\n\
            `/product edit` - Edit a product (admin)\n\
            `/product delete` - Delete a product (admin)\n\
            `/product restock` - Add stock (admin)\n\
            `/product list` - List the catalog\n\
            `/product search` - Find products by name, SKU or category\n\
            `/product low` - Low and out-of-stock products";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a product; its SKU is generated from the name.
    #[poise::command(slash_command, rename = "add")]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name (e.g., 'Red Apples')"] name: String,
        #[description = "Sale price per unit"] price: f64,
        #[description = "Cost price per unit"] cost_price: f64,
        #[description = "Opening stock"] quantity: i64,
        #[description = "Low-stock threshold (defaults to 5)"] min_threshold: Option<i64>,
        #[description = "Category (defaults to 'General')"] category: Option<String>,
    ) -> Result<()> {
        require_admin(ctx, "add products").await?;

        if name.trim().is_empty() {
            ctx.say("❌ Product name cannot be empty.").await?;
            return Ok(());
        }

        let data = ctx.data();
        let created = catalog::create_product(
            &data.database,
            ProductDraft {
                name,
                category,
                price,
                cost_price,
                quantity,
                min_threshold: min_threshold.unwrap_or(5),
            },
        )
        .await?;
        data.insights.bump_version();

        ctx.say(format!(
            "✅ Added **{}** as `{}` at {} with {} in stock.",
            created.name,
            created.sku,
            data.money(created.price),
            created.quantity
        ))
        .await?;
        Ok(())
    }

    /// Lists every product in the catalog.
    #[poise::command(slash_command, rename = "list")]
    pub async fn product_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_user(ctx).await?;

        let products = catalog::get_all_products(&ctx.data().database).await?;
        if products.is_empty() {
            ctx.say("No products yet. An admin can add some with `/product add`.")
                .await?;
            return Ok(());
        }

        send_product_list(ctx, format!("**Catalog** ({})", products.len()), &products).await
    }

    /// Edits fields of an existing product; omitted fields are unchanged.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn product_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the product to edit"]
        #[autocomplete = "autocomplete::autocomplete_product_sku"]
        sku: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New sale price"] price: Option<f64>,
        #[description = "New cost price"] cost_price: Option<f64>,
        #[description = "Set stock to this count"] quantity: Option<i64>,
        #[description = "New low-stock threshold"] min_threshold: Option<i64>,
        #[description = "New category"] category: Option<String>,
    ) -> Result<()> {
        require_admin(ctx, "edit products").await?;

        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            ctx.say("❌ Product name cannot be empty.").await?;
            return Ok(());
        }

        let data = ctx.data();
        let existing = catalog::require_product_by_sku(&data.database, &sku).await?;
        let updated = catalog::update_product(
            &data.database,
            existing.id,
            ProductUpdate {
                name,
                category,
                price,
                cost_price,
                quantity,
                min_threshold,
            },
        )
        .await?;
        data.insights.bump_version();

        ctx.say(format!(
            "✅ Updated **{}** (`{}`): {} · {} on hand.",
            updated.name,
            updated.sku,
            data.money(updated.price),
            updated.quantity
        ))
        .await?;
        Ok(())
    }

    /// Deletes a product and drops it from every open cart.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the product to delete"]
        #[autocomplete = "autocomplete::autocomplete_product_sku"]
        sku: String,
    ) -> Result<()> {
        let admin = require_admin(ctx, "delete products").await?;

        let data = ctx.data();
        let existing = catalog::require_product_by_sku(&data.database, &sku).await?;
        let (deleted, purged) = data
            .sessions
            .lock()
            .await
            .delete_product(&data.database, existing.id)
            .await?;
        data.insights.bump_version();

        info!(sku = %deleted.sku, by = %admin.display_name, purged, "Product removed from catalog");

        let mut message = format!("✅ Deleted **{}** (`{}`).", deleted.name, deleted.sku);
        if purged > 0 {
            message.push_str(&format!(" Removed from {purged} open cart(s)."));
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Adds stock to a product and records the restock in the ledger.
    #[poise::command(slash_command, rename = "restock")]
    pub async fn product_restock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the product to restock"]
        #[autocomplete = "autocomplete::autocomplete_product_sku"]
        sku: String,
        #[description = "Units received"]
        #[min = 1]
        amount: i64,
    ) -> Result<()> {
        let admin = require_admin(ctx, "restock products").await?;

        let data = ctx.data();
        let existing = catalog::require_product_by_sku(&data.database, &sku).await?;
        let (updated, entry) = catalog::restock_product(
            &data.database,
            existing.id,
            amount,
            &admin.display_name,
        )
        .await?;
        data.insights.bump_version();

        ctx.say(format!(
            "📦 Restocked **{}** (`{}`) by {amount}. Now {} on hand. Cost recorded: {}.",
            updated.name,
            updated.sku,
            updated.quantity,
            data.money(entry.transaction.total_cost)
        ))
        .await?;
        Ok(())
    }

    /// Finds products by name, SKU or category.
    #[poise::command(slash_command, rename = "search")]
    pub async fn product_search(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of a name, SKU or category"] query: String,
    ) -> Result<()> {
        require_user(ctx).await?;

        let results = catalog::search_products(&ctx.data().database, &query).await?;
        if results.is_empty() {
            ctx.say(format!("No products match '{query}'.")).await?;
            return Ok(());
        }

        send_product_list(ctx, format!("**Search:** {query}"), &results).await
    }

    /// Lists products that are out of stock or at their low-stock threshold.
    #[poise::command(slash_command, rename = "low")]
    pub async fn product_low(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_user(ctx).await?;

        let db = &ctx.data().database;
        let mut alerts = catalog::get_out_of_stock_products(db).await?;
        alerts.extend(catalog::get_low_stock_products(db).await?);

        if alerts.is_empty() {
            ctx.say("✅ Everything is above its low-stock threshold.")
                .await?;
            return Ok(());
        }

        send_product_list(ctx, "**Stock Alerts**".to_string(), &alerts).await
    }
}

pub use inner::*;
