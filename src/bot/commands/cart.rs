//! Cart and checkout Discord commands - the `/cart` group and `/checkout`.
//!
//! Each signed-in user has exactly one cart, held in their session.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, require_user, session_key},
        core::{cart::Cart, catalog, checkout},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn cart_embed(data: &BotData, cart: &Cart) -> serenity::CreateEmbed {
        let fields: Vec<(String, String, bool)> = cart
            .lines()
            .iter()
            .map(|line| {
                (
                    format!("{} · {}", line.sku, line.name),
                    format!(
                        "{} × {} = **{}**",
                        line.quantity,
                        data.money(line.price),
                        data.money(line.line_total())
                    ),
                    false,
                )
            })
            .collect();

        serenity::CreateEmbed::default()
            .title("🛒 **Your Cart**")
            .color(0x0058_65F2) // Discord purple
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} item(s) · Total {}",
                cart.item_count(),
                data.money(cart.total())
            )))
    }

    /// Parent command for your cart.
    #[poise::command(
        slash_command,
        subcommands("cart_add", "cart_qty", "cart_remove", "cart_view", "cart_clear")
    )]
    pub async fn cart(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Cart commands. Available subcommands:\n\
            `/cart add` - Add one unit of a product\n\
            `/cart qty` - Change a line's quantity\n\
            `/cart remove` - Remove a line\n\
            `/cart view` - Show the cart\n\
            `/cart clear` - Empty the cart\n\
            Finish with `/checkout`.";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds one unit of a product to your cart.
    #[poise::command(slash_command, rename = "add", ephemeral)]
    pub async fn cart_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the product"]
        #[autocomplete = "autocomplete::autocomplete_product_sku"]
        sku: String,
    ) -> Result<()> {
        require_user(ctx).await?;
        let data = ctx.data();

        let message = {
            // Looked up under the session lock so a concurrent delete cannot slip in.
            let mut sessions = data.sessions.lock().await;
            let product = catalog::require_product_by_sku(&data.database, &sku).await?;
            let session = sessions
                .get_mut(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            let quantity = session.cart.add(&product).quantity;
            let mut message = format!(
                "🛒 **{}** × {quantity} in cart. Cart total: {}.",
                product.name,
                data.money(session.cart.total())
            );
            if quantity > product.quantity {
                message.push_str(&format!(
                    "\n⚠️ Only {} on hand; checkout will clamp stock at zero.",
                    product.quantity.max(0)
                ));
            }
            message
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Changes the quantity of a cart line by a positive or negative amount (minimum 1).
    #[poise::command(slash_command, rename = "qty", ephemeral)]
    pub async fn cart_qty(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the cart line"]
        #[autocomplete = "autocomplete::autocomplete_cart_sku"]
        sku: String,
        #[description = "Change in quantity, e.g. 2 or -1"] change: i64,
    ) -> Result<()> {
        require_user(ctx).await?;
        let data = ctx.data();

        let message = {
            let mut sessions = data.sessions.lock().await;
            let product = catalog::require_product_by_sku(&data.database, &sku).await?;
            let session = sessions
                .get_mut(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            let quantity = session.cart.update_quantity(product.id, change)?.quantity;
            format!(
                "🛒 **{}** now × {quantity}. Cart total: {}.",
                product.name,
                data.money(session.cart.total())
            )
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Removes a line from your cart.
    #[poise::command(slash_command, rename = "remove", ephemeral)]
    pub async fn cart_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "SKU of the cart line"]
        #[autocomplete = "autocomplete::autocomplete_cart_sku"]
        sku: String,
    ) -> Result<()> {
        let sku = sku.trim().to_uppercase();

        let message = {
            let mut sessions = ctx.data().sessions.lock().await;
            let session = sessions
                .get_mut(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            let product_id = session
                .cart
                .lines()
                .iter()
                .find(|line| line.sku == sku)
                .map(|line| line.product_id)
                .ok_or_else(|| Error::SkuNotFound { sku: sku.clone() })?;
            let removed = session.cart.remove(product_id)?;
            format!("🗑️ Removed **{}** from your cart.", removed.name)
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Shows your cart.
    #[poise::command(slash_command, rename = "view", ephemeral)]
    pub async fn cart_view(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();

        let reply = {
            let sessions = data.sessions.lock().await;
            let session = sessions
                .get(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            if session.cart.is_empty() {
                poise::CreateReply::default().content("Your cart is empty.")
            } else {
                poise::CreateReply::default().embed(cart_embed(data, &session.cart))
            }
        };

        ctx.send(reply).await?;
        Ok(())
    }

    /// Empties your cart.
    #[poise::command(slash_command, rename = "clear", ephemeral)]
    pub async fn cart_clear(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        {
            let mut sessions = ctx.data().sessions.lock().await;
            let session = sessions
                .get_mut(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            session.cart.clear();
        }

        ctx.say("🧹 Cart cleared.").await?;
        Ok(())
    }

    /// Completes the sale of everything in your cart.
    #[poise::command(slash_command)]
    pub async fn checkout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;
        let data = ctx.data();

        let receipt = {
            let mut sessions = data.sessions.lock().await;
            let session = sessions
                .get_mut(session_key(ctx))
                .ok_or(Error::NotAuthenticated)?;
            let seller = session.user.display_name.clone();
            checkout::complete_checkout(&data.database, &mut session.cart, &seller).await?
        };
        data.insights.bump_version();

        let fields: Vec<(String, String, bool)> = receipt
            .entry
            .items
            .iter()
            .map(|item| {
                (
                    format!("{} · {}", item.sku, item.name),
                    format!("{} × {}", item.quantity, data.money(item.price)),
                    true,
                )
            })
            .collect();

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("🧾 **Sale #{}**", receipt.entry.transaction.id))
            .color(0x0057_F287) // Discord green
            .fields(fields)
            .field("Total", data.money(receipt.total()), true)
            .field("Seller", &receipt.entry.transaction.user_name, true);

        if !receipt.oversold.is_empty() {
            let warning = receipt
                .oversold
                .iter()
                .map(|o| format!("`{}`: sold {}, had {}", o.sku, o.requested, o.available))
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed
                .color(0x00FE_E75C) // Discord yellow
                .field("⚠️ Oversold (stock set to 0)", warning, false);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
