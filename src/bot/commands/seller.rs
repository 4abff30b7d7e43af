//! Seller roster Discord commands - the `/seller` group (admin only).

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, MAX_EMBED_FIELDS, require_admin},
        core::auth,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for managing sellers.
    #[poise::command(
        slash_command,
        subcommands("seller_add", "seller_list", "seller_remove")
    )]
    pub async fn seller(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/seller add`, `/seller list` or `/seller remove` (admin only).")
            .await?;
        Ok(())
    }

    /// Registers a seller who can sign in with an email and password.
    #[poise::command(slash_command, rename = "add", ephemeral)]
    pub async fn seller_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name"] name: String,
        #[description = "Login email"] email: String,
        #[description = "Initial password"] password: String,
    ) -> Result<()> {
        require_admin(ctx, "manage sellers").await?;

        let seller = auth::register_seller(&ctx.data().database, &name, &email, &password).await?;
        ctx.say(format!(
            "✅ Registered **{}** ({}). They can now `/login seller`.",
            seller.name, seller.email
        ))
        .await?;
        Ok(())
    }

    /// Lists registered sellers.
    #[poise::command(slash_command, rename = "list", ephemeral)]
    pub async fn seller_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_admin(ctx, "manage sellers").await?;

        let sellers = auth::list_sellers(&ctx.data().database).await?;
        if sellers.is_empty() {
            ctx.say("No sellers registered yet.").await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = sellers
            .into_iter()
            .take(MAX_EMBED_FIELDS)
            .map(|s| {
                (
                    s.name,
                    format!("{} · since {}", s.email, s.created_at.format("%Y-%m-%d")),
                    false,
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title("**Sellers**")
            .color(0x0058_65F2) // Discord purple
            .fields(fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Removes a seller. Anyone already signed in as them stays signed in until `/logout`.
    #[poise::command(slash_command, rename = "remove", ephemeral)]
    pub async fn seller_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Email of the seller to remove"] email: String,
    ) -> Result<()> {
        require_admin(ctx, "manage sellers").await?;

        let removed = auth::remove_seller(&ctx.data().database, &email).await?;
        ctx.say(format!("✅ Removed **{}** ({}).", removed.name, removed.email))
            .await?;
        Ok(())
    }
}

pub use inner::*;
