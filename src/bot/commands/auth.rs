//! Session Discord commands - `/login`, `/logout` and `/whoami`.
//!
//! Credentials travel in ephemeral replies only; the bot never echoes them back.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, session_key},
        core::auth::{self, AuthenticatedUser, Credential},
        errors::{Error, Result},
    };

    async fn start_session(
        ctx: poise::Context<'_, BotData, Error>,
        user: AuthenticatedUser,
    ) -> Result<()> {
        let greeting = format!(
            "✅ Signed in as **{}** ({}).",
            user.display_name, user.role
        );
        ctx.data().sessions.lock().await.sign_in(session_key(ctx), user);

        ctx.send(
            poise::CreateReply::default()
                .content(greeting)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Signs in as the admin or as a seller.
    #[poise::command(slash_command, subcommands("login_admin", "login_seller"))]
    pub async fn login(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/login admin` or `/login seller`.").await?;
        Ok(())
    }

    /// Signs in with the store's admin passphrase.
    #[poise::command(slash_command, rename = "admin", ephemeral)]
    pub async fn login_admin(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Admin passphrase"] passphrase: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user = auth::authenticate(
            &data.database,
            &data.config.auth,
            Credential::Admin {
                passphrase: &passphrase,
            },
        )
        .await?;
        start_session(ctx, user).await
    }

    /// Signs in with a seller email and password.
    #[poise::command(slash_command, rename = "seller", ephemeral)]
    pub async fn login_seller(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Seller email"] email: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user = auth::authenticate(
            &data.database,
            &data.config.auth,
            Credential::Seller {
                email: &email,
                password: &password,
            },
        )
        .await?;
        start_session(ctx, user).await
    }

    /// Signs out and discards your cart.
    #[poise::command(slash_command, ephemeral)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let ended = ctx.data().sessions.lock().await.sign_out(session_key(ctx));

        let message = match ended {
            Some(session) if !session.cart.is_empty() => format!(
                "👋 Signed out. {} cart line(s) were discarded.",
                session.cart.len()
            ),
            Some(_) => "👋 Signed out.".to_string(),
            None => "You were not signed in.".to_string(),
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows who you are signed in as.
    #[poise::command(slash_command, ephemeral)]
    pub async fn whoami(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let message = {
            let sessions = ctx.data().sessions.lock().await;
            sessions.get(session_key(ctx)).map_or_else(
                || "You are not signed in. Use `/login`.".to_string(),
                |session| {
                    format!(
                        "Signed in as **{}** ({}) since {}. Cart: {} line(s).",
                        session.user.display_name,
                        session.user.role,
                        session.started_at.format("%Y-%m-%d %H:%M UTC"),
                        session.cart.len()
                    )
                },
            )
        };
        ctx.say(message).await?;
        Ok(())
    }
}

pub use inner::*;
