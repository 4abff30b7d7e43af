//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let store = &ctx.data().config.store.name;
        let help_text = format!(
            "**{store} Help**\n\
        Sign in first; carts and checkout belong to your session.\n\n\
        **Session**\n\
        • `/login admin <passphrase>` or `/login seller <email> <password>` - Sign in.\n\
        • `/logout` - Sign out and discard your cart.\n\
        • `/whoami` - Shows who you are signed in as.\n\n\
        **Selling**\n\
        • `/cart add <sku>` - Adds one unit to your cart.\n\
        • `/cart qty <sku> <change>` - Adjusts a line (never below 1).\n\
        • `/cart remove <sku>`, `/cart view`, `/cart clear`\n\
        • `/checkout` - Completes the sale and updates stock.\n\n\
        **Catalog** (admin for changes)\n\
        • `/product add|edit|delete|restock` - Manage products.\n\
        • `/product list`, `/product search <query>`, `/product low`\n\n\
        **Insights**\n\
        • `/report inventory`, `/report finance [range]`\n\
        • `/insight refresh`, `/insight show`\n\n\
        **Staff** (admin)\n\
        • `/seller add|list|remove`\n\n\
        • `/ping` - Checks if the bot is responsive."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
