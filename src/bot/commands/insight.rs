//! Insight Discord commands - `/insight refresh` and `/insight show`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, require_user},
        core::{
            advisory::InsightRequest,
            catalog,
            ledger::{self, TransactionKind},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::sync::Arc;

    /// Parent command for business insights.
    #[poise::command(slash_command, subcommands("insight_refresh", "insight_show"))]
    pub async fn insight(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Use `/insight refresh` to ask for new advice and `/insight show` to read it.")
            .await?;
        Ok(())
    }

    /// Asks the insight service to review the current catalog and recent sales.
    #[poise::command(slash_command, rename = "refresh")]
    pub async fn insight_refresh(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_user(ctx).await?;
        let data = ctx.data();

        let Some(client) = &data.advisory else {
            ctx.say("Insights are not enabled for this store.").await?;
            return Ok(());
        };

        let products = catalog::get_all_products(&data.database).await?;
        let recent = ledger::get_recent_transactions(
            &data.database,
            TransactionKind::Sale,
            data.config.advisory.recent_transaction_limit,
        )
        .await?;

        let request = InsightRequest::from_snapshot(products, recent);
        data.insights.refresh(Arc::clone(client), request);

        ctx.say("⏳ Generating a fresh insight. Check back with `/insight show`.")
            .await?;
        Ok(())
    }

    /// Shows the latest business insight.
    #[poise::command(slash_command, rename = "show")]
    pub async fn insight_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        require_user(ctx).await?;
        let board = &ctx.data().insights;
        let panel = board.snapshot();

        let Some(insight) = &panel.insight else {
            let message = if panel.loading {
                "⏳ The first insight is still being generated."
            } else {
                "No insight yet. Use `/insight refresh`."
            };
            ctx.say(message).await?;
            return Ok(());
        };

        let recommendations = if insight.recommendations.is_empty() {
            "None".to_string()
        } else {
            insight
                .recommendations
                .iter()
                .map(|r| format!("• {r}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut notes = Vec::new();
        if let Some(updated_at) = panel.updated_at {
            notes.push(format!("Generated {}", updated_at.format("%Y-%m-%d %H:%M UTC")));
        }
        if panel.loading {
            notes.push("refresh in progress".to_string());
        }
        if board.is_stale() {
            notes.push("catalog has changed since".to_string());
        }
        if let Some(error) = &panel.last_error {
            notes.push(format!("last refresh failed: {error}"));
        }

        let mut embed = serenity::CreateEmbed::default()
            .title("💡 **Business Insight**")
            .color(0x0058_65F2) // Discord purple
            .description(&insight.insight)
            .field("Recommendations", recommendations, false);
        if !notes.is_empty() {
            embed = embed.footer(serenity::CreateEmbedFooter::new(notes.join(" · ")));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
