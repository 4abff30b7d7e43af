//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `StockBuddy` application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (auth, product, cart, checkout, report, insight, seller)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::Config,
    core::{
        advisory::{AdvisoryClient, InsightBoard},
        auth::AuthenticatedUser,
        session::SessionStore,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Discord's limit on fields per embed.
pub const MAX_EMBED_FIELDS: usize = 25;

/// Shared data available to all bot commands.
/// This structure holds the database connection, the signed-in sessions and the
/// insight panel that every command may read or update.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Loaded store configuration
    pub config: Arc<Config>,
    /// Signed-in users and their carts, keyed by Discord user id
    pub sessions: Mutex<SessionStore>,
    /// Business insight panel and its catalog version
    pub insights: Arc<InsightBoard>,
    /// Insight service, when enabled
    pub advisory: Option<Arc<dyn AdvisoryClient>>,
}

impl BotData {
    /// Creates a new `BotData` instance with no signed-in users.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        config: Arc<Config>,
        advisory: Option<Arc<dyn AdvisoryClient>>,
    ) -> Self {
        Self {
            database,
            config,
            sessions: Mutex::new(SessionStore::new()),
            insights: Arc::new(InsightBoard::new()),
            advisory,
        }
    }

    /// Formats `amount` with the store's currency symbol.
    #[must_use]
    pub fn money(&self, amount: f64) -> String {
        crate::core::report::format_currency(&self.config.store.currency_symbol, amount)
    }
}

/// Discord user id used as the session key.
pub fn session_key(ctx: poise::Context<'_, BotData, Error>) -> u64 {
    ctx.author().id.get()
}

/// The signed-in user behind `ctx`.
///
/// # Errors
/// Returns [`Error::NotAuthenticated`] when the author has no session.
pub async fn require_user(ctx: poise::Context<'_, BotData, Error>) -> Result<AuthenticatedUser> {
    let sessions = ctx.data().sessions.lock().await;
    sessions
        .get(session_key(ctx))
        .map(|session| session.user.clone())
        .ok_or(Error::NotAuthenticated)
}

/// The signed-in admin behind `ctx`.
///
/// # Errors
/// Returns [`Error::NotAuthenticated`] without a session, or [`Error::Forbidden`]
/// naming `action` when the user is not an admin.
pub async fn require_admin(
    ctx: poise::Context<'_, BotData, Error>,
    action: &str,
) -> Result<AuthenticatedUser> {
    let user = require_user(ctx).await?;
    if !user.is_admin() {
        warn!(name = %user.display_name, action, "Refused non-admin action");
        return Err(Error::Forbidden {
            action: action.to_string(),
        });
    }
    Ok(user)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = if error.is_user_facing() {
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
                "❌ Something went wrong. Please try again later.".to_string()
            };
            let reply = poise::CreateReply::default()
                .content(message)
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns [`Error::Framework`] if the client cannot be built or disconnects with an error.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}
