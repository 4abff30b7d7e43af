use dotenvy::dotenv;
use stock_buddy::{
    bot::{self, BotData},
    config::{self, database},
    core::{
        advisory::{AdvisoryClient, HttpAdvisoryClient},
        auth,
    },
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the store configuration, letting the environment override secrets
    let config_path = env::var("STOCK_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut app_config = config::store::load_config_or_default(&config_path)?;
    app_config.apply_env_overrides();
    info!(store = %app_config.store.name, "Configuration loaded");
    if app_config.auth.admin_passphrase.is_empty() {
        warn!("No admin passphrase configured; /login admin is disabled");
    }

    // 4. Connect, create tables, seed configured sellers
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;
    auth::seed_sellers(&db, &app_config.auth.sellers).await?;

    // 5. Build the insight client when enabled
    let advisory: Option<Arc<dyn AdvisoryClient>> = if app_config.advisory.enabled {
        let api_key = env::var("ADVISORY_API_KEY").ok();
        let client = HttpAdvisoryClient::new(&app_config.advisory, api_key)?;
        info!(endpoint = %app_config.advisory.endpoint, "Insight service enabled");
        Some(Arc::new(client))
    } else {
        None
    };

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    let data = BotData::new(db, Arc::new(app_config), advisory);
    bot::run_bot(token, data).await
}
