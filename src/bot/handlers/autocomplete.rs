//! Autocomplete handlers for Discord slash command parameters.
//!
//! Product parameters take a SKU. Suggestions are ranked with the same fuzzy
//! matcher `/product search` uses, so typing part of a name finds its SKU.

use crate::{
    bot::{BotData, session_key},
    core::catalog,
    errors::Error,
};

/// Discord's limit on autocomplete suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Suggests SKUs of catalog products matching the partial input.
pub async fn autocomplete_product_sku(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(products) = catalog::get_all_products(db).await else {
        return Vec::new();
    };

    catalog::filter_and_rank(products, partial)
        .into_iter()
        .map(|p| p.sku)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggests SKUs of the lines in the caller's own cart.
pub async fn autocomplete_cart_sku(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_upper = partial.trim().to_uppercase();
    let sessions = ctx.data().sessions.lock().await;

    let Some(session) = sessions.get(session_key(ctx)) else {
        return Vec::new();
    };

    session
        .cart
        .lines()
        .iter()
        .filter(|line| {
            line.sku.contains(&partial_upper) || line.name.to_uppercase().contains(&partial_upper)
        })
        .map(|line| line.sku.clone())
        .take(MAX_SUGGESTIONS)
        .collect()
}
