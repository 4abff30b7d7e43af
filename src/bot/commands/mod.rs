//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Login, logout and whoami
pub mod auth;

/// Cart management and checkout
pub mod cart;

/// General utility commands
pub mod general;

/// Business insight commands
pub mod insight;

/// Product catalog commands
pub mod product;

/// Inventory and finance reports
pub mod report;

/// Seller roster commands
pub mod seller;

// Export commands
pub use auth::*;
pub use cart::*;
pub use general::*;
pub use insight::*;
pub use product::*;
pub use report::*;
pub use seller::*;

use crate::{bot::BotData, errors::Error};

/// Every top-level command registered with Discord.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        login(),
        logout(),
        whoami(),
        product(),
        cart(),
        checkout(),
        report(),
        insight(),
        seller(),
    ]
}
