//! Unified error type for StockBuddy.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants map onto the
//! failure kinds the bot layer distinguishes when talking to users: lookups that
//! miss, rejected input, rejected credentials, and infrastructure failures.

use thiserror::Error;

/// All errors produced by the catalog, checkout, ledger, identity and advisory layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration, or corrupt persisted settings.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Failure reported by the database driver.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No product with this id exists in the catalog (or in the cart).
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The id that failed to resolve
        id: i64,
    },

    /// No product carries this SKU.
    #[error("No product with SKU '{sku}'")]
    SkuNotFound {
        /// The SKU that failed to resolve
        sku: String,
    },

    /// Money amount was negative, NaN or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Stock or cart quantity outside its allowed range.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i64,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A ledger transaction must carry at least one item.
    #[error("Transaction has no items")]
    EmptyTransaction,

    /// Login rejected.
    #[error("Invalid credentials: {reason}")]
    InvalidCredential {
        /// Why the credential was rejected
        reason: String,
    },

    /// The caller has no active session.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The caller is signed in but lacks the role for this action.
    #[error("Not allowed to {action}")]
    Forbidden {
        /// The action that was refused
        action: String,
    },

    /// A seller with this email is already registered.
    #[error("A seller with email '{email}' already exists")]
    DuplicateIdentity {
        /// The conflicting email
        email: String,
    },

    /// The advisory service could not produce an insight.
    #[error("Advisory service unavailable: {message}")]
    AdvisoryUnavailable {
        /// Failure detail
        message: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether this error is a user mistake worth echoing back verbatim,
    /// as opposed to an infrastructure failure that should only be logged.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound { .. }
                | Self::SkuNotFound { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidQuantity { .. }
                | Self::EmptyCart
                | Self::EmptyTransaction
                | Self::InvalidCredential { .. }
                | Self::NotAuthenticated
                | Self::Forbidden { .. }
                | Self::DuplicateIdentity { .. }
                | Self::AdvisoryUnavailable { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::EmptyCart.is_user_facing());
        assert!(Error::ProductNotFound { id: 3 }.is_user_facing());
        assert!(
            Error::DuplicateIdentity {
                email: "a@b.c".to_string()
            }
            .is_user_facing()
        );
        assert!(
            !Error::Config {
                message: "bad".to_string()
            }
            .is_user_facing()
        );
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_user_facing());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            Error::SkuNotFound {
                sku: "RS101".to_string()
            }
            .to_string(),
            "No product with SKU 'RS101'"
        );
    }
}
