/// Database configuration and connection management
pub mod database;

/// Store, authentication and advisory settings loaded from config.toml
pub mod store;

pub use store::{AdvisoryConfig, AuthConfig, Config, SellerConfig, StoreConfig};
