//! Core business logic - framework-agnostic catalog, cart, checkout, ledger,
//! reporting, identity and advisory operations. Nothing in here knows about Discord.

/// Business insight service client and the version-keyed refresh task
pub mod advisory;
/// Admin/Seller authentication and the seller roster
pub mod auth;
/// In-memory per-session shopping cart
pub mod cart;
/// Product catalog: lookup, create/edit/delete, stock mutation, search
pub mod catalog;
/// Cart-to-ledger checkout processing
pub mod checkout;
/// Append-only SALE/RESTOCK transaction ledger
pub mod ledger;
/// Pure inventory and finance statistics
pub mod report;
/// Signed-in session state
pub mod session;
/// SKU generation and the persisted sequence counter
pub mod sku;
