//! Seller entity - A staff member allowed to sign in with the Seller role.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Seller database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sellers")]
pub struct Model {
    /// Unique identifier for the seller
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name shown after login
    pub name: String,
    /// Login email, trimmed and lowercased
    #[sea_orm(unique)]
    pub email: String,
    /// SHA-256 hex digest of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the seller was registered
    pub created_at: DateTimeUtc,
}

/// `Seller` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
