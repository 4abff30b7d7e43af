//! Per-user application state.
//!
//! A [`Session`] is created at login and dropped at logout. It owns the signed-in
//! user and that user's cart; nothing in it is persisted. The bot keeps one
//! [`SessionStore`] keyed by Discord user id.

use crate::{
    core::{auth::AuthenticatedUser, cart::Cart, catalog},
    entities::product,
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tracing::info;

/// State for one signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    /// Who is signed in
    pub user: AuthenticatedUser,
    /// Their cart
    pub cart: Cart,
    /// When they signed in
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session with an empty cart.
    #[must_use]
    pub fn new(user: AuthenticatedUser) -> Self {
        Self {
            user,
            cart: Cart::new(),
            started_at: Utc::now(),
        }
    }
}

/// All live sessions, keyed by Discord user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<u64, Session>,
}

impl SessionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user_id`, replacing (and discarding the cart of) any
    /// session it already had.
    pub fn sign_in(&mut self, user_id: u64, user: AuthenticatedUser) -> &Session {
        info!(user_id, name = %user.display_name, role = %user.role, "Session started");
        self.sessions.insert(user_id, Session::new(user));
        &self.sessions[&user_id]
    }

    /// Ends the session for `user_id`, returning it if there was one.
    pub fn sign_out(&mut self, user_id: u64) -> Option<Session> {
        let session = self.sessions.remove(&user_id);
        if let Some(session) = &session {
            info!(
                user_id,
                name = %session.user.display_name,
                abandoned_lines = session.cart.len(),
                "Session ended"
            );
        }
        session
    }

    /// Session for `user_id`.
    #[must_use]
    pub fn get(&self, user_id: u64) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    /// Mutable session for `user_id`.
    pub fn get_mut(&mut self, user_id: u64) -> Option<&mut Session> {
        self.sessions.get_mut(&user_id)
    }

    /// Drops `product_id` from every cart. Returns how many carts held it.
    pub fn purge_product(&mut self, product_id: i64) -> usize {
        let mut purged = 0;
        for session in self.sessions.values_mut() {
            if session.cart.purge_product(product_id) {
                purged += 1;
            }
        }
        purged
    }

    /// Deletes a product from the catalog and from every cart.
    ///
    /// Holding the store while the row is deleted keeps a concurrent `/cart add`
    /// from putting the product back after the purge.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::ProductNotFound`] for an unknown id, or a
    /// database error. Carts are untouched on error.
    pub async fn delete_product(
        &mut self,
        db: &DatabaseConnection,
        product_id: i64,
    ) -> Result<(product::Model, usize)> {
        let deleted = catalog::delete_product(db, product_id).await?;
        let purged = self.purge_product(deleted.id);
        Ok((deleted, purged))
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nobody is signed in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
