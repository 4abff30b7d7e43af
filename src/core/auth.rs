//! Identity - resolves Admin and Seller logins and manages the seller roster.
//!
//! The admin signs in with a single configured passphrase; sellers sign in with an
//! email and password registered in the `sellers` table (seeded from config.toml
//! or added by an admin). Passwords are stored as SHA-256 digests and all secret
//! comparisons are constant-time. There are no tokens or expiry: a successful login
//! yields an [`AuthenticatedUser`] that lives as long as the session holding it.

use crate::{
    config::{AuthConfig, SellerConfig},
    entities::{Seller, seller},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::{info, instrument, warn};

/// Role a user signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Manages catalog, stock and sellers
    Admin,
    /// Rings up sales
    Seller,
}

impl Role {
    /// Display name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Seller => "Seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential presented at login.
#[derive(Clone, Copy)]
pub enum Credential<'a> {
    /// Admin passphrase
    Admin {
        /// The passphrase
        passphrase: &'a str,
    },
    /// Seller email and password
    Seller {
        /// Login email
        email: &'a str,
        /// Password
        password: &'a str,
    },
}

impl fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin { .. } => f.write_str("Credential::Admin"),
            Self::Seller { email, .. } => write!(f, "Credential::Seller({email})"),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Role granted
    pub role: Role,
    /// Name shown in the UI and recorded on transactions
    pub display_name: String,
    /// Seller email; `None` for the admin
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Whether the user may manage catalog and sellers.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Checks `credential` against the configured admin passphrase or the seller roster.
///
/// # Errors
/// Returns [`Error::InvalidCredential`] with a user-presentable reason on rejection,
/// or a database error.
#[instrument(skip(db, auth))]
pub async fn authenticate(
    db: &DatabaseConnection,
    auth: &AuthConfig,
    credential: Credential<'_>,
) -> Result<AuthenticatedUser> {
    let user = match credential {
        Credential::Admin { passphrase } => {
            if auth.admin_passphrase.is_empty() {
                return Err(Error::InvalidCredential {
                    reason: "Admin login is not configured".to_string(),
                });
            }
            if !secrets_match(passphrase, &auth.admin_passphrase) {
                warn!("Rejected admin login");
                return Err(Error::InvalidCredential {
                    reason: "Incorrect admin passphrase".to_string(),
                });
            }
            AuthenticatedUser {
                role: Role::Admin,
                display_name: auth.admin_name.clone(),
                email: None,
            }
        }
        Credential::Seller { email, password } => {
            let email = normalize_email(email);
            let seller = Seller::find()
                .filter(seller::Column::Email.eq(email.as_str()))
                .one(db)
                .await?;

            let accepted = seller
                .filter(|s| secrets_match(&hash_password(password), &s.password_hash));
            let Some(seller) = accepted else {
                warn!(%email, "Rejected seller login");
                return Err(Error::InvalidCredential {
                    reason: "Incorrect email or password".to_string(),
                });
            };

            AuthenticatedUser {
                role: Role::Seller,
                display_name: seller.name,
                email: Some(seller.email),
            }
        }
    };

    info!(role = %user.role, name = %user.display_name, "Signed in");
    Ok(user)
}

/// Registers a new seller.
///
/// # Errors
/// Returns an error if:
/// - The name, email or password is empty, or the email has no `@`
/// - A seller with the same email exists ([`Error::DuplicateIdentity`]); nothing is written
/// - The database insert fails
#[instrument(skip(db, password))]
pub async fn register_seller(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<seller::Model> {
    let email = normalize_email(email);
    if name.trim().is_empty() {
        return Err(Error::InvalidCredential {
            reason: "Seller name cannot be empty".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(Error::InvalidCredential {
            reason: format!("'{email}' is not a valid email"),
        });
    }
    if password.is_empty() {
        return Err(Error::InvalidCredential {
            reason: "Seller password cannot be empty".to_string(),
        });
    }

    let existing = Seller::find()
        .filter(seller::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateIdentity { email });
    }

    let seller = seller::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash_password(password)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(id = seller.id, email = %seller.email, "Registered seller");
    Ok(seller)
}

/// Removes a seller by email and returns the removed row.
///
/// Sessions already signed in as that seller are not affected.
///
/// # Errors
/// Returns [`Error::InvalidCredential`] if no seller has that email, or a database error.
pub async fn remove_seller(db: &DatabaseConnection, email: &str) -> Result<seller::Model> {
    let email = normalize_email(email);
    let seller = Seller::find()
        .filter(seller::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::InvalidCredential {
            reason: format!("No seller registered as '{email}'"),
        })?;

    seller.clone().delete(db).await?;
    info!(email = %seller.email, "Removed seller");
    Ok(seller)
}

/// All registered sellers, ordered by name.
pub async fn list_sellers(db: &DatabaseConnection) -> Result<Vec<seller::Model>> {
    Seller::find()
        .order_by_asc(seller::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers every configured seller that is not in the database yet.
///
/// Existing sellers are left alone, including their passwords. Returns how many were added.
pub async fn seed_sellers(db: &DatabaseConnection, sellers: &[SellerConfig]) -> Result<usize> {
    let mut added = 0;
    for config in sellers {
        match register_seller(db, &config.name, &config.email, &config.password).await {
            Ok(_) => added += 1,
            Err(Error::DuplicateIdentity { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    if added > 0 {
        info!(added, "Seeded sellers from configuration");
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            admin_name: "Owner".to_string(),
            admin_passphrase: "open sesame".to_string(),
            sellers: vec![SellerConfig {
                name: "Dana".to_string(),
                email: "Dana@Example.com".to_string(),
                password: "hunter2".to_string(),
            }],
        }
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "Admin");
        assert_eq!(Role::Seller.to_string(), "Seller");
    }

    #[test]
    fn test_password_hash_is_stable_hex() {
        let hash = hash_password("hunter2");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("hunter2"));
        assert_ne!(hash, hash_password("hunter3"));
    }

    #[test]
    fn test_credential_debug_hides_secrets() {
        let credential = Credential::Seller {
            email: "dana@example.com",
            password: "hunter2",
        };
        assert!(!format!("{credential:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn test_admin_login() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = auth_config();

        let user = authenticate(
            &db,
            &auth,
            Credential::Admin {
                passphrase: "open sesame",
            },
        )
        .await?;
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.display_name, "Owner");
        assert!(user.is_admin());

        let rejected = authenticate(&db, &auth, Credential::Admin { passphrase: "open" }).await;
        assert!(matches!(rejected, Err(Error::InvalidCredential { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_login_disabled_without_passphrase() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = AuthConfig::default();

        let rejected = authenticate(&db, &auth, Credential::Admin { passphrase: "" }).await;
        assert!(
            matches!(rejected, Err(Error::InvalidCredential { reason }) if reason.contains("not configured"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_seller_login_after_seed() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = auth_config();
        assert_eq!(seed_sellers(&db, &auth.sellers).await?, 1);

        let user = authenticate(
            &db,
            &auth,
            Credential::Seller {
                email: "  dana@EXAMPLE.com ",
                password: "hunter2",
            },
        )
        .await?;
        assert_eq!(user.role, Role::Seller);
        assert_eq!(user.display_name, "Dana");
        assert_eq!(user.email.as_deref(), Some("dana@example.com"));

        let wrong_password = authenticate(
            &db,
            &auth,
            Credential::Seller {
                email: "dana@example.com",
                password: "hunter3",
            },
        )
        .await;
        assert!(matches!(wrong_password, Err(Error::InvalidCredential { .. })));

        let unknown = authenticate(
            &db,
            &auth,
            Credential::Seller {
                email: "nobody@example.com",
                password: "hunter2",
            },
        )
        .await;
        assert!(matches!(unknown, Err(Error::InvalidCredential { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = auth_config();

        assert_eq!(seed_sellers(&db, &auth.sellers).await?, 1);
        assert_eq!(seed_sellers(&db, &auth.sellers).await?, 0);
        assert_eq!(list_sellers(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        register_seller(&db, "Lee", "lee@example.com", "pw").await?;

        let duplicate = register_seller(&db, "Other Lee", " LEE@example.com", "pw2").await;
        assert!(
            matches!(duplicate, Err(Error::DuplicateIdentity { email }) if email == "lee@example.com")
        );

        let sellers = list_sellers(&db).await?;
        assert_eq!(sellers.len(), 1);
        assert_eq!(sellers[0].name, "Lee");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(matches!(
            register_seller(&db, " ", "a@b.c", "pw").await,
            Err(Error::InvalidCredential { .. })
        ));
        assert!(matches!(
            register_seller(&db, "Lee", "not-an-email", "pw").await,
            Err(Error::InvalidCredential { .. })
        ));
        assert!(matches!(
            register_seller(&db, "Lee", "a@b.c", "").await,
            Err(Error::InvalidCredential { .. })
        ));
        assert!(list_sellers(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_seller() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = auth_config();
        register_seller(&db, "Lee", "lee@example.com", "pw").await?;

        let removed = remove_seller(&db, "LEE@example.com").await?;
        assert_eq!(removed.name, "Lee");

        let login = authenticate(
            &db,
            &auth,
            Credential::Seller {
                email: "lee@example.com",
                password: "pw",
            },
        )
        .await;
        assert!(login.is_err());

        assert!(remove_seller(&db, "lee@example.com").await.is_err());
        Ok(())
    }
}
