//! SKU generation.
//!
//! A SKU is a two-letter prefix derived from the product name followed by a
//! sequence number of at least three digits. The sequence counter lives in the
//! `system_state` table; it is bumped inside the same database transaction that
//! inserts the product so the counter and the catalog cannot drift apart.

use crate::{
    entities::{Product, SystemState, system_state},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, Set, prelude::*};
use tracing::debug;

/// `system_state` key holding the next SKU sequence number.
pub const SKU_COUNTER_KEY: &str = "sku_counter";

/// Added to the catalog size when the counter is first seeded.
pub const SKU_SEED_OFFSET: u64 = 100;

/// Builds a SKU from a product name and a sequence number.
///
/// When the trimmed name starts with an ASCII letter the prefix is that letter and
/// the name's last ASCII letter, both uppercased. Any other name gets the prefix `PX`.
///
/// ```
/// use stock_buddy::core::sku::generate_sku;
/// assert_eq!(generate_sku("Red Apples", 7), "RS007");
/// assert_eq!(generate_sku("7-Up", 3), "PX003");
/// ```
#[must_use]
pub fn generate_sku(name: &str, sequence: u64) -> String {
    let (first, last) = sku_prefix(name);
    format!("{first}{last}{sequence:03}")
}

fn sku_prefix(name: &str) -> (char, char) {
    let trimmed = name.trim();
    match trimmed.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => {
            let last = trimmed
                .chars()
                .rev()
                .find(char::is_ascii_alphabetic)
                .unwrap_or(first);
            (first.to_ascii_uppercase(), last.to_ascii_uppercase())
        }
        _ => ('P', 'X'),
    }
}

/// Returns the next SKU sequence number and advances the stored counter.
///
/// The first call on a fresh database seeds the counter from the current catalog
/// size plus [`SKU_SEED_OFFSET`]. Pass the open database transaction that will also
/// insert the product.
///
/// # Errors
/// Returns an error if the stored counter is not a number or a query fails.
pub async fn next_sku_sequence<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(SKU_COUNTER_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let current: u64 = state.value.parse().map_err(|e| Error::Config {
            message: format!("Corrupt SKU counter '{}': {e}", state.value),
        })?;

        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set((current + 1).to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;

        debug!(sequence = current, "Allocated SKU sequence");
        Ok(current)
    } else {
        let current = Product::find().count(db).await? + SKU_SEED_OFFSET;

        let active_model = system_state::ActiveModel {
            key: Set(SKU_COUNTER_KEY.to_string()),
            value: Set((current + 1).to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        active_model.insert(db).await?;

        debug!(sequence = current, "Seeded SKU counter");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_generate_sku_uses_first_and_last_letters() {
        assert_eq!(generate_sku("Red Apples", 7), "RS007");
        assert_eq!(generate_sku("milk 2L", 12), "ML012");
        assert_eq!(generate_sku("  bread  ", 101), "BD101");
    }

    #[test]
    fn test_generate_sku_defaults_without_leading_letter() {
        assert_eq!(generate_sku("7-Up", 3), "PX003");
        assert_eq!(generate_sku("123", 5), "PX005");
        assert_eq!(generate_sku("", 1), "PX001");
    }

    #[test]
    fn test_generate_sku_single_letter_name() {
        assert_eq!(generate_sku("x", 9), "XX009");
    }

    #[test]
    fn test_generate_sku_wide_sequence_not_truncated() {
        assert_eq!(generate_sku("Tea", 12345), "TA12345");
    }

    #[tokio::test]
    async fn test_counter_seeded_from_catalog_size() -> Result<()> {
        let db = setup_test_db().await?;

        let first = next_sku_sequence(&db).await?;
        let second = next_sku_sequence(&db).await?;

        assert_eq!(first, SKU_SEED_OFFSET);
        assert_eq!(second, SKU_SEED_OFFSET + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_counter_rejects_corrupt_value() -> Result<()> {
        let db = setup_test_db().await?;
        system_state::ActiveModel {
            key: Set(SKU_COUNTER_KEY.to_string()),
            value: Set("not-a-number".to_string()),
            updated_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let result = next_sku_sequence(&db).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
