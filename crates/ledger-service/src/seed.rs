//! Seed-data loading for the ledger service.
//!
//! Catalog and identity records have no write API in this service, so a
//! fresh instance is populated from the configuration's `[seed]`
//! section. Records are plain upserts by id, which keeps repeated
//! startups idempotent.

use ledger_config::SeedConfig;
use ledger_storage::{StorageError, StorageService};
use ledger_types::Collection;
use tracing::info;

/// Writes the seed records into storage.
pub async fn apply(seed: &SeedConfig, storage: &StorageService) -> Result<(), StorageError> {
	for user in &seed.users {
		storage.store(Collection::Users, &user.id, user).await?;
	}
	for restaurant in &seed.restaurants {
		storage
			.store(Collection::Restaurants, &restaurant.id, restaurant)
			.await?;
	}
	for item in &seed.menu_items {
		storage.store(Collection::MenuItems, &item.id, item).await?;
	}

	info!(
		"Seeded {} users, {} restaurants, {} menu items",
		seed.users.len(),
		seed.restaurants.len(),
		seed.menu_items.len()
	);
	Ok(())
}
