//! Storage-backed catalog implementation.
//!
//! Reads restaurant and menu item records from the shared storage
//! layer's `restaurants` and `menu_items` collections.

use crate::{CatalogError, CatalogInterface};
use async_trait::async_trait;
use ledger_storage::{StorageError, StorageService};
use ledger_types::{Collection, MenuItem, Restaurant};
use std::sync::Arc;

/// Catalog provider backed by the shared storage layer.
pub struct StoreCatalog {
	storage: Arc<StorageService>,
}

impl StoreCatalog {
	/// Creates a new StoreCatalog reading from the given storage service.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

fn map_not_found(err: StorageError, id: &str) -> CatalogError {
	match err {
		StorageError::NotFound => CatalogError::NotFound(id.to_string()),
		e => CatalogError::Storage(e.to_string()),
	}
}

#[async_trait]
impl CatalogInterface for StoreCatalog {
	async fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError> {
		self.storage
			.retrieve(Collection::Restaurants, id)
			.await
			.map_err(|e| map_not_found(e, id))
	}

	async fn menu_item(&self, id: &str) -> Result<MenuItem, CatalogError> {
		self.storage
			.retrieve(Collection::MenuItems, id)
			.await
			.map_err(|e| map_not_found(e, id))
	}

	async fn menu_items(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, CatalogError> {
		let all: Vec<MenuItem> = self
			.storage
			.retrieve_all(Collection::MenuItems)
			.await
			.map_err(|e| CatalogError::Storage(e.to_string()))?;

		Ok(all
			.into_iter()
			.filter(|item| item.restaurant_id == restaurant_id)
			.collect())
	}
}

/// Creates a storage-backed catalog provider.
pub fn create_catalog(storage: Arc<StorageService>) -> Box<dyn CatalogInterface> {
	Box::new(StoreCatalog::new(storage))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CatalogService;
	use ledger_storage::implementations::memory::MemoryStorage;
	use rust_decimal::Decimal;
	use std::str::FromStr;

	async fn seeded_catalog() -> StoreCatalog {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));

		let restaurant = Restaurant {
			id: "r1".into(),
			owner_id: "owner-1".into(),
			name: "Spice Garden".into(),
			address: "1 Main St".into(),
			is_active: true,
		};
		storage
			.store(Collection::Restaurants, &restaurant.id, &restaurant)
			.await
			.unwrap();

		for (id, restaurant_id, price) in
			[("m1", "r1", "5.00"), ("m2", "r1", "3.50"), ("m3", "r2", "7.25")]
		{
			let item = MenuItem {
				id: id.into(),
				restaurant_id: restaurant_id.into(),
				name: format!("Item {}", id),
				price: Decimal::from_str(price).unwrap(),
				is_available: true,
			};
			storage
				.store(Collection::MenuItems, &item.id, &item)
				.await
				.unwrap();
		}

		StoreCatalog::new(storage)
	}

	#[tokio::test]
	async fn test_lookup_by_id() {
		let catalog = seeded_catalog().await;

		let restaurant = catalog.restaurant("r1").await.unwrap();
		assert!(restaurant.is_active);

		let item = catalog.menu_item("m2").await.unwrap();
		assert_eq!(item.price, Decimal::from_str("3.50").unwrap());

		let missing = catalog.restaurant("r9").await;
		assert!(matches!(missing, Err(CatalogError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_menu_scoped_to_restaurant() {
		let catalog = CatalogService::new(Box::new(seeded_catalog().await));

		let mut menu = catalog.get_menu("r1").await.unwrap();
		menu.sort_by(|a, b| a.id.cmp(&b.id));

		let ids: Vec<&str> = menu.iter().map(|item| item.id.as_str()).collect();
		assert_eq!(ids, vec!["m1", "m2"]);
	}
}
