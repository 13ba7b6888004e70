//! Catalog module for the order ledger system.
//!
//! This module provides read access to the restaurant and menu item
//! records consulted when pricing an order. The catalog is strictly
//! read-only from the ledger's perspective: prices are snapshotted at
//! checkout, and a catalog edit committed afterwards never retroactively
//! affects an existing order.

use async_trait::async_trait;
use ledger_types::{MenuItem, Restaurant};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod store;
}

/// Errors that can occur during catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs when the requested record does not exist.
	#[error("Catalog record not found: {0}")]
	NotFound(String),
	/// Error that occurs in the backing store.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Trait defining the interface for catalog providers.
///
/// Provides lookups by primary key and by restaurant scope.
#[async_trait]
pub trait CatalogInterface: Send + Sync {
	/// Retrieves a restaurant by id.
	async fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError>;

	/// Retrieves a menu item by id.
	async fn menu_item(&self, id: &str) -> Result<MenuItem, CatalogError>;

	/// Retrieves every menu item belonging to the given restaurant.
	async fn menu_items(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, CatalogError>;
}

/// Service that manages catalog lookups.
///
/// This struct provides a high-level interface for catalog access,
/// wrapping an underlying catalog implementation.
pub struct CatalogService {
	/// The underlying catalog implementation.
	implementation: Box<dyn CatalogInterface>,
}

impl CatalogService {
	/// Creates a new CatalogService with the specified implementation.
	pub fn new(implementation: Box<dyn CatalogInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves a restaurant by id.
	pub async fn get_restaurant(&self, id: &str) -> Result<Restaurant, CatalogError> {
		self.implementation.restaurant(id).await
	}

	/// Retrieves a menu item by id.
	pub async fn get_menu_item(&self, id: &str) -> Result<MenuItem, CatalogError> {
		self.implementation.menu_item(id).await
	}

	/// Retrieves every menu item belonging to the given restaurant.
	pub async fn get_menu(&self, restaurant_id: &str) -> Result<Vec<MenuItem>, CatalogError> {
		self.implementation.menu_items(restaurant_id).await
	}
}
