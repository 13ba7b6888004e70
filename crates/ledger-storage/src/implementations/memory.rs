//! In-memory storage backend implementation for the ledger service.
//!
//! This module provides a memory-based implementation of the StorageInterface
//! trait, useful for testing and development scenarios where persistence is
//! not required.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// Records live in a nested HashMap keyed by collection then id,
/// protected by a read-write lock. Compare-and-swap runs entirely under
/// the write lock, so guarded updates are atomic.
pub struct MemoryStorage {
	/// Collection name -> record id -> serialized record.
	store: Arc<RwLock<HashMap<String, HashMap<String, Vec<u8>>>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, collection: &str, id: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store
			.get(collection)
			.and_then(|records| records.get(id))
			.cloned()
			.ok_or(StorageError::NotFound)
	}

	async fn put_bytes(
		&self,
		collection: &str,
		id: &str,
		value: Vec<u8>,
	) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store
			.entry(collection.to_string())
			.or_default()
			.insert(id.to_string(), value);
		Ok(())
	}

	async fn swap_bytes(
		&self,
		collection: &str,
		id: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		let records = store.get_mut(collection).ok_or(StorageError::NotFound)?;
		let current = records.get(id).ok_or(StorageError::NotFound)?;
		if current.as_slice() != expected {
			return Err(StorageError::Conflict);
		}
		records.insert(id.to_string(), value);
		Ok(())
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		if let Some(records) = store.get_mut(collection) {
			records.remove(id);
		}
		Ok(())
	}

	async fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.get(collection)
			.is_some_and(|records| records.contains_key(id)))
	}

	async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.get(collection)
			.map(|records| records.keys().cloned().collect())
			.unwrap_or_default())
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		// Test put and get
		let value = b"test_value".to_vec();
		storage
			.put_bytes("orders", "o1", value.clone())
			.await
			.unwrap();

		let retrieved = storage.get_bytes("orders", "o1").await.unwrap();
		assert_eq!(retrieved, value);

		// Test exists
		assert!(storage.exists("orders", "o1").await.unwrap());

		// Test delete
		storage.delete("orders", "o1").await.unwrap();
		assert!(!storage.exists("orders", "o1").await.unwrap());

		// Test get after delete
		let result = storage.get_bytes("orders", "o1").await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_collections_are_isolated() {
		let storage = MemoryStorage::new();

		storage
			.put_bytes("orders", "shared-id", b"order".to_vec())
			.await
			.unwrap();
		storage
			.put_bytes("users", "shared-id", b"user".to_vec())
			.await
			.unwrap();

		assert_eq!(
			storage.get_bytes("orders", "shared-id").await.unwrap(),
			b"order".to_vec()
		);
		assert_eq!(
			storage.get_bytes("users", "shared-id").await.unwrap(),
			b"user".to_vec()
		);

		let order_ids = storage.list_ids("orders").await.unwrap();
		assert_eq!(order_ids, vec!["shared-id".to_string()]);
	}

	#[tokio::test]
	async fn test_swap_requires_expected_bytes() {
		let storage = MemoryStorage::new();

		storage
			.put_bytes("orders", "o1", b"v1".to_vec())
			.await
			.unwrap();

		// Swap with the right expectation succeeds
		storage
			.swap_bytes("orders", "o1", b"v1", b"v2".to_vec())
			.await
			.unwrap();

		// Swap based on the stale value fails and leaves v2 in place
		let result = storage.swap_bytes("orders", "o1", b"v1", b"v3".to_vec()).await;
		assert!(matches!(result, Err(StorageError::Conflict)));
		assert_eq!(
			storage.get_bytes("orders", "o1").await.unwrap(),
			b"v2".to_vec()
		);

		// Swap on a missing record reports NotFound
		let missing = storage.swap_bytes("orders", "gone", b"v1", b"v2".to_vec()).await;
		assert!(matches!(missing, Err(StorageError::NotFound)));
	}
}
