//! Storage module for the order ledger service.
//!
//! This module provides abstractions for persistent storage of ledger data,
//! supporting different backend implementations such as in-memory or
//! file-based storage. Records are addressed by (collection, id) so that
//! whole collections can be listed, and updates can be guarded by a
//! compare-and-swap so that concurrent read-modify-write cycles never
//! apply on top of a stale read.

use async_trait::async_trait;
use ledger_types::Collection;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a guarded write loses a race: the stored
	/// record changed after it was read.
	#[error("Conflict: record changed since it was read")]
	Conflict,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the ledger. It provides byte-level operations addressed
/// by collection and record id.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given record.
	async fn get_bytes(&self, collection: &str, id: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, creating or overwriting the record.
	async fn put_bytes(
		&self,
		collection: &str,
		id: &str,
		value: Vec<u8>,
	) -> Result<(), StorageError>;

	/// Replaces the record only if its stored bytes still equal `expected`.
	///
	/// Returns `StorageError::Conflict` when the stored bytes differ and
	/// `StorageError::NotFound` when the record no longer exists. The
	/// comparison and the write happen atomically with respect to other
	/// calls on the same backend instance.
	async fn swap_bytes(
		&self,
		collection: &str,
		id: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<(), StorageError>;

	/// Deletes the record. Deleting an absent record is not an error.
	async fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError>;

	/// Checks if a record exists.
	async fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError>;

	/// Returns the ids of every record in the collection, in no
	/// particular order.
	async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StorageError>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with
/// automatic serialization/deserialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value, creating or overwriting the record.
	///
	/// The data is serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		collection: Collection,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.put_bytes(collection.as_str(), id, bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		collection: Collection,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(collection.as_str(), id).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Replaces a record only if it still holds the previously-read value.
	///
	/// `current` must be the value as it was read from storage; `updated`
	/// is the value to write. Returns `StorageError::Conflict` when
	/// another writer got there first, which callers surface rather than
	/// retry.
	pub async fn update_guarded<T: Serialize>(
		&self,
		collection: Collection,
		id: &str,
		current: &T,
		updated: &T,
	) -> Result<(), StorageError> {
		let expected =
			serde_json::to_vec(current).map_err(|e| StorageError::Serialization(e.to_string()))?;
		let bytes =
			serde_json::to_vec(updated).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.swap_bytes(collection.as_str(), id, &expected, bytes)
			.await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
		self.backend.delete(collection.as_str(), id).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, collection: Collection, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(collection.as_str(), id).await
	}

	/// Retrieves and deserializes every record in a collection.
	///
	/// Records deleted between the id listing and the per-record reads
	/// are skipped.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		collection: Collection,
	) -> Result<Vec<T>, StorageError> {
		let ids = self.backend.list_ids(collection.as_str()).await?;
		let mut records = Vec::with_capacity(ids.len());
		for id in ids {
			match self.backend.get_bytes(collection.as_str(), &id).await {
				Ok(bytes) => {
					let record = serde_json::from_slice(&bytes)
						.map_err(|e| StorageError::Serialization(e.to_string()))?;
					records.push(record);
				},
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(records)
	}
}
