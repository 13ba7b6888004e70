//! File-based storage backend implementation for the ledger service.
//!
//! This module stores each record as a JSON file under
//! `<base>/<collection>/<id>.json`, providing simple persistence without
//! external dependencies. Writes go through a temp-file-plus-rename so a
//! crash never leaves a half-written record behind.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// File-based storage implementation.
///
/// Guarded swaps are serialized by an in-process mutex; the exclusive
/// lock on the data directory guarantees no second process shares the
/// directory, so the mutex is the only writer coordination needed.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// Serializes read-compare-write cycles within this process.
	swap_guard: Mutex<()>,
	/// Exclusive lock on the data directory, held for the lifetime of
	/// this instance.
	_dir_lock: std::fs::File,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at the given path.
	///
	/// Creates the directory if needed and takes an exclusive lock on it;
	/// fails if another process already holds the lock.
	pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
		std::fs::create_dir_all(&base_path).map_err(|e| StorageError::Backend(e.to_string()))?;

		let lock_path = base_path.join("LOCK");
		let dir_lock = std::fs::OpenOptions::new()
			.create(true)
			.truncate(false)
			.write(true)
			.open(&lock_path)
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		dir_lock.try_lock_exclusive().map_err(|_| {
			StorageError::Backend(format!(
				"Data directory {} is locked by another process",
				base_path.display()
			))
		})?;

		Ok(Self {
			base_path,
			swap_guard: Mutex::new(()),
			_dir_lock: dir_lock,
		})
	}

	/// Converts a collection and id to a filesystem-safe file path.
	fn record_path(&self, collection: &str, id: &str) -> PathBuf {
		let safe_id = id.replace(['/', '\\', ':'], "_");
		self.base_path
			.join(collection)
			.join(format!("{}.json", safe_id))
	}

	/// Writes bytes atomically by writing to a temp file then renaming.
	async fn write_atomic(&self, path: &PathBuf, value: Vec<u8>) -> Result<(), StorageError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	/// Reads a record, mapping a missing file to NotFound.
	async fn read_record(&self, collection: &str, id: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.record_path(collection, id);
		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, collection: &str, id: &str) -> Result<Vec<u8>, StorageError> {
		self.read_record(collection, id).await
	}

	async fn put_bytes(
		&self,
		collection: &str,
		id: &str,
		value: Vec<u8>,
	) -> Result<(), StorageError> {
		let path = self.record_path(collection, id);
		self.write_atomic(&path, value).await
	}

	async fn swap_bytes(
		&self,
		collection: &str,
		id: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<(), StorageError> {
		let _guard = self.swap_guard.lock().await;

		let current = self.read_record(collection, id).await?;
		if current.as_slice() != expected {
			return Err(StorageError::Conflict);
		}

		let path = self.record_path(collection, id);
		self.write_atomic(&path, value).await
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
		let path = self.record_path(collection, id);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
		let path = self.record_path(collection, id);
		Ok(path.exists())
	}

	async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.base_path.join(collection);

		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut ids = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				tracing::debug!("Skipping non-record file {:?}", path);
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
				ids.push(stem.to_string());
			}
		}
		Ok(ids)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = match config.get("storage_path") {
		None => "./data/storage".to_string(),
		Some(value) => value
			.as_str()
			.ok_or_else(|| {
				StorageError::Configuration("storage_path must be a string".into())
			})?
			.to_string(),
	};

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_basic_operations() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

		let value = b"test_value".to_vec();
		storage
			.put_bytes("orders", "o1", value.clone())
			.await
			.unwrap();

		let retrieved = storage.get_bytes("orders", "o1").await.unwrap();
		assert_eq!(retrieved, value);

		assert!(storage.exists("orders", "o1").await.unwrap());

		storage.delete("orders", "o1").await.unwrap();
		assert!(!storage.exists("orders", "o1").await.unwrap());

		let result = storage.get_bytes("orders", "o1").await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_records_survive_reopen() {
		let temp_dir = TempDir::new().unwrap();

		{
			let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();
			storage
				.put_bytes("orders", "o1", b"persisted".to_vec())
				.await
				.unwrap();
		}

		let reopened = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();
		let retrieved = reopened.get_bytes("orders", "o1").await.unwrap();
		assert_eq!(retrieved, b"persisted".to_vec());
	}

	#[tokio::test]
	async fn test_swap_requires_expected_bytes() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

		storage
			.put_bytes("orders", "o1", b"v1".to_vec())
			.await
			.unwrap();

		storage
			.swap_bytes("orders", "o1", b"v1", b"v2".to_vec())
			.await
			.unwrap();

		let result = storage.swap_bytes("orders", "o1", b"v1", b"v3".to_vec()).await;
		assert!(matches!(result, Err(StorageError::Conflict)));
		assert_eq!(
			storage.get_bytes("orders", "o1").await.unwrap(),
			b"v2".to_vec()
		);
	}

	#[tokio::test]
	async fn test_list_ids_ignores_foreign_files() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path().to_path_buf()).unwrap();

		storage
			.put_bytes("orders", "o1", b"v1".to_vec())
			.await
			.unwrap();
		storage
			.put_bytes("orders", "o2", b"v2".to_vec())
			.await
			.unwrap();
		std::fs::write(temp_dir.path().join("orders").join("notes.txt"), b"x").unwrap();

		let mut ids = storage.list_ids("orders").await.unwrap();
		ids.sort();
		assert_eq!(ids, vec!["o1".to_string(), "o2".to_string()]);

		// An unknown collection lists as empty
		let empty = storage.list_ids("users").await.unwrap();
		assert!(empty.is_empty());
	}
}
