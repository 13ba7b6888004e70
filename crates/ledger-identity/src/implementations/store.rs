//! Storage-backed identity implementation.
//!
//! Reads user records from the shared storage layer's `users` collection.

use crate::{IdentityError, IdentityInterface};
use async_trait::async_trait;
use ledger_storage::{StorageError, StorageService};
use ledger_types::{Collection, User};
use std::sync::Arc;

/// Identity provider backed by the shared storage layer.
pub struct StoreIdentity {
	storage: Arc<StorageService>,
}

impl StoreIdentity {
	/// Creates a new StoreIdentity reading from the given storage service.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl IdentityInterface for StoreIdentity {
	async fn user(&self, id: &str) -> Result<User, IdentityError> {
		match self.storage.retrieve(Collection::Users, id).await {
			Ok(user) => Ok(user),
			Err(StorageError::NotFound) => Err(IdentityError::NotFound(id.to_string())),
			Err(e) => Err(IdentityError::Storage(e.to_string())),
		}
	}
}

/// Creates a storage-backed identity provider.
pub fn create_identity(storage: Arc<StorageService>) -> Box<dyn IdentityInterface> {
	Box::new(StoreIdentity::new(storage))
}
