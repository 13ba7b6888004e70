//! Identity module for the order ledger system.
//!
//! This module provides read access to user records and their roles. The
//! ledger consults it to validate that the right kind of user appears in
//! each order operation; it never writes identity data.

use async_trait::async_trait;
use ledger_types::User;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod store;
}

/// Errors that can occur during identity lookups.
#[derive(Debug, Error)]
pub enum IdentityError {
	/// Error that occurs when the requested user does not exist.
	#[error("User not found: {0}")]
	NotFound(String),
	/// Error that occurs in the backing store.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Trait defining the interface for identity providers.
///
/// This trait must be implemented by any identity source that wants to
/// integrate with the ledger. In this repository users live in the shared
/// storage layer; a deployment fronted by a separate identity service
/// would implement this trait against that service instead.
#[async_trait]
pub trait IdentityInterface: Send + Sync {
	/// Retrieves a user by id.
	async fn user(&self, id: &str) -> Result<User, IdentityError>;
}

/// Service that manages identity lookups.
///
/// This struct provides a high-level interface for identity access,
/// wrapping an underlying identity implementation.
pub struct IdentityService {
	/// The underlying identity implementation.
	implementation: Box<dyn IdentityInterface>,
}

impl IdentityService {
	/// Creates a new IdentityService with the specified implementation.
	pub fn new(implementation: Box<dyn IdentityInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves a user by id.
	pub async fn get_user(&self, id: &str) -> Result<User, IdentityError> {
		self.implementation.user(id).await
	}
}
