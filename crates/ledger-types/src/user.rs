//! Identity types for the order ledger system.
//!
//! Users carry a single role tag rather than an inheritance hierarchy;
//! the role determines which order operations a user may appear in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user within the platform.
///
/// A user's role is assigned at signup and is immutable as far as the
/// ledger is concerned: the ledger only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
	/// Places orders.
	Customer,
	/// Owns one or more restaurants and manages their orders.
	RestaurantOwner,
	/// Delivers dispatched orders.
	DeliveryPerson,
}

impl fmt::Display for UserRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserRole::Customer => write!(f, "customer"),
			UserRole::RestaurantOwner => write!(f, "restaurant_owner"),
			UserRole::DeliveryPerson => write!(f, "delivery_person"),
		}
	}
}

/// A user record as read from the identity collaborator.
///
/// The ledger consumes users read-only: it validates roles against this
/// record but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Role tag controlling which order operations this user may appear in.
	pub role: UserRole,
	/// Profile address, if the user has stored one. Orders capture their
	/// own delivery address at checkout and never read this field.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}
