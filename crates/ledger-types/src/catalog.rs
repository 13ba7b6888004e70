//! Catalog types for the order ledger system.
//!
//! Restaurants and menu items are owned by the catalog collaborator and
//! are strictly read-only from the ledger's perspective: the ledger
//! consults them at checkout to validate a cart and snapshot prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A restaurant from which food can be ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
	/// Unique identifier for this restaurant.
	pub id: String,
	/// The user who owns this restaurant. Must have the
	/// `restaurant_owner` role.
	pub owner_id: String,
	/// Name of the restaurant.
	pub name: String,
	/// Physical address of the restaurant.
	pub address: String,
	/// Whether the restaurant is currently accepting new orders.
	/// Inactive restaurants reject order creation.
	pub is_active: bool,
}

/// A food item on a restaurant's menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
	/// Unique identifier for this menu item.
	pub id: String,
	/// The restaurant this menu item belongs to.
	pub restaurant_id: String,
	/// Name of the menu item.
	pub name: String,
	/// Current price. Orders snapshot this value at checkout; later
	/// edits never affect existing orders.
	pub price: Decimal,
	/// Whether the item can currently be ordered.
	pub is_available: bool,
}
