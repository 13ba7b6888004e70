//! Storage-related types for the order ledger system.

/// Collections of persisted records.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
	/// User records (identity collaborator data).
	Users,
	/// Restaurant records (catalog collaborator data).
	Restaurants,
	/// Menu item records (catalog collaborator data).
	MenuItems,
	/// Order documents owned by the ledger.
	Orders,
}

impl Collection {
	/// Returns the string representation of the collection.
	pub fn as_str(&self) -> &'static str {
		match self {
			Collection::Users => "users",
			Collection::Restaurants => "restaurants",
			Collection::MenuItems => "menu_items",
			Collection::Orders => "orders",
		}
	}
}
