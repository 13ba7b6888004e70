//! Order ledger for the food-ordering platform.
//!
//! This module owns the order lifecycle: creation with price
//! snapshotting, the status state machine, delivery-person assignment,
//! and order listing. Catalog and identity data are consumed read-only
//! through their collaborator services; the ledger is the only writer of
//! order documents.

use chrono::Utc;
use ledger_catalog::{CatalogError, CatalogService};
use ledger_identity::{IdentityError, IdentityService};
use ledger_storage::{StorageError, StorageService};
use ledger_types::{
	Collection, CreateOrderRequest, Order, OrderFilter, OrderItem, OrderStatus, UserRole,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

pub mod pricing;
pub mod state;

pub use pricing::verify_total;

/// Errors that can occur during ledger operations.
///
/// `Integrity` indicates a bug rather than bad input: it is only
/// produced by the total-amount invariant check.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Error that occurs when create_order input fails validation.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// Error that occurs when a status change is not in the transition table.
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// Error that occurs when delivery assignment is requested at the
	/// wrong lifecycle stage.
	#[error("Delivery assignment not allowed while order is {status}")]
	InvalidAssignment { status: OrderStatus },
	/// Error that occurs when a referenced record is absent.
	#[error("Not found: {0}")]
	NotFound(String),
	/// Error that occurs when the total-amount invariant is violated.
	#[error("Integrity fault: {0}")]
	Integrity(String),
	/// Error that occurs when a concurrent update wins the write race.
	/// Never retried here; the caller decides whether to resubmit.
	#[error("Conflict: {0}")]
	Conflict(String),
	/// Error that occurs in the storage backend.
	#[error("Storage error: {0}")]
	Storage(String),
}

impl LedgerError {
	fn from_identity(err: IdentityError) -> Self {
		match err {
			IdentityError::NotFound(id) => LedgerError::NotFound(format!("user '{}'", id)),
			IdentityError::Storage(message) => LedgerError::Storage(message),
		}
	}

	fn from_catalog(err: CatalogError) -> Self {
		match err {
			CatalogError::NotFound(id) => {
				LedgerError::NotFound(format!("catalog record '{}'", id))
			},
			CatalogError::Storage(message) => LedgerError::Storage(message),
		}
	}
}

/// The order ledger service.
///
/// Owns order documents in storage and enforces the order lifecycle.
/// Actor authorization is deliberately not enforced here; the calling
/// layer decides who may request which operation, the ledger only
/// enforces state-machine legality and input validity.
pub struct OrderLedger {
	storage: Arc<StorageService>,
	catalog: Arc<CatalogService>,
	identity: Arc<IdentityService>,
}

impl OrderLedger {
	/// Creates a new OrderLedger over the given storage and collaborators.
	pub fn new(
		storage: Arc<StorageService>,
		catalog: Arc<CatalogService>,
		identity: Arc<IdentityService>,
	) -> Self {
		Self {
			storage,
			catalog,
			identity,
		}
	}

	/// Places an order: validates the cart, snapshots current prices,
	/// and persists the order with its line items as one document.
	///
	/// Duplicate menu item entries merge by summing quantity. The
	/// persisted total is the exact decimal sum of
	/// `price_at_order * quantity` over the resulting lines.
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, LedgerError> {
		if request.items.is_empty() {
			return Err(LedgerError::Validation(
				"Order must contain at least one item".into(),
			));
		}
		if request.delivery_address.trim().is_empty() {
			return Err(LedgerError::Validation(
				"Delivery address cannot be empty".into(),
			));
		}
		for line in &request.items {
			if line.quantity < 1 {
				return Err(LedgerError::Validation(format!(
					"Quantity for menu item '{}' must be at least 1",
					line.menu_item_id
				)));
			}
		}

		let customer = self
			.identity
			.get_user(&request.customer_id)
			.await
			.map_err(LedgerError::from_identity)?;
		if customer.role != UserRole::Customer {
			return Err(LedgerError::Validation(format!(
				"User '{}' has role '{}', only customers can place orders",
				customer.id, customer.role
			)));
		}

		let restaurant = self
			.catalog
			.get_restaurant(&request.restaurant_id)
			.await
			.map_err(LedgerError::from_catalog)?;
		if !restaurant.is_active {
			return Err(LedgerError::Validation(format!(
				"Restaurant '{}' is not accepting orders",
				restaurant.id
			)));
		}

		let merged = pricing::merge_line_requests(&request.items)?;

		let mut items = Vec::with_capacity(merged.len());
		for line in &merged {
			let menu_item = self
				.catalog
				.get_menu_item(&line.menu_item_id)
				.await
				.map_err(LedgerError::from_catalog)?;

			if menu_item.restaurant_id != restaurant.id {
				return Err(LedgerError::Validation(format!(
					"Menu item '{}' does not belong to restaurant '{}'",
					menu_item.id, restaurant.id
				)));
			}
			if !menu_item.is_available {
				return Err(LedgerError::Validation(format!(
					"Menu item '{}' is not available",
					menu_item.id
				)));
			}

			items.push(OrderItem {
				menu_item_id: menu_item.id,
				quantity: line.quantity,
				price_at_order: menu_item.price,
			});
		}

		let now = Utc::now();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			customer_id: customer.id,
			restaurant_id: restaurant.id,
			delivery_person_id: None,
			total_amount: pricing::order_total(&items),
			items,
			status: OrderStatus::Pending,
			delivery_address: request.delivery_address,
			created_at: now,
			updated_at: now,
			version: 1,
		};

		self.storage
			.store(Collection::Orders, &order.id, &order)
			.await
			.map_err(|e| LedgerError::Storage(e.to_string()))?;

		info!(
			"Created order {} for customer {} at restaurant {} (total {})",
			order.id, order.customer_id, order.restaurant_id, order.total_amount
		);
		Ok(order)
	}

	/// Gets an order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, LedgerError> {
		match self.storage.retrieve(Collection::Orders, order_id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => {
				Err(LedgerError::NotFound(format!("order '{}'", order_id)))
			},
			Err(e) => Err(LedgerError::Storage(e.to_string())),
		}
	}

	/// Moves an order to a new status after consulting the transition table.
	///
	/// A failed attempt leaves the order untouched. Line items and the
	/// total are never altered by a transition.
	pub async fn transition_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, LedgerError> {
		let current = self.get_order(order_id).await?;

		if !state::is_valid_transition(current.status, new_status) {
			return Err(LedgerError::InvalidTransition {
				from: current.status,
				to: new_status,
			});
		}

		let updated = self
			.update_order_with(&current, |order| {
				order.status = new_status;
			})
			.await?;

		info!(
			"Order {} moved from {} to {}",
			updated.id, current.status, updated.status
		);
		Ok(updated)
	}

	/// Assigns a delivery person to an order, or clears the assignment.
	///
	/// Assignment is only allowed while the order is accepted or
	/// preparing; assigning a courier to a not-yet-accepted or
	/// already-dispatched order is a contradiction. Clearing is allowed
	/// at any non-terminal status, e.g. when a courier drops out.
	pub async fn assign_delivery_person(
		&self,
		order_id: &str,
		delivery_person_id: Option<&str>,
	) -> Result<Order, LedgerError> {
		let current = self.get_order(order_id).await?;

		let assignment = match delivery_person_id {
			Some(id) => {
				if !state::allows_courier_assignment(current.status) {
					return Err(LedgerError::InvalidAssignment {
						status: current.status,
					});
				}
				let courier = self
					.identity
					.get_user(id)
					.await
					.map_err(LedgerError::from_identity)?;
				if courier.role != UserRole::DeliveryPerson {
					return Err(LedgerError::Validation(format!(
						"User '{}' has role '{}', only delivery people can be assigned",
						courier.id, courier.role
					)));
				}
				Some(courier.id)
			},
			None => {
				if current.status.is_terminal() {
					return Err(LedgerError::InvalidAssignment {
						status: current.status,
					});
				}
				None
			},
		};

		let updated = self
			.update_order_with(&current, |order| {
				order.delivery_person_id = assignment;
			})
			.await?;

		debug!(
			"Order {} delivery person set to {:?}",
			updated.id, updated.delivery_person_id
		);
		Ok(updated)
	}

	/// Lists orders matching the filter, most recent first.
	pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, LedgerError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(Collection::Orders)
			.await
			.map_err(|e| LedgerError::Storage(e.to_string()))?;

		orders.retain(|order| filter.matches(order));
		orders.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.id.cmp(&a.id))
		});
		Ok(orders)
	}

	/// Applies an update to an already-read order and persists it with
	/// the optimistic write guard.
	///
	/// Stamps `updated_at` and bumps `version`. Returns
	/// `LedgerError::Conflict` when another writer changed the order
	/// after `current` was read; the attempt is not retried.
	async fn update_order_with<F>(&self, current: &Order, updater: F) -> Result<Order, LedgerError>
	where
		F: FnOnce(&mut Order),
	{
		let mut updated = current.clone();
		updater(&mut updated);
		updated.updated_at = Utc::now();
		updated.version = current.version + 1;

		self.storage
			.update_guarded(Collection::Orders, &current.id, current, &updated)
			.await
			.map_err(|e| match e {
				StorageError::Conflict => LedgerError::Conflict(format!(
					"Order '{}' was modified concurrently",
					current.id
				)),
				StorageError::NotFound => {
					LedgerError::NotFound(format!("order '{}'", current.id))
				},
				e => LedgerError::Storage(e.to_string()),
			})?;

		Ok(updated)
	}
}
