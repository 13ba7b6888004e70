//! Order types for the ledger system.
//!
//! This module defines the order document, its line items, the status
//! lifecycle, and the filters used when listing orders. An order embeds
//! its line items so that header and lines are always written as one
//! unit and line items can never be observed without their order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an order in the ledger.
///
/// Statuses advance along a fixed lifecycle; `Delivered` and `Cancelled`
/// are terminal. The transition table lives in the ledger crate and is
/// the single authority on which moves are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Placed by the customer, awaiting restaurant acceptance.
	Pending,
	/// Accepted by the restaurant.
	Accepted,
	/// The restaurant is preparing the food.
	Preparing,
	/// Handed to a delivery person.
	OutForDelivery,
	/// Delivered to the customer. Terminal.
	Delivered,
	/// Cancelled before dispatch. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Returns true when no further transition is permitted from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}

	/// Returns an iterator over all status variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Accepted,
			Self::Preparing,
			Self::OutForDelivery,
			Self::Delivered,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Accepted => write!(f, "accepted"),
			OrderStatus::Preparing => write!(f, "preparing"),
			OrderStatus::OutForDelivery => write!(f, "out_for_delivery"),
			OrderStatus::Delivered => write!(f, "delivered"),
			OrderStatus::Cancelled => write!(f, "cancelled"),
		}
	}
}

/// A single line of an order.
///
/// `price_at_order` is a snapshot of the menu item's price at the moment
/// the order was placed and is never recomputed from the live catalog.
/// Line items are immutable once the order exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	/// The menu item ordered. A plain reference: the line survives later
	/// catalog edits and deletions.
	pub menu_item_id: String,
	/// Quantity ordered, at least 1. Duplicate selections of the same
	/// item merge into one line by summing quantity.
	pub quantity: u32,
	/// Price of one unit at the time the order was placed.
	pub price_at_order: Decimal,
}

/// A customer's food order.
///
/// Orders are created atomically with their line items and thereafter
/// mutated only through status transitions and delivery-person
/// assignment. `total_amount` always equals the sum of
/// `price_at_order * quantity` over `items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// The customer who placed the order. Immutable after creation.
	pub customer_id: String,
	/// The restaurant the order was placed with. Immutable after creation.
	pub restaurant_id: String,
	/// The delivery person assigned to this order, if any. Cleared when
	/// the referenced user leaves the system; the order itself survives.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_person_id: Option<String>,
	/// Line items, fixed at creation.
	pub items: Vec<OrderItem>,
	/// Exact decimal total of the line items.
	pub total_amount: Decimal,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Address captured at order time; may differ from the customer's
	/// profile address.
	pub delivery_address: String,
	/// Timestamp when the order was placed.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the last mutation.
	pub updated_at: DateTime<Utc>,
	/// Mutation counter backing the optimistic write guard. Incremented
	/// on every successful update.
	pub version: u64,
}

/// One requested line of a cart at checkout, before validation and
/// price snapshotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
	/// The menu item to order.
	pub menu_item_id: String,
	/// Requested quantity, at least 1.
	pub quantity: u32,
}

/// Filter applied when listing orders.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderFilter {
	/// No filtering; every order.
	All,
	/// Orders placed by the given customer.
	Customer(String),
	/// Orders placed with the given restaurant.
	Restaurant(String),
	/// Orders assigned to the given delivery person.
	DeliveryPerson(String),
	/// Orders currently in the given status.
	Status(OrderStatus),
}

impl OrderFilter {
	/// Returns true when the order matches this filter.
	pub fn matches(&self, order: &Order) -> bool {
		match self {
			OrderFilter::All => true,
			OrderFilter::Customer(id) => order.customer_id == *id,
			OrderFilter::Restaurant(id) => order.restaurant_id == *id,
			OrderFilter::DeliveryPerson(id) => order.delivery_person_id.as_deref() == Some(id),
			OrderFilter::Status(status) => order.status == *status,
		}
	}
}
