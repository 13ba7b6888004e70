//! Authorization policy for order lifecycle operations.
//!
//! The ledger itself only enforces state-machine legality; who may
//! request which change is decided here, at the service boundary:
//!
//! - `accepted` / `preparing`: the owner of the order's restaurant
//! - `out_for_delivery`: the owner or the assigned delivery person
//! - `delivered`: the assigned delivery person
//! - `cancelled`: the customer while the order is still pending, or the
//!   owner at any cancellable status
//! - assignment: the owner; clearing additionally by the assigned
//!   delivery person dropping out

use ledger_types::{ApiError, Order, OrderStatus, Restaurant, User};

/// Checks whether the actor may move the order to the requested status.
pub fn authorize_transition(
	actor: &User,
	order: &Order,
	restaurant: &Restaurant,
	new_status: OrderStatus,
) -> Result<(), ApiError> {
	let allowed = match new_status {
		OrderStatus::Accepted | OrderStatus::Preparing => is_owner(actor, restaurant),
		OrderStatus::OutForDelivery => {
			is_owner(actor, restaurant) || is_assigned_courier(actor, order)
		},
		OrderStatus::Delivered => is_assigned_courier(actor, order),
		OrderStatus::Cancelled => {
			(actor.id == order.customer_id && order.status == OrderStatus::Pending)
				|| is_owner(actor, restaurant)
		},
		// Orders are created pending and never move back there
		OrderStatus::Pending => false,
	};

	if allowed {
		Ok(())
	} else {
		Err(ApiError::Forbidden(format!(
			"User '{}' may not move order '{}' to {}",
			actor.id, order.id, new_status
		)))
	}
}

/// Checks whether the actor may assign or clear the order's delivery person.
pub fn authorize_assignment(
	actor: &User,
	order: &Order,
	restaurant: &Restaurant,
	clearing: bool,
) -> Result<(), ApiError> {
	let allowed =
		is_owner(actor, restaurant) || (clearing && is_assigned_courier(actor, order));

	if allowed {
		Ok(())
	} else {
		Err(ApiError::Forbidden(format!(
			"User '{}' may not change the delivery person of order '{}'",
			actor.id, order.id
		)))
	}
}

fn is_owner(actor: &User, restaurant: &Restaurant) -> bool {
	actor.id == restaurant.owner_id
}

fn is_assigned_courier(actor: &User, order: &Order) -> bool {
	order.delivery_person_id.as_deref() == Some(actor.id.as_str())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use ledger_types::UserRole;
	use rust_decimal::Decimal;

	fn user(id: &str, role: UserRole) -> User {
		User {
			id: id.to_string(),
			name: id.to_string(),
			role,
			address: None,
		}
	}

	fn restaurant() -> Restaurant {
		Restaurant {
			id: "r1".into(),
			owner_id: "owner-1".into(),
			name: "Spice Garden".into(),
			address: "1 Main St".into(),
			is_active: true,
		}
	}

	fn order(status: OrderStatus, delivery_person_id: Option<&str>) -> Order {
		let now = Utc::now();
		Order {
			id: "o1".into(),
			customer_id: "cust-1".into(),
			restaurant_id: "r1".into(),
			delivery_person_id: delivery_person_id.map(String::from),
			items: Vec::new(),
			total_amount: Decimal::ZERO,
			status,
			delivery_address: "22 Elm St".into(),
			created_at: now,
			updated_at: now,
			version: 1,
		}
	}

	#[test]
	fn test_owner_runs_the_kitchen_side() {
		let owner = user("owner-1", UserRole::RestaurantOwner);
		let order = order(OrderStatus::Pending, None);

		assert!(
			authorize_transition(&owner, &order, &restaurant(), OrderStatus::Accepted).is_ok()
		);
		assert!(
			authorize_transition(&owner, &order, &restaurant(), OrderStatus::Preparing).is_ok()
		);
		assert!(
			authorize_transition(&owner, &order, &restaurant(), OrderStatus::Cancelled).is_ok()
		);
	}

	#[test]
	fn test_customer_may_only_cancel_while_pending() {
		let customer = user("cust-1", UserRole::Customer);

		let pending = order(OrderStatus::Pending, None);
		assert!(
			authorize_transition(&customer, &pending, &restaurant(), OrderStatus::Cancelled)
				.is_ok()
		);
		assert!(authorize_transition(
			&customer,
			&pending,
			&restaurant(),
			OrderStatus::Accepted
		)
		.is_err());

		let preparing = order(OrderStatus::Preparing, None);
		assert!(authorize_transition(
			&customer,
			&preparing,
			&restaurant(),
			OrderStatus::Cancelled
		)
		.is_err());
	}

	#[test]
	fn test_courier_completes_the_delivery_side() {
		let courier = user("courier-1", UserRole::DeliveryPerson);
		let assigned = order(OrderStatus::Preparing, Some("courier-1"));

		assert!(authorize_transition(
			&courier,
			&assigned,
			&restaurant(),
			OrderStatus::OutForDelivery
		)
		.is_ok());
		assert!(
			authorize_transition(&courier, &assigned, &restaurant(), OrderStatus::Delivered)
				.is_ok()
		);

		// A different courier has no claim on this order
		let stranger = user("courier-2", UserRole::DeliveryPerson);
		assert!(authorize_transition(
			&stranger,
			&assigned,
			&restaurant(),
			OrderStatus::Delivered
		)
		.is_err());

		// The owner hands orders over but does not mark them delivered
		let owner = user("owner-1", UserRole::RestaurantOwner);
		assert!(
			authorize_transition(&owner, &assigned, &restaurant(), OrderStatus::Delivered)
				.is_err()
		);
	}

	#[test]
	fn test_assignment_rights() {
		let owner = user("owner-1", UserRole::RestaurantOwner);
		let courier = user("courier-1", UserRole::DeliveryPerson);
		let accepted = order(OrderStatus::Accepted, Some("courier-1"));

		assert!(authorize_assignment(&owner, &accepted, &restaurant(), false).is_ok());
		assert!(authorize_assignment(&owner, &accepted, &restaurant(), true).is_ok());

		// The assigned courier may drop out but not reassign
		assert!(authorize_assignment(&courier, &accepted, &restaurant(), true).is_ok());
		assert!(authorize_assignment(&courier, &accepted, &restaurant(), false).is_err());

		let customer = user("cust-1", UserRole::Customer);
		assert!(authorize_assignment(&customer, &accepted, &restaurant(), false).is_err());
	}
}
