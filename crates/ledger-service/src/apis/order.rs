//! Order API implementation.
//!
//! This module implements the order endpoints for the ledger API. It
//! resolves acting users, applies the authorization policy, translates
//! ledger errors into HTTP error responses, and otherwise delegates to
//! the order ledger.

use crate::apis::policy;
use crate::server::AppState;
use ledger_identity::IdentityError;
use ledger_order::LedgerError;
use ledger_types::{
	ApiError, AssignDeliveryRequest, CreateOrderRequest, ListOrdersQuery, Order, OrderFilter,
	Restaurant, TransitionRequest, User,
};

/// Places an order.
pub async fn create_order(
	state: &AppState,
	request: CreateOrderRequest,
) -> Result<Order, ApiError> {
	state
		.ledger
		.create_order(request)
		.await
		.map_err(into_api_error)
}

/// Retrieves an order by id.
pub async fn get_order(state: &AppState, order_id: &str) -> Result<Order, ApiError> {
	state
		.ledger
		.get_order(order_id)
		.await
		.map_err(into_api_error)
}

/// Lists orders, most recent first, with at most one filter applied.
pub async fn list_orders(
	state: &AppState,
	query: ListOrdersQuery,
) -> Result<Vec<Order>, ApiError> {
	let filter = filter_from_query(query)?;
	state
		.ledger
		.list_orders(&filter)
		.await
		.map_err(into_api_error)
}

/// Moves an order to a new status on behalf of an acting user.
pub async fn transition_status(
	state: &AppState,
	order_id: &str,
	request: TransitionRequest,
) -> Result<Order, ApiError> {
	let (actor, order, restaurant) = resolve_operation(state, order_id, &request.actor_id).await?;

	policy::authorize_transition(&actor, &order, &restaurant, request.status)?;

	state
		.ledger
		.transition_status(order_id, request.status)
		.await
		.map_err(into_api_error)
}

/// Assigns or clears an order's delivery person on behalf of an acting user.
pub async fn assign_delivery_person(
	state: &AppState,
	order_id: &str,
	request: AssignDeliveryRequest,
) -> Result<Order, ApiError> {
	let (actor, order, restaurant) = resolve_operation(state, order_id, &request.actor_id).await?;

	let clearing = request.delivery_person_id.is_none();
	policy::authorize_assignment(&actor, &order, &restaurant, clearing)?;

	state
		.ledger
		.assign_delivery_person(order_id, request.delivery_person_id.as_deref())
		.await
		.map_err(into_api_error)
}

/// Resolves the acting user, the order, and its restaurant for a
/// lifecycle operation.
///
/// The policy check runs against this read; the ledger's own write guard
/// handles the race where the order changes in between.
async fn resolve_operation(
	state: &AppState,
	order_id: &str,
	actor_id: &str,
) -> Result<(User, Order, Restaurant), ApiError> {
	let actor = state.identity.get_user(actor_id).await.map_err(|e| match e {
		IdentityError::NotFound(id) => ApiError::Forbidden(format!("Unknown acting user '{}'", id)),
		IdentityError::Storage(message) => ApiError::Internal(message),
	})?;

	let order = state
		.ledger
		.get_order(order_id)
		.await
		.map_err(into_api_error)?;

	// The order always references a restaurant; a missing one is a data
	// fault, not a client error.
	let restaurant = state
		.catalog
		.get_restaurant(&order.restaurant_id)
		.await
		.map_err(|e| {
			ApiError::Internal(format!(
				"Order {} references missing restaurant: {}",
				order.id, e
			))
		})?;

	Ok((actor, order, restaurant))
}

/// Builds an order filter from query parameters, rejecting combinations.
fn filter_from_query(query: ListOrdersQuery) -> Result<OrderFilter, ApiError> {
	let mut filters = Vec::new();

	if let Some(customer) = query.customer {
		filters.push(OrderFilter::Customer(customer));
	}
	if let Some(restaurant) = query.restaurant {
		filters.push(OrderFilter::Restaurant(restaurant));
	}
	if let Some(delivery_person) = query.delivery_person {
		filters.push(OrderFilter::DeliveryPerson(delivery_person));
	}
	if let Some(status) = query.status {
		filters.push(OrderFilter::Status(status));
	}

	match filters.len() {
		0 => Ok(OrderFilter::All),
		1 => Ok(filters.remove(0)),
		_ => Err(ApiError::BadRequest(
			"At most one of customer, restaurant, delivery_person, status may be given".into(),
		)),
	}
}

/// Translates ledger errors into HTTP error responses.
fn into_api_error(err: LedgerError) -> ApiError {
	match err {
		LedgerError::Validation(message) => ApiError::UnprocessableEntity(message),
		LedgerError::InvalidTransition { .. } | LedgerError::InvalidAssignment { .. } => {
			ApiError::Conflict(err.to_string())
		},
		LedgerError::NotFound(message) => ApiError::NotFound(message),
		LedgerError::Conflict(message) => ApiError::Conflict(message),
		LedgerError::Integrity(message) | LedgerError::Storage(message) => {
			ApiError::Internal(message)
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ledger_types::OrderStatus;

	fn query(
		customer: Option<&str>,
		status: Option<OrderStatus>,
	) -> ListOrdersQuery {
		ListOrdersQuery {
			customer: customer.map(String::from),
			restaurant: None,
			delivery_person: None,
			status,
		}
	}

	#[test]
	fn test_filter_from_query() {
		assert_eq!(filter_from_query(query(None, None)).unwrap(), OrderFilter::All);
		assert_eq!(
			filter_from_query(query(Some("cust-1"), None)).unwrap(),
			OrderFilter::Customer("cust-1".into())
		);

		let rejected = filter_from_query(query(Some("cust-1"), Some(OrderStatus::Pending)));
		assert!(matches!(rejected, Err(ApiError::BadRequest(_))));
	}

	#[test]
	fn test_ledger_error_mapping() {
		let conflict = into_api_error(LedgerError::InvalidTransition {
			from: OrderStatus::Pending,
			to: OrderStatus::Delivered,
		});
		assert_eq!(conflict.status_code(), 409);

		assert_eq!(
			into_api_error(LedgerError::Validation("bad".into())).status_code(),
			422
		);
		assert_eq!(
			into_api_error(LedgerError::NotFound("gone".into())).status_code(),
			404
		);
		assert_eq!(
			into_api_error(LedgerError::Integrity("broken".into())).status_code(),
			500
		);
	}
}
