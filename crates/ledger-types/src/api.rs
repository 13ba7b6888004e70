//! API types for the order ledger HTTP API.
//!
//! This module defines the request and response types for the ledger's
//! endpoints, plus the structured error type the handlers return.

use crate::{LineRequest, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// The customer placing the order. Must have the `customer` role.
	pub customer_id: String,
	/// The restaurant to order from. Must be active.
	pub restaurant_id: String,
	/// Where the order should be delivered.
	pub delivery_address: String,
	/// The cart: at least one line, quantities at least 1.
	pub items: Vec<LineRequest>,
}

/// Request body for moving an order to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
	/// The status to move to.
	pub status: OrderStatus,
	/// The user requesting the transition; checked against the
	/// authorization policy before the ledger is consulted.
	pub actor_id: String,
}

/// Request body for assigning or clearing an order's delivery person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDeliveryRequest {
	/// The delivery person to assign, or null to clear the assignment.
	pub delivery_person_id: Option<String>,
	/// The user requesting the change.
	pub actor_id: String,
}

/// Query parameters accepted when listing orders.
///
/// At most one filter may be supplied per request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
	/// Filter by the customer who placed the order.
	pub customer: Option<String>,
	/// Filter by the restaurant the order was placed with.
	pub restaurant: Option<String>,
	/// Filter by the assigned delivery person.
	pub delivery_person: Option<String>,
	/// Filter by current status.
	pub status: Option<OrderStatus>,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed request (400).
	BadRequest(String),
	/// The acting user is not allowed to perform this operation (403).
	Forbidden(String),
	/// A referenced record does not exist (404).
	NotFound(String),
	/// Illegal state change or a concurrent update won the race (409).
	Conflict(String),
	/// Well-formed request rejected by business rules (422).
	UnprocessableEntity(String),
	/// Internal server error (500).
	Internal(String),
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest(_) => 400,
			ApiError::Forbidden(_) => 403,
			ApiError::NotFound(_) => 404,
			ApiError::Conflict(_) => 409,
			ApiError::UnprocessableEntity(_) => 422,
			ApiError::Internal(_) => 500,
		}
	}

	/// The stable error code reported in the response body.
	pub fn error_code(&self) -> &'static str {
		match self {
			ApiError::BadRequest(_) => "BAD_REQUEST",
			ApiError::Forbidden(_) => "FORBIDDEN",
			ApiError::NotFound(_) => "NOT_FOUND",
			ApiError::Conflict(_) => "CONFLICT",
			ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
			ApiError::Internal(_) => "INTERNAL_ERROR",
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::BadRequest(message)
			| ApiError::Forbidden(message)
			| ApiError::NotFound(message)
			| ApiError::Conflict(message)
			| ApiError::UnprocessableEntity(message)
			| ApiError::Internal(message) => message.clone(),
		};

		ErrorResponse {
			error: self.error_code().to_string(),
			message,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let response = self.to_error_response();
		write!(f, "{}: {}", response.error, response.message)
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		(status, Json(self.to_error_response())).into_response()
	}
}
