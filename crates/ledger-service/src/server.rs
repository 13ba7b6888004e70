//! HTTP server for the order ledger API.
//!
//! This module provides the HTTP surface over the order ledger:
//! creating orders, reading and listing them, moving them through the
//! status lifecycle, and managing delivery assignment.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use ledger_catalog::CatalogService;
use ledger_identity::IdentityService;
use ledger_order::OrderLedger;
use ledger_config::ApiConfig;
use ledger_types::{
	ApiError, AssignDeliveryRequest, CreateOrderRequest, ListOrdersQuery, Order,
	TransitionRequest,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// The order ledger behind every endpoint.
	pub ledger: Arc<OrderLedger>,
	/// Catalog lookups used by the authorization policy.
	pub catalog: Arc<CatalogService>,
	/// Identity lookups used to resolve acting users.
	pub identity: Arc<IdentityService>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the ledger endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	// Build the router with /api base path
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route(
					"/orders",
					post(handle_create_order).get(handle_list_orders),
				)
				.route("/orders/{id}", get(handle_get_order))
				.route("/orders/{id}/status", post(handle_transition_status))
				.route(
					"/orders/{id}/delivery-person",
					post(handle_assign_delivery),
				),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order ledger API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
///
/// Places an order for the given customer and returns the persisted
/// order, pending restaurant acceptance.
async fn handle_create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	match crate::apis::order::create_order(&state, request).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders/{id} requests.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::order::get_order(&state, &id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders requests.
///
/// Lists orders most recent first, optionally filtered by customer,
/// restaurant, delivery person, or status (at most one filter).
async fn handle_list_orders(
	State(state): State<AppState>,
	Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
	match crate::apis::order::list_orders(&state, query).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/status requests.
///
/// Moves an order to a new status on behalf of the acting user, after
/// the authorization policy and the transition table both agree.
async fn handle_transition_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::order::transition_status(&state, &id, request).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Status transition failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/delivery-person requests.
///
/// Assigns a delivery person to an order, or clears the assignment when
/// the body carries a null id.
async fn handle_assign_delivery(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<AssignDeliveryRequest>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::order::assign_delivery_person(&state, &id, request).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Delivery assignment failed: {}", e);
			Err(e)
		},
	}
}
