//! Order status state machine.
//!
//! The full lifecycle is
//! `pending -> accepted -> preparing -> out_for_delivery -> delivered`,
//! with cancellation possible from any pre-dispatch status. `delivered`
//! and `cancelled` are terminal. This table is the single authority on
//! which moves are legal; callers never check statuses ad hoc.

use ledger_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

// Static transition table - each status maps to allowed next statuses
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Accepted, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Accepted,
		HashSet::from([OrderStatus::Preparing, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Preparing,
		HashSet::from([OrderStatus::OutForDelivery, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::OutForDelivery,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Checks if a status transition is valid.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

/// Checks if a delivery person may be assigned at the given status.
///
/// Assignment only makes sense once the restaurant has taken the order
/// and before it leaves the kitchen.
pub fn allows_courier_assignment(status: OrderStatus) -> bool {
	matches!(status, OrderStatus::Accepted | OrderStatus::Preparing)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_forward_path() {
		assert!(is_valid_transition(
			OrderStatus::Pending,
			OrderStatus::Accepted
		));
		assert!(is_valid_transition(
			OrderStatus::Accepted,
			OrderStatus::Preparing
		));
		assert!(is_valid_transition(
			OrderStatus::Preparing,
			OrderStatus::OutForDelivery
		));
		assert!(is_valid_transition(
			OrderStatus::OutForDelivery,
			OrderStatus::Delivered
		));
	}

	#[test]
	fn test_no_skipping_or_back_edges() {
		assert!(!is_valid_transition(
			OrderStatus::Pending,
			OrderStatus::OutForDelivery
		));
		assert!(!is_valid_transition(
			OrderStatus::Pending,
			OrderStatus::Delivered
		));
		assert!(!is_valid_transition(
			OrderStatus::Accepted,
			OrderStatus::Pending
		));
		assert!(!is_valid_transition(
			OrderStatus::OutForDelivery,
			OrderStatus::Preparing
		));
	}

	#[test]
	fn test_cancellation_window() {
		assert!(is_valid_transition(
			OrderStatus::Pending,
			OrderStatus::Cancelled
		));
		assert!(is_valid_transition(
			OrderStatus::Accepted,
			OrderStatus::Cancelled
		));
		assert!(is_valid_transition(
			OrderStatus::Preparing,
			OrderStatus::Cancelled
		));
		// Cancellation closes once the order is out the door
		assert!(!is_valid_transition(
			OrderStatus::OutForDelivery,
			OrderStatus::Cancelled
		));
	}

	#[test]
	fn test_terminal_statuses_allow_nothing() {
		for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
			for target in OrderStatus::all() {
				assert!(
					!is_valid_transition(terminal, target),
					"{} -> {} should be rejected",
					terminal,
					target
				);
			}
		}
	}

	#[test]
	fn test_self_transitions_rejected() {
		for status in OrderStatus::all() {
			assert!(!is_valid_transition(status, status));
		}
	}

	#[test]
	fn test_courier_assignment_window() {
		assert!(!allows_courier_assignment(OrderStatus::Pending));
		assert!(allows_courier_assignment(OrderStatus::Accepted));
		assert!(allows_courier_assignment(OrderStatus::Preparing));
		assert!(!allows_courier_assignment(OrderStatus::OutForDelivery));
		assert!(!allows_courier_assignment(OrderStatus::Delivered));
		assert!(!allows_courier_assignment(OrderStatus::Cancelled));
	}
}
