//! Cart merging and exact-decimal total computation.
//!
//! All money math happens in `rust_decimal::Decimal`; floating point is
//! never involved, so totals carry no rounding drift.

use crate::LedgerError;
use ledger_types::{LineRequest, Order, OrderItem};
use rust_decimal::Decimal;

/// Merges duplicate menu item entries by summing their quantities.
///
/// First-seen order of the lines is preserved. This is what enforces the
/// one-line-per-menu-item rule: repeated selection grows the existing
/// line instead of creating a duplicate.
pub fn merge_line_requests(lines: &[LineRequest]) -> Result<Vec<LineRequest>, LedgerError> {
	let mut merged: Vec<LineRequest> = Vec::with_capacity(lines.len());

	for line in lines {
		match merged
			.iter_mut()
			.find(|existing| existing.menu_item_id == line.menu_item_id)
		{
			Some(existing) => {
				existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
					LedgerError::Validation(format!(
						"Quantity overflow for menu item '{}'",
						line.menu_item_id
					))
				})?;
			},
			None => merged.push(line.clone()),
		}
	}

	Ok(merged)
}

/// Computes the exact total of the given line items.
pub fn order_total(items: &[OrderItem]) -> Decimal {
	items.iter().fold(Decimal::ZERO, |total, item| {
		total + item.price_at_order * Decimal::from(item.quantity)
	})
}

/// Checks the total-amount invariant of a persisted order.
///
/// `total_amount` must always equal the sum of
/// `price_at_order * quantity` over the order's items. A divergence is a
/// data-integrity fault, never a normal runtime condition.
pub fn verify_total(order: &Order) -> Result<(), LedgerError> {
	let computed = order_total(&order.items);
	if computed != order.total_amount {
		return Err(LedgerError::Integrity(format!(
			"Order {} records total {} but its items sum to {}",
			order.id, order.total_amount, computed
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn line(menu_item_id: &str, quantity: u32) -> LineRequest {
		LineRequest {
			menu_item_id: menu_item_id.to_string(),
			quantity,
		}
	}

	fn item(menu_item_id: &str, quantity: u32, price: &str) -> OrderItem {
		OrderItem {
			menu_item_id: menu_item_id.to_string(),
			quantity,
			price_at_order: Decimal::from_str(price).unwrap(),
		}
	}

	#[test]
	fn test_merge_preserves_first_seen_order() {
		let merged =
			merge_line_requests(&[line("b", 1), line("a", 2), line("b", 3)]).unwrap();

		assert_eq!(merged, vec![line("b", 4), line("a", 2)]);
	}

	#[test]
	fn test_merge_overflow_rejected() {
		let result = merge_line_requests(&[line("a", u32::MAX), line("a", 1)]);
		assert!(matches!(result, Err(LedgerError::Validation(_))));
	}

	#[test]
	fn test_total_is_exact_decimal() {
		let items = vec![item("a", 2, "5.00"), item("b", 1, "3.50")];
		assert_eq!(order_total(&items), Decimal::from_str("13.50").unwrap());

		// Sums that drift under binary floating point stay exact here
		let items = vec![item("a", 3, "0.10"), item("b", 1, "0.20")];
		assert_eq!(order_total(&items), Decimal::from_str("0.50").unwrap());
	}

	#[test]
	fn test_total_of_empty_cart_is_zero() {
		assert_eq!(order_total(&[]), Decimal::ZERO);
	}
}
