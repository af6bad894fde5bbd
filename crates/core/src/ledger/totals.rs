//! Derived monetary totals.

use serde::Serialize;

use crate::order::LineItem;
use crate::types::Money;

/// Subtotal and total derived from line items, fee and discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Money,
    pub total: Money,
}

/// Recomputes totals from scratch.
///
/// Each line subtotal is re-derived as `unit_price * quantity`; stored line
/// subtotals are not trusted. `total = subtotal + delivery_fee - discount`
/// and may come out negative; callers decide whether that is acceptable.
///
/// Returns `None` if any step overflows.
#[must_use]
pub fn compute_totals(items: &[LineItem], delivery_fee: Money, discount: Money) -> Option<Totals> {
    let subtotal = items.iter().try_fold(Money::ZERO, |acc, item| {
        acc.checked_add(item.unit_price.checked_mul(item.quantity)?)
    })?;
    let total = subtotal.checked_add(delivery_fee)?.checked_sub(discount)?;
    Some(Totals { subtotal, total })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::MenuItemId;

    fn line(cents: i64, quantity: u32) -> LineItem {
        LineItem {
            menu_item_id: MenuItemId::new(1),
            name: "item".to_string(),
            unit_price: Money::from_cents(cents),
            quantity,
            note: None,
            // Deliberately wrong to prove it is ignored
            subtotal: Money::from_cents(1),
        }
    }

    #[test]
    fn test_burger_and_sodas() {
        let items = [line(3590, 1), line(899, 2)];
        let totals = compute_totals(&items, Money::from_cents(500), Money::ZERO).unwrap();
        assert_eq!(totals.subtotal, Money::from_cents(5388));
        assert_eq!(totals.total, Money::from_cents(5888));
    }

    #[test]
    fn test_discount_is_subtracted() {
        let totals = compute_totals(&[line(2000, 1)], Money::from_cents(500), Money::from_cents(700)).unwrap();
        assert_eq!(totals.total, Money::from_cents(1800));
    }

    #[test]
    fn test_total_can_go_negative() {
        let totals = compute_totals(&[line(1000, 1)], Money::ZERO, Money::from_cents(1500)).unwrap();
        assert!(totals.total.is_negative());
    }

    #[test]
    fn test_no_items() {
        let totals = compute_totals(&[], Money::from_cents(500), Money::ZERO).unwrap();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.total, Money::from_cents(500));
    }

    #[test]
    fn test_overflow_yields_none() {
        let fee = Money::new(rust_decimal::Decimal::MAX);
        assert!(compute_totals(&[line(1000, 1)], fee, Money::ZERO).is_none());
    }
}
