//! Pricing policy shared by the cart and order placement.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Flat shipping fee charged on any non-empty cart.
pub const SHIPPING_FLAT: Money = Money::from_cents(4_000);

/// Sales tax rate in basis points (5%).
pub const TAX_RATE_BASIS_POINTS: i64 = 500;

/// Derived monetary summary of a set of lines.
///
/// Never stored for carts; frozen into the order record at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    pub item_count: u32,
}

impl Totals {
    /// Computes totals from `(unit price, quantity)` pairs.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Money, u32)>,
    {
        let mut subtotal = Money::zero();
        let mut item_count = 0u32;
        for (unit_price, quantity) in lines {
            subtotal += unit_price.multiply(quantity);
            item_count += quantity;
        }

        let shipping = if subtotal.is_positive() {
            SHIPPING_FLAT
        } else {
            Money::zero()
        };
        let tax = tax_on(subtotal);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            item_count,
        }
    }

    /// Totals of an empty set of lines: everything zero.
    pub fn empty() -> Self {
        Self::from_lines(std::iter::empty())
    }
}

/// Tax due on a subtotal, rounded to the nearest cent.
pub fn tax_on(subtotal: Money) -> Money {
    Money::from_cents((subtotal.cents() * TAX_RATE_BASIS_POINTS + 5_000) / 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_totals() {
        // One line at $100.00 x2: subtotal 200, shipping 40, tax 10, total 250.
        let totals = Totals::from_lines([(Money::from_dollars(100), 2)]);
        assert_eq!(totals.subtotal, Money::from_dollars(200));
        assert_eq!(totals.shipping, Money::from_dollars(40));
        assert_eq!(totals.tax, Money::from_dollars(10));
        assert_eq!(totals.total, Money::from_dollars(250));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_empty_totals_are_zero() {
        let totals = Totals::empty();
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let cases = [
            vec![(Money::from_cents(999), 3)],
            vec![(Money::from_cents(1), 1)],
            vec![(Money::from_cents(2500), 4), (Money::from_cents(333), 7)],
            vec![(Money::zero(), 5)],
        ];
        for lines in cases {
            let totals = Totals::from_lines(lines);
            assert_eq!(totals.total, totals.subtotal + totals.shipping + totals.tax);
        }
    }

    #[test]
    fn test_tax_rounds_to_nearest_cent() {
        // 5% of 9 cents is 0.45 cents; halves round up.
        assert_eq!(tax_on(Money::from_cents(9)).cents(), 0);
        assert_eq!(tax_on(Money::from_cents(10)).cents(), 1);
        assert_eq!(tax_on(Money::from_cents(30)).cents(), 2);
    }

    #[test]
    fn test_no_shipping_on_zero_subtotal() {
        let totals = Totals::from_lines([(Money::zero(), 2)]);
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.total, Money::zero());
    }
}
