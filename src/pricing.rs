//! Pricing
//!
//! Totals are accumulated as exact decimals; rounding to whole cents happens
//! only where a figure is presented or charged.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::{Cart, CartItem};

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total did not fit in a decimal.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors raised while building a cart summary.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Errors bubbled up from total price calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Price × quantity for a single line.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the product does not fit.
pub fn line_total(item: &CartItem) -> Result<Decimal, TotalPriceError> {
    item.course
        .price
        .checked_mul(Decimal::from(item.quantity))
        .ok_or(TotalPriceError::Overflow)
}

/// Calculates the total price of a list of cart lines
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total did not fit in a decimal.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic error.
pub fn total_price(
    items: &[CartItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    items
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, item| {
            let line = Money::from_decimal(line_total(item)?, currency);

            Ok(acc.add(line)?)
        })
}

/// Round to whole cents, halves away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A percentage off the whole cart once the subtotal passes a threshold.
#[derive(Debug, Clone, Copy)]
pub struct VolumeDiscount {
    threshold: Decimal,
    rate: Decimal,
}

impl VolumeDiscount {
    /// Take `rate` off subtotals strictly above `threshold`.
    pub fn new(threshold: Decimal, rate: Percentage) -> Self {
        Self {
            threshold,
            rate: rate * Decimal::ONE,
        }
    }

    /// No discount at any subtotal.
    pub fn none() -> Self {
        Self::new(Decimal::MAX, Percentage::from(Decimal::ZERO))
    }

    /// Discount on `subtotal`, rounded to whole cents.
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.threshold {
            round_cents(Percentage::from(self.rate) * subtotal)
        } else {
            Decimal::ZERO
        }
    }
}

impl Default for VolumeDiscount {
    /// 10% off subtotals over 100.
    fn default() -> Self {
        Self::new(Decimal::ONE_HUNDRED, Percentage::from(Decimal::new(10, 2)))
    }
}

/// Subtotal, discount and total for a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartSummary {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    total: Money<'static, Currency>,
    item_count: u64,
}

impl CartSummary {
    /// Summarise `cart` with `discount` applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the arithmetic overflowed.
    pub fn for_cart(cart: &Cart, discount: &VolumeDiscount) -> Result<Self, PricingError> {
        let currency = cart.currency();
        let subtotal = total_price(cart.items(), currency)?;
        let discount = Money::from_decimal(discount.discount_on(*subtotal.amount()), currency);
        let total = subtotal.sub(discount)?;

        Ok(Self {
            subtotal,
            discount,
            total,
            item_count: cart.total_item_count(),
        })
    }

    /// Total before discount
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Discount taken off the subtotal
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Amount payable, rounded to whole cents
    pub fn total(&self) -> Money<'static, Currency> {
        Money::from_decimal(round_cents(*self.total.amount()), self.total.currency())
    }

    /// Sum of line quantities
    pub fn item_count(&self) -> u64 {
        self.item_count
    }
}
