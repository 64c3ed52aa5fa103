//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors converting decimal amounts into money.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Prices are never negative.
    #[error("price must not be negative, got {0}")]
    Negative(Decimal),

    /// The amount cannot be represented in minor units.
    #[error("price {0} cannot be represented in minor units")]
    OutOfRange(Decimal),
}

/// Calculates the total price of a list of lines.
///
/// An empty list totals zero in the given currency.
///
/// # Errors
///
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price(
    lines: &[LineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let total = lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(*line.subtotal())
        })?;

    Ok(total)
}

/// Convert a decimal amount (e.g. `12.5`) into money in the given currency.
///
/// Amounts with more precision than the currency allows are rounded half away from zero.
///
/// # Errors
///
/// - [`PriceError::Negative`]: the amount is below zero.
/// - [`PriceError::OutOfRange`]: the amount does not fit in `i64` minor units.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PriceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(amount));
    }

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|scale| amount.checked_mul(scale))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PriceError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Money as a plain decimal in major units.
pub fn to_decimal(money: &Money<'static, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Render an amount rounded to two decimal places, without a currency symbol.
pub fn display_amount(money: &Money<'static, Currency>) -> String {
    let rounded =
        to_decimal(money).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    format!("{rounded:.2}")
}

/// Render an amount rounded to two decimal places, prefixed with the currency symbol.
pub fn display_money(money: &Money<'static, Currency>) -> String {
    let amount = display_amount(money);

    match amount.strip_prefix('-') {
        Some(magnitude) => format!("-{}{magnitude}", money.currency().symbol),
        None => format!("{}{amount}", money.currency().symbol),
    }
}
