//! Payment adjustments for modified orders

use std::fmt;

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Serialize;

use crate::{basket::OrderEditSet, pricing::display_money};

/// Which way money moves after an order is modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// The new total is higher; the customer pays the difference.
    CustomerOwes,

    /// The new total is lower; the difference is refunded.
    RefundDue,

    /// Totals match.
    NoChange,
}

impl PaymentDirection {
    /// Direction for a signed difference in minor units.
    pub fn from_minor_units(delta: i64) -> Self {
        match delta.signum() {
            1 => Self::CustomerOwes,
            -1 => Self::RefundDue,
            _ => Self::NoChange,
        }
    }
}

/// Difference between a modified order's new total and its recorded total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentDelta {
    /// Total recorded when the edit session started
    pub original_total: Money<'static, Currency>,

    /// Total of the edited lines
    pub new_total: Money<'static, Currency>,

    /// `new_total - original_total`
    pub delta: Money<'static, Currency>,

    /// Sign of `delta`
    pub direction: PaymentDirection,
}

impl PaymentDelta {
    /// Size of the adjustment, ignoring direction.
    pub fn magnitude(&self) -> Money<'static, Currency> {
        Money::from_minor(self.delta.to_minor_units().abs(), self.delta.currency())
    }

    /// Message for the cashier.
    pub fn message(&self) -> String {
        match self.direction {
            PaymentDirection::CustomerOwes => {
                format!("Customer needs to pay: {}", display_money(&self.magnitude()))
            }
            PaymentDirection::RefundDue => {
                format!("Refund to customer: {}", display_money(&self.magnitude()))
            }
            PaymentDirection::NoChange => "No payment adjustment needed".to_string(),
        }
    }
}

impl fmt::Display for PaymentDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Compare an edit set's current total against the total recorded for the order.
///
/// Pure; call it after every mutation for a live preview.
///
/// # Errors
///
/// Returns a [`MoneyError`] if the totals are in different currencies.
pub fn compute_payment_delta(edit: &OrderEditSet) -> Result<PaymentDelta, MoneyError> {
    let original_total = edit.original_total();
    let new_total = edit.new_total();
    let delta = new_total.sub(original_total)?;

    Ok(PaymentDelta {
        original_total,
        new_total,
        delta,
        direction: PaymentDirection::from_minor_units(delta.to_minor_units()),
    })
}
