//! Items

use std::{fmt, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::basket::BasketError;

/// Opaque reference to a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Creates a new item id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line quantity. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Creates a quantity, returning `None` for zero.
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the quantity as a plain integer
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Clamp an arbitrary signed value into a valid quantity.
    ///
    /// Anything below one becomes one; anything above `u32::MAX` saturates.
    pub fn clamped(value: i64) -> Self {
        let value = u32::try_from(value.max(1)).unwrap_or(u32::MAX);

        Self::new(value).unwrap_or(Self::ONE)
    }

    /// Parse raw user input, treating anything that does not start with a positive integer
    /// as one.
    ///
    /// Only the leading integer is read, so `"2.5"` is 2 and `"3abc"` is 3.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim_start();
        let digits_start = usize::from(trimmed.starts_with(['+', '-']));
        let digits_end = trimmed
            .char_indices()
            .skip(digits_start)
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(trimmed.len(), |(index, _)| index);

        match trimmed.get(..digits_end).map(str::parse::<i64>) {
            Some(Ok(value)) if value >= 1 => Self::clamped(value),
            Some(Ok(value)) => {
                warn!(value, "non-positive quantity input corrected to 1");
                Self::ONE
            }
            // Overflowing digit runs saturate like `clamped`.
            Some(Err(_)) if digits_end > digits_start && !trimmed.starts_with('-') => {
                Self::clamped(i64::MAX)
            }
            _ => {
                warn!(input = trimmed, "non-numeric quantity input corrected to 1");
                Self::ONE
            }
        }
    }

    /// Add two quantities, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.get()).map(Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = BasketError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(BasketError::InvalidQuantity(value.to_string()))
    }
}

impl TryFrom<u32> for Quantity {
    type Error = BasketError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(BasketError::InvalidQuantity(value.to_string()))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog item's quantity and price within a basket.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    item_id: ItemId,
    name: String,
    unit_price: Money<'static, Currency>,
    quantity: Quantity,
    subtotal: Money<'static, Currency>,
}

impl LineItem {
    /// Creates a new line, deriving its subtotal.
    ///
    /// # Errors
    ///
    /// - [`BasketError::NegativePrice`]: the unit price is below zero.
    /// - [`BasketError::AmountOverflow`]: the subtotal does not fit in minor units.
    pub fn new(
        item_id: ItemId,
        name: impl Into<String>,
        unit_price: Money<'static, Currency>,
        quantity: Quantity,
    ) -> Result<Self, BasketError> {
        if unit_price.to_minor_units() < 0 {
            return Err(BasketError::NegativePrice(item_id));
        }

        let subtotal = line_subtotal(item_id, &unit_price, quantity)?;

        Ok(Self {
            item_id,
            name: name.into(),
            unit_price,
            quantity,
            subtotal,
        })
    }

    /// Returns the item id
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Returns `unit_price * quantity`
    pub fn subtotal(&self) -> &Money<'static, Currency> {
        &self.subtotal
    }

    /// Change the quantity, recomputing the subtotal.
    ///
    /// The line is left untouched if the new subtotal would overflow.
    pub(crate) fn set_quantity(&mut self, quantity: Quantity) -> Result<(), BasketError> {
        let subtotal = line_subtotal(self.item_id, &self.unit_price, quantity)?;

        self.quantity = quantity;
        self.subtotal = subtotal;

        Ok(())
    }
}

fn line_subtotal(
    item_id: ItemId,
    unit_price: &Money<'static, Currency>,
    quantity: Quantity,
) -> Result<Money<'static, Currency>, BasketError> {
    let minor_units = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity.get()))
        .ok_or(BasketError::AmountOverflow(item_id))?;

    Ok(Money::from_minor(minor_units, unit_price.currency()))
}
