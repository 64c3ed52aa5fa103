//! Catalog
//!
//! Item records as served by the backend, plus the inventory rules the point-of-sale applies
//! before sending them back.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::ItemId,
    pricing::{PriceError, money_from_decimal},
};

/// Quantity every item is set to by a restock.
pub const RESTOCK_QUANTITY: u32 = 9999;

/// Errors raised when validating inventory records.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Item names must not be blank.
    #[error("item name must not be empty")]
    EmptyName,

    /// Item prices must be strictly positive.
    #[error("price must be greater than zero, got {0}")]
    NonPositivePrice(Decimal),
}

/// How a recorded stock level of zero is interpreted.
///
/// An unknown stock level (`None`) is always unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Zero means nothing is left to sell.
    #[default]
    ZeroIsOutOfStock,

    /// Zero means stock is not tracked for the item.
    ZeroIsUnlimited,
}

impl StockPolicy {
    /// Resolve a recorded stock level into a hard limit, `None` meaning unlimited.
    pub fn limit(self, remaining: Option<u32>) -> Option<u32> {
        match (self, remaining) {
            (_, None) | (Self::ZeroIsUnlimited, Some(0)) => None,
            (_, Some(remaining)) => Some(remaining),
        }
    }
}

/// A catalog item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item id
    pub id: ItemId,

    /// Item display name
    pub item_name: String,

    /// Price per unit in major units
    pub price_per_quantity: Decimal,

    /// Units left, `None` when stock is not tracked
    #[serde(default)]
    pub remaining_quantity: Option<u32>,
}

impl CatalogItem {
    /// Unit price as money in the given currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the price is negative or out of range.
    pub fn unit_price(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, PriceError> {
        money_from_decimal(self.price_per_quantity, currency)
    }

    /// Stock limit for this item under the given policy.
    pub fn stock_limit(&self, policy: StockPolicy) -> Option<u32> {
        policy.limit(self.remaining_quantity)
    }

    /// Mirror a server-side restock locally.
    pub fn restock(&mut self) {
        self.remaining_quantity = Some(RESTOCK_QUANTITY);
    }

    /// Case-insensitive name match.
    pub fn matches(&self, query: &str) -> bool {
        self.item_name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }
}

/// Filter items whose name contains `query`, ignoring case. A blank query matches everything.
pub fn search_items<'a>(items: &'a [CatalogItem], query: &str) -> Vec<&'a CatalogItem> {
    items.iter().filter(|item| item.matches(query)).collect()
}

/// An item as submitted to the backend's create and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item display name
    pub item_name: String,

    /// Price per unit in major units
    pub price_per_quantity: Decimal,

    /// Units left, `None` when stock is not tracked
    pub remaining_quantity: Option<u32>,
}

impl InventoryItem {
    /// Build a validated inventory record.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::EmptyName`]: the name is blank.
    /// - [`CatalogError::NonPositivePrice`]: the price is zero or negative.
    pub fn new(
        item_name: &str,
        price_per_quantity: Decimal,
        remaining_quantity: Option<u32>,
    ) -> Result<Self, CatalogError> {
        let item_name = item_name.trim();

        if item_name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        if price_per_quantity <= Decimal::ZERO {
            return Err(CatalogError::NonPositivePrice(price_per_quantity));
        }

        Ok(Self {
            item_name: item_name.to_string(),
            price_per_quantity,
            remaining_quantity,
        })
    }
}
