//! Catalog Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Findable, iso::Currency};
use serde::Deserialize;

use crate::{catalog::CatalogItem, fixtures::FixtureError, items::ItemId};

/// Wrapper for catalog items in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of item key -> item fixture
    pub items: FxHashMap<String, CatalogItemFixture>,
}

/// Catalog Item Fixture
#[derive(Debug, Deserialize)]
pub struct CatalogItemFixture {
    /// Backend item id
    pub id: u64,

    /// Item name
    pub name: String,

    /// Item price (e.g., "80.00 INR")
    pub price: String,

    /// Units in stock; omitted when stock is not tracked
    #[serde(default)]
    pub stock: Option<u32>,
}

impl CatalogItemFixture {
    /// Convert into a catalog record, returning its currency alongside.
    ///
    /// # Errors
    ///
    /// Returns an error if the price string is malformed.
    pub fn into_item(self) -> Result<(CatalogItem, &'static Currency), FixtureError> {
        let (amount, currency) = parse_price(&self.price)?;

        let item = CatalogItem {
            id: ItemId::new(self.id),
            item_name: self.name,
            price_per_quantity: amount,
            remaining_quantity: self.stock,
        };

        Ok((item, currency))
    }
}

/// Parse price string (e.g., "2.99 GBP") into a decimal amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency = Currency::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    Ok((amount, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, INR};

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        assert!(matches!(
            parse_price("-1.00 INR"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_accepts_inr_and_eur() -> Result<(), FixtureError> {
        let (inr_amount, inr) = parse_price("80.50 INR")?;
        let (eur_amount, eur) = parse_price("2.50 EUR")?;

        assert_eq!(inr_amount, Decimal::new(8050, 2));
        assert_eq!(inr, INR);
        assert_eq!(eur_amount, Decimal::new(250, 2));
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn item_fixture_converts() -> Result<(), FixtureError> {
        let fixture = CatalogItemFixture {
            id: 3,
            name: "Vada".to_string(),
            price: "25 INR".to_string(),
            stock: Some(4),
        };

        let (item, currency) = fixture.into_item()?;

        assert_eq!(item.id, ItemId::new(3));
        assert_eq!(item.price_per_quantity, Decimal::new(25, 0));
        assert_eq!(item.remaining_quantity, Some(4));
        assert_eq!(currency, INR);

        Ok(())
    }
}
