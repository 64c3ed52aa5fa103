//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    basket::{BasketError, Cart, OrderEditSet},
    catalog::{CatalogItem, StockPolicy},
    fixtures::{
        catalog::CatalogFixture,
        sessions::{EditChange, EditFixture, LineFixture, SessionFixture},
    },
    items::Quantity,
    orders::OrderLineRecord,
};

pub mod catalog;
pub mod sessions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Currency mismatch between items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No items loaded yet
    #[error("No items loaded yet; currency unknown")]
    NoCurrency,

    /// The session has no modification section
    #[error("Session has no edit section")]
    NoEdit,

    /// Basket error while replaying the session
    #[error("Failed to build basket: {0}")]
    Basket(#[from] BasketError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog items keyed by fixture key
    items: FxHashMap<String, CatalogItem>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,

    /// Loaded session script
    session: Option<SessionFixture>,

    /// Stock policy applied to baskets built from this fixture
    stock_policy: StockPolicy,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: FxHashMap::default(),
            currency: None,
            session: None,
            stock_policy: StockPolicy::default(),
        }
    }

    /// Load a session and the catalog it refers to
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed.
    pub fn from_session(
        base_path: impl Into<PathBuf>,
        name: &str,
    ) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture.load_session(name)?;

        Ok(fixture)
    }

    /// Use a different stock policy for baskets built from this fixture
    #[must_use]
    pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
        self.stock_policy = stock_policy;
        self
    }

    /// Load catalog items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, item_fixture) in fixture.items {
            let (item, currency) = item_fixture.into_item()?;

            // Validate currency consistency
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.items.insert(key, item);
        }

        Ok(self)
    }

    /// Load a session script from a YAML fixture file, along with its catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be read or parsed.
    pub fn load_session(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("sessions").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let session: SessionFixture = serde_norway::from_str(&contents)?;

        self.load_catalog(&session.catalog)?;
        self.session = Some(session);

        Ok(self)
    }

    /// Catalog items ordered by id
    pub fn catalog(&self) -> Vec<&CatalogItem> {
        let mut items: Vec<&CatalogItem> = self.items.values().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    /// Look up a catalog item by fixture key
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ItemNotFound`] for unknown keys.
    pub fn item(&self, key: &str) -> Result<&CatalogItem, FixtureError> {
        self.items
            .get(key)
            .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
    }

    /// Currency shared by every loaded item
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if nothing has been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Order id of the session's modification section, if any
    pub fn edit_order_id(&self) -> Option<u64> {
        self.edit().map(|edit| edit.order_id)
    }

    /// Replay the session's cart additions into a new cart
    ///
    /// # Errors
    ///
    /// Returns an error if an item is missing or an addition is rejected.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        let mut cart = Cart::new(self.currency()?).with_stock_policy(self.stock_policy);
        let lines = self
            .session
            .as_ref()
            .map(|session| session.cart.as_slice())
            .unwrap_or_default();

        for line in lines {
            let item = self.item(&line.item)?;

            cart.add_catalog_item(item, Quantity::try_from(line.quantity)?)?;
        }

        Ok(cart)
    }

    /// Seed an edit set from the session's recorded lines, then replay its changes
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no edit section, an item is missing, or a change
    /// is rejected.
    pub fn edit_set(&self) -> Result<OrderEditSet, FixtureError> {
        let edit = self.edit().ok_or(FixtureError::NoEdit)?;
        let currency = self.currency()?;

        let records = edit
            .recorded
            .iter()
            .enumerate()
            .map(|(index, line)| self.record(edit.order_id, index, line))
            .collect::<Result<Vec<_>, _>>()?;

        let mut edit_set = OrderEditSet::from_order_lines(currency, &records)?
            .with_stock_policy(self.stock_policy);

        for change in &edit.changes {
            match change {
                EditChange::Add { item, quantity } => {
                    let item = self.item(item)?;
                    edit_set.add_catalog_item(item, Quantity::try_from(*quantity)?)?;
                }
                EditChange::Set { item, quantity } => {
                    let item = self.item(item)?;
                    edit_set.set_quantity_from_input(item.id, quantity)?;
                }
                EditChange::Remove { item } => {
                    let item = self.item(item)?;
                    edit_set.remove_line_or_reset(item.id)?;
                }
            }
        }

        Ok(edit_set)
    }

    fn edit(&self) -> Option<&EditFixture> {
        self.session.as_ref().and_then(|session| session.edit.as_ref())
    }

    fn record(
        &self,
        order_id: u64,
        index: usize,
        line: &LineFixture,
    ) -> Result<OrderLineRecord, FixtureError> {
        let item = self.item(&line.item)?;

        Ok(OrderLineRecord {
            id: u64::try_from(index).unwrap_or(u64::MAX),
            order_id,
            item_id: item.id,
            item_name: item.item_name.clone(),
            quantity: line.quantity,
            unit_price: item.price_per_quantity,
            subtotal: item.price_per_quantity * Decimal::from(line.quantity),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_money::{Money, iso::INR};
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::{items::ItemId, payment::PaymentDirection};

    fn write_fixtures(catalog: &str, session: &str) -> Result<TempDir, std::io::Error> {
        let dir = tempfile::tempdir()?;

        fs::create_dir_all(dir.path().join("catalog"))?;
        fs::create_dir_all(dir.path().join("sessions"))?;
        fs::write(dir.path().join("catalog").join("canteen.yml"), catalog)?;
        fs::write(dir.path().join("sessions").join("lunch.yml"), session)?;

        Ok(dir)
    }

    const CATALOG: &str = r#"
items:
  dosa:
    id: 1
    name: Masala Dosa
    price: "50.00 INR"
    stock: 10
  chai:
    id: 2
    name: Chai
    price: "30 INR"
"#;

    #[test]
    fn loads_catalog_sorted_by_id() -> TestResult {
        let dir = write_fixtures(CATALOG, "catalog: canteen\n")?;

        let fixture = Fixture::from_session(dir.path(), "lunch")?;

        let ids: Vec<ItemId> = fixture.catalog().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![ItemId::new(1), ItemId::new(2)]);
        assert_eq!(fixture.currency()?, INR);

        Ok(())
    }

    #[test]
    fn replays_cart() -> TestResult {
        let session = r"
catalog: canteen
cart:
  - item: dosa
    quantity: 2
  - item: chai
";
        let dir = write_fixtures(CATALOG, session)?;

        let cart = Fixture::from_session(dir.path(), "lunch")?.cart()?;

        assert_eq!(cart.total(), Money::from_minor(13000, INR));

        Ok(())
    }

    #[test]
    fn replays_edit_changes() -> TestResult {
        let session = r"
catalog: canteen
edit:
  order_id: 42
  recorded:
    - item: dosa
      quantity: 2
  changes:
    - action: add
      item: chai
    - action: set
      item: dosa
      quantity: '3'
    - action: remove
      item: chai
";
        let dir = write_fixtures(CATALOG, session)?;

        let fixture = Fixture::from_session(dir.path(), "lunch")?;
        let edit = fixture.edit_set()?;
        let delta = edit.payment_delta()?;

        assert_eq!(fixture.edit_order_id(), Some(42));
        assert_eq!(edit.len(), 1);
        assert_eq!(delta.delta, Money::from_minor(5000, INR));
        assert_eq!(delta.direction, PaymentDirection::CustomerOwes);

        Ok(())
    }

    #[test]
    fn missing_edit_section_is_an_error() -> TestResult {
        let dir = write_fixtures(CATALOG, "catalog: canteen\n")?;

        let fixture = Fixture::from_session(dir.path(), "lunch")?;

        assert!(matches!(fixture.edit_set(), Err(FixtureError::NoEdit)));

        Ok(())
    }

    #[test]
    fn unknown_item_is_reported() -> TestResult {
        let session = "catalog: canteen\ncart:\n  - item: biryani\n";
        let dir = write_fixtures(CATALOG, session)?;

        let result = Fixture::from_session(dir.path(), "lunch")?.cart();

        assert!(matches!(result, Err(FixtureError::ItemNotFound(key)) if key == "biryani"));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() -> TestResult {
        let catalog = r#"
items:
  dosa:
    id: 1
    name: Masala Dosa
    price: "50.00 INR"
  bagel:
    id: 2
    name: Bagel
    price: "2.00 USD"
"#;
        let dir = write_fixtures(catalog, "catalog: canteen\n")?;

        let result = Fixture::from_session(dir.path(), "lunch");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }
}
