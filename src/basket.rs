//! Basket
//!
//! A basket is the working set of line items for one interaction session. The same engine
//! serves two modes: a [`Cart`] for a new order, and an [`OrderEditSet`] for an order that
//! has already been submitted and is being modified.

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{CatalogItem, StockPolicy},
    items::{ItemId, LineItem, Quantity},
    orders::{ModifyOrderRequest, OrderLineRecord, OrderLineRequest, OrderRequest, PaymentStatus},
    payment::{PaymentDelta, compute_payment_delta},
    pricing::{PriceError, TotalPriceError, money_from_decimal, total_price},
};

/// Errors related to basket construction or mutation.
#[derive(Debug, Error, PartialEq)]
pub enum BasketError {
    /// Requested quantity exceeds what is left in stock.
    #[error("not enough stock for item {item_id}: requested {requested}, only {available} available")]
    InsufficientStock {
        /// Item being added
        item_id: ItemId,
        /// Units that would be drawn from stock
        requested: u32,
        /// Units available
        available: u32,
    },

    /// An edit set must keep at least one line.
    #[error("cannot remove item {0}: an order must contain at least one item")]
    CannotRemoveLastItem(ItemId),

    /// Nothing to submit.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Quantity input was not a positive integer.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// No line for the given item.
    #[error("item {0} is not in the basket")]
    UnknownItem(ItemId),

    /// Unit prices are never negative.
    #[error("item {0} has a negative price")]
    NegativePrice(ItemId),

    /// An item's currency differs from the basket currency (item, item currency, basket currency).
    #[error("Item {0} has currency {1}, but basket has currency {2}")]
    CurrencyMismatch(ItemId, &'static str, &'static str),

    /// Amount does not fit in minor units.
    #[error("amount for item {0} overflowed")]
    AmountOverflow(ItemId),

    /// New orders may only be pending or completed.
    #[error("an order cannot be created as {0}")]
    InvalidPaymentStatus(PaymentStatus),

    /// A recorded price could not be converted.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Wrapped total price error.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Consumption mode of a basket.
pub trait BasketMode: fmt::Debug + Clone {
    /// Whether the final line may be removed, leaving the basket empty.
    const ALLOWS_EMPTY: bool;

    /// Units of an item already taken out of stock before this session.
    fn reserved(&self, _item_id: ItemId) -> u32 {
        0
    }
}

/// Mode for an order that has not been submitted yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewOrder;

impl BasketMode for NewOrder {
    const ALLOWS_EMPTY: bool = true;
}

/// Mode for an already-submitted order being modified.
///
/// The backend deducted the recorded units from stock when the order was placed, so only
/// units beyond the recorded quantity are checked against the remaining stock.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOrder {
    original_total: Money<'static, Currency>,
    recorded: FxHashMap<ItemId, u32>,
}

impl BasketMode for EditOrder {
    const ALLOWS_EMPTY: bool = false;

    fn reserved(&self, item_id: ItemId) -> u32 {
        self.recorded.get(&item_id).copied().unwrap_or_default()
    }
}

/// The working set of line items for an order not yet submitted.
pub type Cart = Basket<NewOrder>;

/// The working set of line items for an already-submitted order being modified.
pub type OrderEditSet = Basket<EditOrder>;

/// How to change a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Add (or subtract) from the current quantity.
    Delta(i64),

    /// Replace the current quantity.
    Set(i64),
}

/// Basket
#[derive(Debug, Clone)]
pub struct Basket<M: BasketMode = NewOrder> {
    lines: Vec<LineItem>,
    total: Money<'static, Currency>,
    currency: &'static Currency,
    stock_policy: StockPolicy,
    mode: M,
}

impl Basket<NewOrder> {
    /// Create a new, empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Basket {
            lines: Vec::new(),
            total: Money::from_minor(0, currency),
            currency,
            stock_policy: StockPolicy::default(),
            mode: NewOrder,
        }
    }

    /// Empty the cart after a successful submission or an explicit reset.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total = Money::from_minor(0, self.currency);

        debug!("cart cleared");
    }

    /// Build the create-order payload for this cart.
    ///
    /// Prices and names are stripped; the backend prices the order itself.
    ///
    /// # Errors
    ///
    /// - [`BasketError::EmptyOrder`]: the cart has no lines.
    /// - [`BasketError::InvalidPaymentStatus`]: `payment_status` is [`PaymentStatus::Cancelled`].
    pub fn to_order_request(
        &self,
        payment_status: PaymentStatus,
    ) -> Result<OrderRequest, BasketError> {
        if !payment_status.is_valid_for_new_order() {
            return Err(BasketError::InvalidPaymentStatus(payment_status));
        }

        Ok(OrderRequest {
            items: self.line_requests()?,
            payment_status,
        })
    }
}

impl Basket<EditOrder> {
    /// Seed an edit set from the lines recorded for an existing order.
    ///
    /// The original total is the sum of the recorded subtotals and does not change for the
    /// rest of the session.
    ///
    /// # Errors
    ///
    /// - [`BasketError::EmptyOrder`]: no lines were recorded.
    /// - [`BasketError::Price`]: a recorded amount is negative or out of range.
    /// - [`BasketError::InvalidQuantity`]: a recorded quantity is zero.
    pub fn from_order_lines(
        currency: &'static Currency,
        records: &[OrderLineRecord],
    ) -> Result<Self, BasketError> {
        if records.is_empty() {
            return Err(BasketError::EmptyOrder);
        }

        let mut lines: Vec<LineItem> = Vec::with_capacity(records.len());
        let mut original_total = Money::from_minor(0, currency);

        for record in records {
            let unit_price = money_from_decimal(record.unit_price, currency)?;
            let quantity = Quantity::try_from(record.quantity)?;

            original_total = original_total.add(money_from_decimal(record.subtotal, currency)?)?;

            match lines.iter_mut().find(|line| line.item_id() == record.item_id) {
                Some(line) => {
                    let merged = line
                        .quantity()
                        .checked_add(quantity)
                        .ok_or(BasketError::AmountOverflow(record.item_id))?;
                    line.set_quantity(merged)?;
                }
                None => lines.push(LineItem::new(
                    record.item_id,
                    record.item_name.as_str(),
                    unit_price,
                    quantity,
                )?),
            }
        }

        let total = total_price(&lines, currency)?;
        let recorded = lines
            .iter()
            .map(|line| (line.item_id(), line.quantity().get()))
            .collect();

        debug!(
            lines = lines.len(),
            original_total = %original_total,
            "edit set seeded"
        );

        Ok(Basket {
            lines,
            total,
            currency,
            stock_policy: StockPolicy::default(),
            mode: EditOrder {
                original_total,
                recorded,
            },
        })
    }

    /// Total recorded for the order when the session started.
    pub fn original_total(&self) -> Money<'static, Currency> {
        self.mode.original_total
    }

    /// Total of the edited lines.
    pub fn new_total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Live preview of what the customer owes or is owed.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the totals are in different currencies.
    pub fn payment_delta(&self) -> Result<PaymentDelta, MoneyError> {
        compute_payment_delta(self)
    }

    /// Remove a line, or reset it to a quantity of one if it is the last line left.
    ///
    /// Returns `true` if the line was removed, `false` if it was reset instead.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::UnknownItem`] if no line matches `item_id`.
    pub fn remove_line_or_reset(&mut self, item_id: ItemId) -> Result<bool, BasketError> {
        match self.remove_line(item_id) {
            Ok(_) => Ok(true),
            Err(BasketError::CannotRemoveLastItem(item_id)) => {
                self.update_quantity(item_id, QuantityChange::Set(1))?;
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Build the modify-order payload for this edit set.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::EmptyOrder`] if the set has no lines.
    pub fn to_modify_request(&self) -> Result<ModifyOrderRequest, BasketError> {
        Ok(ModifyOrderRequest {
            items: self.line_requests()?,
        })
    }
}

impl<M: BasketMode> Basket<M> {
    /// Use a different interpretation of zero stock for subsequent additions.
    #[must_use]
    pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
        self.stock_policy = stock_policy;
        self
    }

    /// Add a line, merging with an existing line for the same item.
    ///
    /// `available_stock` of `None` means unlimited; otherwise it is interpreted through the
    /// basket's [`StockPolicy`].
    ///
    /// # Errors
    ///
    /// - [`BasketError::InsufficientStock`]: the cumulative quantity exceeds the stock.
    /// - [`BasketError::CurrencyMismatch`]: the price is not in the basket currency.
    /// - [`BasketError::NegativePrice`]: the price is below zero.
    /// - [`BasketError::AmountOverflow`]: a subtotal or quantity overflowed.
    pub fn add_line(
        &mut self,
        item_id: ItemId,
        name: &str,
        unit_price: Money<'static, Currency>,
        quantity: Quantity,
        available_stock: Option<u32>,
    ) -> Result<&LineItem, BasketError> {
        let price_currency = unit_price.currency();
        if price_currency != self.currency {
            return Err(BasketError::CurrencyMismatch(
                item_id,
                price_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let mut lines = self.lines.clone();

        let index = match lines.iter().position(|line| line.item_id() == item_id) {
            Some(index) => {
                let line = lines
                    .get_mut(index)
                    .ok_or(BasketError::UnknownItem(item_id))?;
                let merged = line
                    .quantity()
                    .checked_add(quantity)
                    .ok_or(BasketError::AmountOverflow(item_id))?;

                self.check_stock(item_id, merged, available_stock)?;
                line.set_quantity(merged)?;

                index
            }
            None => {
                self.check_stock(item_id, quantity, available_stock)?;
                lines.push(LineItem::new(item_id, name, unit_price, quantity)?);

                lines.len() - 1
            }
        };

        self.commit(lines)?;

        let line = self
            .lines
            .get(index)
            .ok_or(BasketError::UnknownItem(item_id))?;

        debug!(
            %item_id,
            quantity = %line.quantity(),
            total = %self.total,
            "line added"
        );

        Ok(line)
    }

    /// Add a catalog item using its recorded price and stock.
    ///
    /// # Errors
    ///
    /// As [`Basket::add_line`], plus [`BasketError::Price`] if the catalog price cannot be
    /// converted.
    pub fn add_catalog_item(
        &mut self,
        item: &CatalogItem,
        quantity: Quantity,
    ) -> Result<&LineItem, BasketError> {
        let unit_price = item.unit_price(self.currency)?;

        self.add_line(
            item.id,
            &item.item_name,
            unit_price,
            quantity,
            item.remaining_quantity,
        )
    }

    /// Change a line's quantity. The result never drops below one.
    ///
    /// # Errors
    ///
    /// - [`BasketError::UnknownItem`]: no line matches `item_id`.
    /// - [`BasketError::AmountOverflow`]: the new subtotal overflowed.
    pub fn update_quantity(
        &mut self,
        item_id: ItemId,
        change: QuantityChange,
    ) -> Result<&LineItem, BasketError> {
        let index = self.index_of(item_id)?;
        let mut lines = self.lines.clone();
        let line = lines
            .get_mut(index)
            .ok_or(BasketError::UnknownItem(item_id))?;

        let quantity = match change {
            QuantityChange::Delta(delta) => {
                Quantity::clamped(i64::from(line.quantity().get()).saturating_add(delta))
            }
            QuantityChange::Set(value) => Quantity::clamped(value),
        };

        line.set_quantity(quantity)?;
        self.commit(lines)?;

        debug!(%item_id, %quantity, total = %self.total, "quantity updated");

        self.lines
            .get(index)
            .ok_or(BasketError::UnknownItem(item_id))
    }

    /// Set a line's quantity from raw user input, correcting anything invalid to one.
    ///
    /// # Errors
    ///
    /// As [`Basket::update_quantity`].
    pub fn set_quantity_from_input(
        &mut self,
        item_id: ItemId,
        input: &str,
    ) -> Result<&LineItem, BasketError> {
        let quantity = Quantity::from_input(input);

        self.update_quantity(item_id, QuantityChange::Set(i64::from(quantity.get())))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// - [`BasketError::UnknownItem`]: no line matches `item_id`.
    /// - [`BasketError::CannotRemoveLastItem`]: this is an edit set and the line is the last
    ///   one. The line is left unchanged.
    pub fn remove_line(&mut self, item_id: ItemId) -> Result<LineItem, BasketError> {
        let index = self.index_of(item_id)?;

        if !M::ALLOWS_EMPTY && self.lines.len() == 1 {
            return Err(BasketError::CannotRemoveLastItem(item_id));
        }

        let mut lines = self.lines.clone();
        let removed = lines.remove(index);
        self.commit(lines)?;

        debug!(%item_id, total = %self.total, "line removed");

        Ok(removed)
    }

    /// Sum of all subtotals at full precision.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Line for an item, if present.
    pub fn line(&self, item_id: ItemId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.item_id() == item_id)
    }

    /// Get the number of lines in the basket.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the basket.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the stock policy of the basket.
    pub fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }

    fn index_of(&self, item_id: ItemId) -> Result<usize, BasketError> {
        self.lines
            .iter()
            .position(|line| line.item_id() == item_id)
            .ok_or(BasketError::UnknownItem(item_id))
    }

    fn check_stock(
        &self,
        item_id: ItemId,
        requested: Quantity,
        available_stock: Option<u32>,
    ) -> Result<(), BasketError> {
        let drawn = requested.get().saturating_sub(self.mode.reserved(item_id));

        match self.stock_policy.limit(available_stock) {
            Some(available) if drawn > available => Err(BasketError::InsufficientStock {
                item_id,
                requested: drawn,
                available,
            }),
            _ => Ok(()),
        }
    }

    /// Replace the lines and their total together, or not at all.
    fn commit(&mut self, lines: Vec<LineItem>) -> Result<(), BasketError> {
        let total = total_price(&lines, self.currency)?;

        self.lines = lines;
        self.total = total;

        Ok(())
    }

    fn line_requests(&self) -> Result<Vec<OrderLineRequest>, BasketError> {
        if self.lines.is_empty() {
            return Err(BasketError::EmptyOrder);
        }

        Ok(self
            .lines
            .iter()
            .map(|line| OrderLineRequest {
                item_id: line.item_id(),
                quantity: line.quantity(),
            })
            .collect())
    }
}
