//! Receipt

use std::{io, ops::Range};

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    Table,
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    basket::{Basket, BasketMode, OrderEditSet},
    catalog::CatalogItem,
    items::LineItem,
    orders::OrderRecord,
    payment::{PaymentDelta, compute_payment_delta},
    pricing::display_money,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Error writing the receipt.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Printable summary of a basket.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: &'a [LineItem],
    total: Money<'static, Currency>,
    payment: Option<PaymentDelta>,
}

impl<'a> Receipt<'a> {
    /// Receipt for any basket, without payment adjustment.
    pub fn new<M: BasketMode>(basket: &'a Basket<M>) -> Self {
        Self {
            lines: basket.lines(),
            total: basket.total(),
            payment: None,
        }
    }

    /// Receipt for an edit set, including the payment adjustment.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the totals are in different currencies.
    pub fn for_edit_set(edit: &'a OrderEditSet) -> Result<Self, ReceiptError> {
        Ok(Self {
            payment: Some(compute_payment_delta(edit)?),
            ..Self::new(edit)
        })
    }

    /// Total of all lines
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Payment adjustment, for edit sets
    pub fn payment(&self) -> Option<&PaymentDelta> {
        self.payment.as_ref()
    }

    /// Writes the receipt as a table followed by its totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Unit Price", "Qty", "Subtotal"]);

        for line in self.lines {
            builder.push_record([
                line.name().to_string(),
                display_money(line.unit_price()),
                line.quantity().to_string(),
                display_money(line.subtotal()),
            ]);
        }

        let table = build_table(builder, 1..4);

        writeln!(out, "{table}")?;

        match &self.payment {
            Some(payment) => {
                writeln!(out, " Original Total: {}", display_money(&payment.original_total))?;
                writeln!(out, " New Total:      {}", display_money(&payment.new_total))?;
                writeln!(out, " {}", payment.message())?;
            }
            None => writeln!(out, " Total: {}", display_money(&self.total))?,
        }

        Ok(())
    }
}

/// Writes catalog items as a table.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_catalog(items: &[&CatalogItem], mut out: impl io::Write) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Item", "Price", "Stock"]);

    for item in items {
        builder.push_record([
            item.id.to_string(),
            item.item_name.clone(),
            format_decimal(item.price_per_quantity),
            item.remaining_quantity
                .map_or_else(|| "-".to_string(), |stock| stock.to_string()),
        ]);
    }

    writeln!(out, "{}", build_table(builder, 2..4))?;

    Ok(())
}

/// Writes order history as a table.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_orders(orders: &[OrderRecord], mut out: impl io::Write) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Items", "Qty", "Total", "Status", "Ordered", "Paid"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.item_names(),
            order.total_quantity().to_string(),
            format_decimal(order.total_price),
            order.payment_status.to_string(),
            order.order_date.clone(),
            order.payment_date.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    writeln!(out, "{}", build_table(builder, 2..4))?;

    Ok(())
}

fn format_decimal(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn build_table(builder: Builder, numeric: Range<usize>) -> Table {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Columns::new(numeric), Alignment::right());

    table
}
