//! Orders
//!
//! Wire shapes exchanged with the backend's order endpoints.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{ItemId, Quantity};

/// Unrecognised payment status string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment status: {0}")]
pub struct UnknownPaymentStatus(pub String);

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Placed, not yet paid
    Pending,

    /// Paid
    Completed,

    /// Cancelled; stock has been returned
    Cancelled,
}

impl PaymentStatus {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Orders are created either unpaid or paid, never cancelled.
    pub fn is_valid_for_new_order(self) -> bool {
        matches!(self, Self::Pending | Self::Completed)
    }

    /// Any order that is not already cancelled may be cancelled.
    pub fn can_cancel(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Only pending orders can be marked as paid.
    pub fn can_mark_paid(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownPaymentStatus(other.to_string())),
        }
    }
}

/// One line of an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    /// Catalog item
    pub item_id: ItemId,

    /// Units ordered
    pub quantity: Quantity,
}

/// Body of a create-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Lines to order
    pub items: Vec<OrderLineRequest>,

    /// Initial payment state
    pub payment_status: PaymentStatus,
}

/// Body of a modify-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    /// Full replacement line list
    pub items: Vec<OrderLineRequest>,
}

/// An order line as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRecord {
    /// Line id
    pub id: u64,

    /// Owning order
    pub order_id: u64,

    /// Catalog item
    pub item_id: ItemId,

    /// Name at the time of ordering
    pub item_name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit at the time of ordering
    pub unit_price: Decimal,

    /// `unit_price * quantity` as recorded
    pub subtotal: Decimal,
}

/// An order as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order id
    pub id: u64,

    /// Recorded total
    pub total_price: Decimal,

    /// Payment state
    pub payment_status: PaymentStatus,

    /// ISO-8601 timestamp the order was placed
    pub order_date: String,

    /// ISO-8601 timestamp the order was paid
    #[serde(default)]
    pub payment_date: Option<String>,

    /// Order lines
    #[serde(default)]
    pub items: Vec<OrderLineRecord>,
}

impl OrderRecord {
    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Item names joined for display.
    pub fn item_names(&self) -> String {
        self.items
            .iter()
            .map(|line| line.item_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Response to a modify-order call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderResponse {
    /// Whether the backend accepted the change
    #[serde(default)]
    pub success: bool,

    /// Backend message
    #[serde(default)]
    pub message: Option<String>,

    /// Payment adjustment computed by the backend
    #[serde(default)]
    pub payment_message: Option<String>,
}

impl ModifyOrderResponse {
    /// Message to show the cashier.
    pub fn summary(&self) -> String {
        let fallback = if self.success {
            "Order modified successfully"
        } else {
            "Failed to modify order"
        };
        let message = self.message.as_deref().unwrap_or(fallback);

        match (&self.payment_message, self.success) {
            (Some(payment), true) => format!("{message}. {payment}"),
            _ => message.to_string(),
        }
    }
}
