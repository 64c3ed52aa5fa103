//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{
        Basket, BasketError, BasketMode, Cart, EditOrder, NewOrder, OrderEditSet, QuantityChange,
    },
    catalog::{CatalogItem, InventoryItem, StockPolicy},
    client::{ApiError, HttpOrdersApi, OrdersApi},
    items::{ItemId, LineItem, Quantity},
    orders::{
        ModifyOrderRequest, ModifyOrderResponse, OrderLineRecord, OrderLineRequest, OrderRecord,
        OrderRequest, PaymentStatus,
    },
    payment::{PaymentDelta, PaymentDirection, compute_payment_delta},
    pricing::{display_amount, display_money},
    receipt::{Receipt, ReceiptError},
    search::{OrderQuery, SortKey, SortOrder},
    session::{EditAction, SessionError},
};
