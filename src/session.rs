//! Session flows
//!
//! Each flow owns the basket for one interaction. Local state only changes once the backend
//! has accepted the call, so a failed call can simply be retried by the cashier.

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    basket::{BasketError, Cart, OrderEditSet},
    client::{ApiError, OrdersApi},
    items::{ItemId, Quantity},
    orders::{ModifyOrderResponse, OrderRecord, PaymentStatus},
    search::OrderQuery,
};

/// Errors raised by session flows.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The basket could not produce a valid request.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered but refused the change.
    #[error("{0}")]
    Rejected(String),

    /// No order with this id exists.
    #[error("order {0} not found")]
    UnknownOrder(u64),

    /// The order's current status does not allow this action.
    #[error("order {order_id} is {status}")]
    InvalidTransition {
        /// Order id
        order_id: u64,
        /// Current payment status
        status: PaymentStatus,
    },
}

/// Submit a cart as a new order, clearing it once the backend accepts.
///
/// # Errors
///
/// - [`SessionError::Basket`]: the cart is empty or the status is invalid; no call is made.
/// - [`SessionError::Api`]: the call failed; the cart is left as it was.
#[tracing::instrument(skip(api, cart), fields(lines = cart.len()))]
pub async fn submit_cart(
    api: &dyn OrdersApi,
    cart: &mut Cart,
    payment_status: PaymentStatus,
) -> Result<(), SessionError> {
    let request = cart.to_order_request(payment_status)?;

    api.create_order(&request).await?;
    cart.clear();

    info!("order placed");

    Ok(())
}

/// Start a modification session for an existing order.
///
/// # Errors
///
/// - [`SessionError::Api`]: the order lines could not be fetched.
/// - [`SessionError::Basket`]: the recorded lines were empty or invalid.
#[tracing::instrument(skip(api, currency))]
pub async fn load_edit_set(
    api: &dyn OrdersApi,
    order_id: u64,
    currency: &'static Currency,
) -> Result<OrderEditSet, SessionError> {
    let records = api.order_items(order_id).await?;

    Ok(OrderEditSet::from_order_lines(currency, &records)?)
}

/// One cashier change to an order being modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Add units of a catalog item, priced and stock-checked from the backend.
    Add {
        /// Catalog item
        item_id: ItemId,
        /// Units to add
        quantity: Quantity,
    },

    /// Set a line's quantity from raw input.
    Set {
        /// Line to change
        item_id: ItemId,
        /// Raw quantity input
        input: String,
    },

    /// Remove a line, or reset it to one if it is the last.
    Remove {
        /// Line to remove
        item_id: ItemId,
    },
}

/// Apply cashier changes to an edit set, in order.
///
/// Either every change applies or the edit set is left as it was.
///
/// # Errors
///
/// - [`SessionError::Api`]: an added item could not be fetched.
/// - [`SessionError::Basket`]: a change was rejected, e.g. for insufficient stock.
#[tracing::instrument(skip_all, fields(actions = actions.len()))]
pub async fn apply_edits(
    api: &dyn OrdersApi,
    edit: &mut OrderEditSet,
    actions: &[EditAction],
) -> Result<(), SessionError> {
    let mut working = edit.clone();

    for action in actions {
        match action {
            EditAction::Add { item_id, quantity } => {
                let item = api.get_item(*item_id).await?;
                working.add_catalog_item(&item, *quantity)?;
            }
            EditAction::Set { item_id, input } => {
                working.set_quantity_from_input(*item_id, input)?;
            }
            EditAction::Remove { item_id } => {
                working.remove_line_or_reset(*item_id)?;
            }
        }
    }

    *edit = working;

    Ok(())
}

/// Save a modification session.
///
/// # Errors
///
/// - [`SessionError::Api`]: the call failed.
/// - [`SessionError::Rejected`]: the backend answered with `success: false`.
#[tracing::instrument(skip(api, edit), fields(lines = edit.len()))]
pub async fn save_edit_set(
    api: &dyn OrdersApi,
    order_id: u64,
    edit: &OrderEditSet,
) -> Result<ModifyOrderResponse, SessionError> {
    let request = edit.to_modify_request()?;
    let response = api.modify_order(order_id, &request).await?;

    if !response.success {
        warn!(message = ?response.message, "order modification rejected");
        return Err(SessionError::Rejected(response.summary()));
    }

    info!(payment_message = ?response.payment_message, "order modified");

    Ok(response)
}

/// Look up an order in the history.
///
/// # Errors
///
/// - [`SessionError::Api`]: the history could not be fetched.
/// - [`SessionError::UnknownOrder`]: no order has this id.
#[tracing::instrument(skip(api))]
pub async fn find_order(api: &dyn OrdersApi, order_id: u64) -> Result<OrderRecord, SessionError> {
    api.search_orders(&OrderQuery::default())
        .await?
        .into_iter()
        .find(|order| order.id == order_id)
        .ok_or(SessionError::UnknownOrder(order_id))
}

/// Cancel an order that is not already cancelled.
///
/// # Errors
///
/// - [`SessionError::InvalidTransition`]: the order is already cancelled; no call is made.
/// - [`SessionError::Api`]: the call failed.
#[tracing::instrument(skip(api, order), fields(order_id = order.id))]
pub async fn cancel_order(api: &dyn OrdersApi, order: &OrderRecord) -> Result<(), SessionError> {
    if !order.payment_status.can_cancel() {
        return Err(SessionError::InvalidTransition {
            order_id: order.id,
            status: order.payment_status,
        });
    }

    api.cancel_order(order.id).await?;

    info!("order cancelled");

    Ok(())
}

/// Mark a pending order as paid.
///
/// # Errors
///
/// - [`SessionError::InvalidTransition`]: the order is not pending; no call is made.
/// - [`SessionError::Api`]: the call failed.
#[tracing::instrument(skip(api, order), fields(order_id = order.id))]
pub async fn mark_paid(api: &dyn OrdersApi, order: &OrderRecord) -> Result<(), SessionError> {
    if !order.payment_status.can_mark_paid() {
        return Err(SessionError::InvalidTransition {
            order_id: order.id,
            status: order.payment_status,
        });
    }

    api.mark_paid(order.id).await?;

    info!("order marked as paid");

    Ok(())
}
