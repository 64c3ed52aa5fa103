//! Inventory management
//!
//! Catalog maintenance calls. Local records only change after the backend confirms.

use tracing::{info, warn};

use crate::{
    catalog::{CatalogItem, InventoryItem},
    client::OrdersApi,
    items::ItemId,
    session::SessionError,
};

/// Add an item to the catalog.
///
/// # Errors
///
/// Returns [`SessionError::Api`] if the backend refuses the item.
#[tracing::instrument(skip(api, item), fields(item_name = %item.item_name))]
pub async fn create_item(
    api: &dyn OrdersApi,
    item: &InventoryItem,
) -> Result<ItemId, SessionError> {
    let item_id = api.create_item(item).await?;

    info!(%item_id, "item created");

    Ok(item_id)
}

/// Replace an item's name, price and stock.
///
/// # Errors
///
/// - [`SessionError::Api`]: the call failed, e.g. the item does not exist.
/// - [`SessionError::Rejected`]: the backend answered with `success: false`.
#[tracing::instrument(skip(api, item))]
pub async fn update_item(
    api: &dyn OrdersApi,
    item_id: ItemId,
    item: &InventoryItem,
) -> Result<(), SessionError> {
    if !api.update_item(item_id, item).await? {
        warn!("item update rejected");
        return Err(SessionError::Rejected(format!("item {item_id} was not updated")));
    }

    info!("item updated");

    Ok(())
}

/// Delete an item. The backend refuses items that orders still refer to.
///
/// # Errors
///
/// Returns [`SessionError::Api`] if the call failed.
#[tracing::instrument(skip(api))]
pub async fn delete_item(api: &dyn OrdersApi, item_id: ItemId) -> Result<(), SessionError> {
    api.delete_item(item_id).await?;

    info!("item deleted");

    Ok(())
}

/// Restock every item on the backend, then mirror it in `items`.
///
/// # Errors
///
/// - [`SessionError::Api`]: the call failed; `items` are untouched.
/// - [`SessionError::Rejected`]: the backend answered with `success: false`; `items` are
///   untouched.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub async fn restock_all(
    api: &dyn OrdersApi,
    items: &mut [CatalogItem],
) -> Result<(), SessionError> {
    if !api.restock_all().await? {
        warn!("restock rejected");
        return Err(SessionError::Rejected("restock failed".to_string()));
    }

    items.iter_mut().for_each(CatalogItem::restock);

    info!("all items restocked");

    Ok(())
}
