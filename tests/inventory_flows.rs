//! Inventory flows against a mocked backend.
//!
//! Local catalog records must only change once the backend confirms.

use mockall::predicate::eq;
use rust_decimal::Decimal;
use testresult::TestResult;

use tally::{
    catalog::{CatalogItem, InventoryItem, RESTOCK_QUANTITY},
    client::{ApiError, MockOrdersApi},
    inventory,
    items::ItemId,
    session::SessionError,
};

fn canteen_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            id: ItemId::new(1),
            item_name: "Idli".to_string(),
            price_per_quantity: Decimal::new(25, 0),
            remaining_quantity: Some(3),
        },
        CatalogItem {
            id: ItemId::new(2),
            item_name: "Filter Coffee".to_string(),
            price_per_quantity: Decimal::new(155, 1),
            remaining_quantity: None,
        },
    ]
}

#[tokio::test]
async fn created_item_returns_backend_id() -> TestResult {
    let item = InventoryItem::new("Pongal", Decimal::new(40, 0), Some(15))?;

    let mut api = MockOrdersApi::new();
    api.expect_create_item()
        .withf(|item| item.item_name == "Pongal" && item.remaining_quantity == Some(15))
        .times(1)
        .returning(|_| Ok(ItemId::new(31)));

    let item_id = inventory::create_item(&api, &item).await?;

    assert_eq!(item_id, ItemId::new(31));

    Ok(())
}

#[tokio::test]
async fn unconfirmed_update_is_rejected() -> TestResult {
    let item = InventoryItem::new("Idli", Decimal::new(30, 0), None)?;

    let mut api = MockOrdersApi::new();
    api.expect_update_item()
        .withf(|item_id, item| {
            *item_id == ItemId::new(1) && item.price_per_quantity == Decimal::new(30, 0)
        })
        .times(1)
        .returning(|_, _| Ok(false));

    let result = inventory::update_item(&api, ItemId::new(1), &item).await;

    assert!(
        matches!(
            &result,
            Err(SessionError::Rejected(message)) if message == "item 1 was not updated"
        ),
        "unexpected result: {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn confirmed_update_succeeds() -> TestResult {
    let item = InventoryItem::new("Idli", Decimal::new(30, 0), Some(40))?;

    let mut api = MockOrdersApi::new();
    api.expect_update_item().times(1).returning(|_, _| Ok(true));

    inventory::update_item(&api, ItemId::new(1), &item).await?;

    Ok(())
}

#[tokio::test]
async fn item_with_orders_cannot_be_deleted() {
    let mut api = MockOrdersApi::new();
    api.expect_delete_item()
        .with(eq(ItemId::new(2)))
        .times(1)
        .returning(|_| {
            Err(ApiError::UnexpectedResponse {
                status: 400,
                detail: "Cannot delete item with existing orders".to_string(),
            })
        });

    let result = inventory::delete_item(&api, ItemId::new(2)).await;

    assert!(
        matches!(
            &result,
            Err(SessionError::Api(ApiError::UnexpectedResponse { status: 400, detail }))
                if detail == "Cannot delete item with existing orders"
        ),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn restock_mirrors_backend_stock() -> TestResult {
    let mut api = MockOrdersApi::new();
    api.expect_restock_all().times(1).returning(|| Ok(true));

    let mut items = canteen_items();

    inventory::restock_all(&api, &mut items).await?;

    assert!(
        items
            .iter()
            .all(|item| item.remaining_quantity == Some(RESTOCK_QUANTITY)),
        "every item should be restocked: {items:?}"
    );

    Ok(())
}

#[tokio::test]
async fn failed_restock_leaves_local_stock() {
    let mut refusing = MockOrdersApi::new();
    refusing.expect_restock_all().times(1).returning(|| Ok(false));

    let mut failing = MockOrdersApi::new();
    failing.expect_restock_all().times(1).returning(|| {
        Err(ApiError::UnexpectedResponse {
            status: 500,
            detail: "Internal Server Error".to_string(),
        })
    });

    let mut items = canteen_items();

    let rejected = inventory::restock_all(&refusing, &mut items).await;
    let failed = inventory::restock_all(&failing, &mut items).await;

    assert!(
        matches!(rejected, Err(SessionError::Rejected(_))),
        "unexpected result: {rejected:?}"
    );
    assert!(
        matches!(failed, Err(SessionError::Api(_))),
        "unexpected result: {failed:?}"
    );
    assert_eq!(items, canteen_items());
}
