//! End-to-end pricing scenarios for new and modified orders.
//!
//! Cart: 2 x Masala Dosa at 50.00 and 1 x Filter Coffee at 30.00 totals 130.00. Edits of an
//! order recorded at 100.00 are priced against that original total, whatever happens to the
//! lines afterwards.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use tally::prelude::*;

fn dosa() -> CatalogItem {
    CatalogItem {
        id: ItemId::new(2),
        item_name: "Masala Dosa".to_string(),
        price_per_quantity: Decimal::new(50, 0),
        remaining_quantity: Some(3),
    }
}

fn coffee() -> CatalogItem {
    CatalogItem {
        id: ItemId::new(5),
        item_name: "Filter Coffee".to_string(),
        price_per_quantity: Decimal::new(30, 0),
        remaining_quantity: None,
    }
}

fn order_of_100() -> Result<OrderEditSet, BasketError> {
    OrderEditSet::from_order_lines(
        INR,
        &[OrderLineRecord {
            id: 11,
            order_id: 42,
            item_id: ItemId::new(2),
            item_name: "Masala Dosa".to_string(),
            quantity: 2,
            unit_price: Decimal::new(50, 0),
            subtotal: Decimal::new(100, 0),
        }],
    )
}

#[test]
fn cart_totals_and_request() -> TestResult {
    let mut cart = Cart::new(INR);

    cart.add_catalog_item(&dosa(), Quantity::clamped(2))?;
    cart.add_catalog_item(&coffee(), Quantity::ONE)?;

    assert_eq!(cart.total(), Money::from_minor(13000, INR));
    assert_eq!(display_amount(&cart.total()), "130.00");

    let request = cart.to_order_request(PaymentStatus::Pending)?;

    assert_eq!(
        request.items,
        vec![
            OrderLineRequest {
                item_id: ItemId::new(2),
                quantity: Quantity::clamped(2),
            },
            OrderLineRequest {
                item_id: ItemId::new(5),
                quantity: Quantity::ONE,
            },
        ]
    );

    let body = serde_json::to_value(&request)?;

    assert_eq!(
        body,
        serde_json::json!({
            "items": [
                { "item_id": 2, "quantity": 2 },
                { "item_id": 5, "quantity": 1 }
            ],
            "payment_status": "pending"
        })
    );

    Ok(())
}

#[test]
fn repeated_additions_merge_and_respect_stock() -> TestResult {
    let mut cart = Cart::new(INR);

    cart.add_catalog_item(&dosa(), Quantity::clamped(2))?;
    let line = cart.add_catalog_item(&dosa(), Quantity::ONE)?;

    assert_eq!(line.quantity(), Quantity::clamped(3));
    assert_eq!(line.subtotal(), &Money::from_minor(15000, INR));

    let result = cart.add_catalog_item(&dosa(), Quantity::ONE);

    assert_eq!(
        result.err(),
        Some(BasketError::InsufficientStock {
            item_id: ItemId::new(2),
            requested: 4,
            available: 3,
        })
    );
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Money::from_minor(15000, INR));

    Ok(())
}

#[test]
fn zero_stock_follows_policy() -> TestResult {
    let sold_out = CatalogItem {
        remaining_quantity: Some(0),
        ..coffee()
    };

    let mut strict = Cart::new(INR);
    let mut legacy = Cart::new(INR).with_stock_policy(StockPolicy::ZeroIsUnlimited);

    assert!(
        matches!(
            strict.add_catalog_item(&sold_out, Quantity::ONE),
            Err(BasketError::InsufficientStock { available: 0, .. })
        ),
        "zero stock should be out of stock by default"
    );

    legacy.add_catalog_item(&sold_out, Quantity::clamped(50))?;

    assert_eq!(legacy.total(), Money::from_minor(150_000, INR));

    Ok(())
}

#[test]
fn quantities_never_drop_below_one() -> TestResult {
    let mut cart = Cart::new(INR);
    cart.add_catalog_item(&coffee(), Quantity::clamped(2))?;

    let line = cart.update_quantity(ItemId::new(5), QuantityChange::Delta(-5))?;
    assert_eq!(line.quantity(), Quantity::ONE);

    let line = cart.update_quantity(ItemId::new(5), QuantityChange::Set(0))?;
    assert_eq!(line.quantity(), Quantity::ONE);

    let line = cart.set_quantity_from_input(ItemId::new(5), "two")?;
    assert_eq!(line.quantity(), Quantity::ONE);

    let line = cart.set_quantity_from_input(ItemId::new(5), " 4 ")?;
    assert_eq!(line.quantity(), Quantity::clamped(4));

    assert_eq!(cart.total(), Money::from_minor(12000, INR));

    Ok(())
}

#[test]
fn emptied_cart_cannot_be_submitted() -> TestResult {
    let mut cart = Cart::new(INR);
    cart.add_catalog_item(&coffee(), Quantity::ONE)?;

    cart.remove_line(ItemId::new(5))?;

    assert!(cart.is_empty(), "cart should be empty");
    assert_eq!(
        cart.to_order_request(PaymentStatus::Pending).err(),
        Some(BasketError::EmptyOrder)
    );

    Ok(())
}

#[test]
fn edit_increase_means_customer_pays() -> TestResult {
    let mut edit = order_of_100()?;

    edit.add_catalog_item(&dosa(), Quantity::ONE)?;
    let delta = compute_payment_delta(&edit)?;

    assert_eq!(delta.new_total, Money::from_minor(15000, INR));
    assert_eq!(delta.delta, Money::from_minor(5000, INR));
    assert_eq!(delta.direction, PaymentDirection::CustomerOwes);

    Ok(())
}

#[test]
fn edit_decrease_means_refund() -> TestResult {
    let mut edit = OrderEditSet::from_order_lines(
        INR,
        &[OrderLineRecord {
            id: 12,
            order_id: 43,
            item_id: ItemId::new(9),
            item_name: "Meals".to_string(),
            quantity: 10,
            unit_price: Decimal::new(10, 0),
            subtotal: Decimal::new(100, 0),
        }],
    )?;

    edit.update_quantity(ItemId::new(9), QuantityChange::Set(7))?;
    let delta = edit.payment_delta()?;

    assert_eq!(delta.delta, Money::from_minor(-3000, INR));
    assert_eq!(delta.direction, PaymentDirection::RefundDue);
    assert_eq!(delta.magnitude(), Money::from_minor(3000, INR));

    Ok(())
}

#[test]
fn last_line_of_an_edit_is_reset_not_removed() -> TestResult {
    let mut edit = order_of_100()?;

    assert_eq!(
        edit.remove_line(ItemId::new(2)).err(),
        Some(BasketError::CannotRemoveLastItem(ItemId::new(2)))
    );
    assert_eq!(edit.len(), 1);
    assert_eq!(edit.new_total(), Money::from_minor(10000, INR));

    let removed = edit.remove_line_or_reset(ItemId::new(2))?;

    assert!(!removed, "last line should be reset");
    assert_eq!(edit.new_total(), Money::from_minor(5000, INR));
    assert_eq!(edit.original_total(), Money::from_minor(10000, INR));

    let request = edit.to_modify_request()?;
    assert_eq!(
        serde_json::to_value(&request)?,
        serde_json::json!({ "items": [{ "item_id": 2, "quantity": 1 }] })
    );

    Ok(())
}

#[test]
fn edit_lines_can_be_removed_while_others_remain() -> TestResult {
    let mut edit = order_of_100()?;
    edit.add_catalog_item(&coffee(), Quantity::ONE)?;

    let removed = edit.remove_line_or_reset(ItemId::new(2))?;

    assert!(removed, "line should be removed");
    assert_eq!(edit.len(), 1);
    assert_eq!(edit.payment_delta()?.delta, Money::from_minor(-7000, INR));

    Ok(())
}
