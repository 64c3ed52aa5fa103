//! Tally
//!
//! Tally is the pricing core of a canteen point-of-sale: a cart for new orders, an edit set for
//! modifying submitted orders, and the payment adjustment owed when an order changes.
//!
//! Both baskets share one engine, [`basket::Basket`], parameterised by how it is consumed.
//! Quantities are always at least one, totals are exact in minor units, and a failed mutation
//! leaves the basket unchanged.

pub mod basket;
pub mod catalog;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod inventory;
pub mod items;
pub mod observability;
pub mod orders;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod search;
pub mod session;
