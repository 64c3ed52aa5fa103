//! Session Fixtures

use serde::Deserialize;

/// A scripted point-of-sale session
#[derive(Debug, Deserialize)]
pub struct SessionFixture {
    /// Catalog fixture the session draws items from
    pub catalog: String,

    /// Items added to a new cart, in order
    #[serde(default)]
    pub cart: Vec<LineFixture>,

    /// Modification of an already-submitted order
    #[serde(default)]
    pub edit: Option<EditFixture>,
}

/// An item key and quantity
#[derive(Debug, Clone, Deserialize)]
pub struct LineFixture {
    /// Catalog item key
    pub item: String,

    /// Units, defaulting to one
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Modification session fixture
#[derive(Debug, Deserialize)]
pub struct EditFixture {
    /// Backend order id
    pub order_id: u64,

    /// Lines recorded for the order before modification
    pub recorded: Vec<LineFixture>,

    /// Changes applied by the cashier, in order
    #[serde(default)]
    pub changes: Vec<EditChange>,
}

/// One cashier action in a modification session
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditChange {
    /// Add units of an item
    Add {
        /// Catalog item key
        item: String,
        /// Units to add
        #[serde(default = "default_quantity")]
        quantity: u32,
    },

    /// Set a line's quantity from raw input
    Set {
        /// Catalog item key
        item: String,
        /// Raw quantity input
        quantity: String,
    },

    /// Remove a line, or reset it if it is the last one
    Remove {
        /// Catalog item key
        item: String,
    },
}

fn default_quantity() -> u32 {
    1
}
