//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use rusty_money::{Findable, iso::Currency};

use crate::{
    catalog::{CatalogError, InventoryItem, StockPolicy},
    items::{ItemId, Quantity},
    orders::PaymentStatus,
    search::{OrderQuery, SortKey, SortOrder, parse_day},
    session::EditAction,
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Tally point-of-sale configuration
#[derive(Debug, Parser)]
#[command(name = "tally", about = "Point-of-sale cart and order pricing", long_about = None)]
pub struct Config {
    /// Directory holding `catalog/` and `sessions/` fixtures
    #[arg(long, env = "TALLY_FIXTURES", default_value = "./fixtures", global = true)]
    pub fixtures: PathBuf,

    /// How a recorded stock of zero is treated
    #[arg(
        long,
        env = "TALLY_STOCK_POLICY",
        value_enum,
        default_value_t = StockPolicy::default(),
        global = true
    )]
    pub stock_policy: StockPolicy,

    /// Currency for baskets built from backend data
    #[arg(
        long,
        env = "TALLY_CURRENCY",
        default_value = "INR",
        value_parser = parse_currency,
        global = true
    )]
    pub currency: &'static Currency,

    /// Backend base URL
    #[arg(long, env = "TALLY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

/// Actions the CLI can run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List or search a fixture catalog
    Catalog(CatalogArgs),

    /// Replay a session's cart and print its receipt and order request
    Cart(SessionArgs),

    /// Replay a session's order modification and print the payment adjustment
    Edit(SessionArgs),

    /// Replay a session's cart and submit it to the backend
    Submit(SubmitArgs),

    /// Search the backend's order history
    Orders(OrdersArgs),

    /// Modify a submitted order on the backend
    Modify(ModifyArgs),

    /// Cancel an order, returning its stock
    Cancel(OrderIdArgs),

    /// Mark a pending order as paid
    Pay(OrderIdArgs),

    /// Manage catalog items on the backend
    Item(ItemCommand),

    /// Reset every item's stock on the backend
    Restock,
}

/// Arguments for `catalog`.
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog fixture name
    #[arg(default_value = "canteen")]
    pub name: String,

    /// Only show items whose name contains this text
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Arguments for `cart` and `edit`.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session fixture name
    pub session: String,
}

/// Arguments for `submit`.
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Session fixture name
    pub session: String,

    /// Payment status of the new order
    #[arg(long, value_enum, default_value_t = PaymentStatus::Pending)]
    pub status: PaymentStatus,
}

/// Arguments for `orders`.
#[derive(Debug, Args)]
pub struct OrdersArgs {
    /// Payment status to match
    #[arg(long, value_enum)]
    pub status: Option<PaymentStatus>,

    /// Text contained in any item name
    #[arg(long)]
    pub item_name: Option<String>,

    /// Minimum total units
    #[arg(long)]
    pub min_quantity: Option<u64>,

    /// Maximum total units
    #[arg(long)]
    pub max_quantity: Option<u64>,

    /// Earliest order day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest order day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Sort field
    #[arg(long, value_enum, default_value_t = SortKey::default())]
    pub sort_by: SortKey,

    /// Sort direction
    #[arg(long, value_enum, default_value_t = SortOrder::default())]
    pub sort_order: SortOrder,
}

/// Arguments for `modify`.
///
/// Additions apply first, then quantity changes, then removals.
#[derive(Debug, Args)]
pub struct ModifyArgs {
    /// Backend order id
    pub order_id: u64,

    /// Add units of an item, as `ITEM_ID[:QUANTITY]`
    #[arg(long, value_parser = parse_add)]
    pub add: Vec<EditAction>,

    /// Set a line's quantity, as `ITEM_ID:QUANTITY`
    #[arg(long, value_parser = parse_set)]
    pub set: Vec<EditAction>,

    /// Remove a line; the last line is reset to one instead
    #[arg(long)]
    pub remove: Vec<u64>,

    /// Print the adjusted receipt without saving
    #[arg(long)]
    pub dry_run: bool,
}

impl ModifyArgs {
    /// Changes in the order they are applied.
    pub fn actions(&self) -> Vec<EditAction> {
        let removals = self.remove.iter().map(|&id| EditAction::Remove {
            item_id: ItemId::new(id),
        });

        self.add
            .iter()
            .chain(&self.set)
            .cloned()
            .chain(removals)
            .collect()
    }
}

/// Arguments for commands acting on one order.
#[derive(Debug, Args)]
pub struct OrderIdArgs {
    /// Backend order id
    pub order_id: u64,
}

/// Arguments for `item`.
#[derive(Debug, Args)]
pub struct ItemCommand {
    /// Item action
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

/// Catalog item actions.
#[derive(Debug, Subcommand)]
pub enum ItemSubcommand {
    /// Show one item
    Show {
        /// Item id
        item_id: u64,
    },

    /// Add an item
    Add(InventoryArgs),

    /// Replace an item's details
    Update {
        /// Item id
        item_id: u64,

        /// New details
        #[command(flatten)]
        details: InventoryArgs,
    },

    /// Delete an item no order refers to
    Delete {
        /// Item id
        item_id: u64,
    },
}

/// Item details sent to the backend.
#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Price per unit
    #[arg(long)]
    pub price: Decimal,

    /// Units in stock; omit when stock is not tracked
    #[arg(long)]
    pub stock: Option<u32>,
}

impl InventoryArgs {
    /// Validate into an inventory record.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for a blank name or a non-positive price.
    pub fn to_item(&self) -> Result<InventoryItem, CatalogError> {
        InventoryItem::new(&self.name, self.price, self.stock)
    }
}

impl OrdersArgs {
    /// Build the search query. Unparseable dates are ignored.
    pub fn to_query(&self) -> OrderQuery {
        OrderQuery {
            status: self.status,
            item_name: self.item_name.clone(),
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            order_date_start: self.from.as_deref().and_then(parse_day),
            order_date_end: self.to.as_deref().and_then(parse_day),
            payment_date_start: None,
            payment_date_end: None,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

fn parse_item_id(value: &str) -> Result<ItemId, String> {
    value
        .trim()
        .parse::<u64>()
        .map(ItemId::new)
        .map_err(|error| format!("invalid item id {value:?}: {error}"))
}

fn parse_add(value: &str) -> Result<EditAction, String> {
    let (item_id, quantity) = match value.split_once(':') {
        Some((item_id, quantity)) => {
            let quantity = quantity
                .trim()
                .parse::<u32>()
                .map_err(|error| format!("invalid quantity {quantity:?}: {error}"))
                .and_then(|quantity| Quantity::try_from(quantity).map_err(|e| e.to_string()))?;

            (item_id, quantity)
        }
        None => (value, Quantity::ONE),
    };

    Ok(EditAction::Add {
        item_id: parse_item_id(item_id)?,
        quantity,
    })
}

fn parse_set(value: &str) -> Result<EditAction, String> {
    let (item_id, input) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ITEM_ID:QUANTITY, got {value:?}"))?;

    Ok(EditAction::Set {
        item_id: parse_item_id(item_id)?,
        input: input.to_string(),
    })
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    Currency::find(&code.to_ascii_uppercase()).ok_or_else(|| format!("unknown currency: {code}"))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_session_command_with_defaults() -> TestResult {
        let config = Config::try_parse_from(["tally", "cart", "lunch"])?;

        assert_eq!(config.currency, INR);
        assert_eq!(config.stock_policy, StockPolicy::ZeroIsOutOfStock);
        assert!(
            matches!(
                config.command,
                Command::Cart(SessionArgs { ref session }) if session == "lunch"
            ),
            "unexpected command: {:?}",
            config.command
        );

        Ok(())
    }

    #[test]
    fn global_options_follow_the_subcommand() -> TestResult {
        let config = Config::try_parse_from([
            "tally",
            "edit",
            "refund",
            "--currency",
            "gbp",
            "--stock-policy",
            "zero-is-unlimited",
        ])?;

        assert_eq!(config.currency, GBP);
        assert_eq!(config.stock_policy, StockPolicy::ZeroIsUnlimited);

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = Config::try_parse_from(["tally", "cart", "lunch", "--currency", "XYZ"]);

        assert!(result.is_err(), "XYZ should not parse");
    }

    #[test]
    fn modify_args_collect_actions_in_order() -> TestResult {
        let config = Config::try_parse_from([
            "tally",
            "modify",
            "12",
            "--remove",
            "4",
            "--add",
            "2:3",
            "--set",
            "5:2.5",
            "--add",
            "6",
            "--dry-run",
        ])?;

        let Command::Modify(args) = config.command else {
            return Err("expected modify command".into());
        };

        assert_eq!(args.order_id, 12);
        assert!(args.dry_run, "dry run flag should be set");
        assert_eq!(
            args.actions(),
            vec![
                EditAction::Add {
                    item_id: ItemId::new(2),
                    quantity: Quantity::clamped(3),
                },
                EditAction::Add {
                    item_id: ItemId::new(6),
                    quantity: Quantity::ONE,
                },
                EditAction::Set {
                    item_id: ItemId::new(5),
                    input: "2.5".to_string(),
                },
                EditAction::Remove {
                    item_id: ItemId::new(4),
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn modify_args_reject_malformed_changes() {
        for args in [
            ["tally", "modify", "1", "--add", "2:0"],
            ["tally", "modify", "1", "--add", "dosa"],
            ["tally", "modify", "1", "--set", "2"],
        ] {
            assert!(Config::try_parse_from(args).is_err(), "{args:?} should not parse");
        }
    }

    #[test]
    fn item_update_builds_validated_record() -> TestResult {
        let config = Config::try_parse_from([
            "tally",
            "item",
            "update",
            "3",
            "--name",
            " Lassi ",
            "--price",
            "60.50",
            "--stock",
            "8",
        ])?;

        let Command::Item(ItemCommand {
            command: ItemSubcommand::Update { item_id, details },
        }) = config.command
        else {
            return Err("expected item update command".into());
        };

        assert_eq!(item_id, 3);
        assert_eq!(
            details.to_item()?,
            InventoryItem {
                item_name: "Lassi".to_string(),
                price_per_quantity: Decimal::new(6050, 2),
                remaining_quantity: Some(8),
            }
        );

        Ok(())
    }

    #[test]
    fn orders_args_build_query() -> TestResult {
        let config = Config::try_parse_from([
            "tally",
            "orders",
            "--status",
            "pending",
            "--from",
            "2024-03-01",
            "--to",
            "not a date",
            "--sort-by",
            "price",
            "--sort-order",
            "asc",
        ])?;

        let Command::Orders(args) = config.command else {
            return Err("expected orders command".into());
        };
        let query = args.to_query();

        assert_eq!(query.status, Some(PaymentStatus::Pending));
        assert_eq!(query.order_date_start, Some(date(2024, 3, 1)));
        assert_eq!(query.order_date_end, None);
        assert_eq!(query.sort_by, SortKey::Price);
        assert_eq!(query.sort_order, SortOrder::Asc);

        Ok(())
    }
}
