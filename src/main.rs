//! Tally CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use tally::{
    client::{HttpOrdersApi, OrdersApi},
    config::{
        CatalogArgs, Command, Config, ItemCommand, ItemSubcommand, ModifyArgs, OrderIdArgs,
        OrdersArgs, SessionArgs, SubmitArgs,
    },
    fixtures::Fixture,
    inventory,
    items::ItemId,
    observability::init_logging,
    orders::PaymentStatus,
    receipt::{Receipt, write_catalog, write_orders},
    session,
};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            _ = error.print();
            return ExitCode::from(2);
        }
    };

    if let Err(error) = init_logging(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");

            #[expect(clippy::print_stderr, reason = "errors are reported to the cashier")]
            {
                eprintln!("{message}");
            }

            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), String> {
    let mut out = io::stdout().lock();

    match &config.command {
        Command::Catalog(args) => catalog(config, args, &mut out),
        Command::Cart(args) => cart(config, args, &mut out),
        Command::Edit(args) => edit(config, args, &mut out),
        Command::Submit(args) => submit(config, args, &mut out).await,
        Command::Orders(args) => orders(config, args, &mut out).await,
        Command::Modify(args) => modify(config, args, &mut out).await,
        Command::Cancel(args) => cancel(config, args, &mut out).await,
        Command::Pay(args) => pay(config, args, &mut out).await,
        Command::Item(command) => item(config, command, &mut out).await,
        Command::Restock => restock(config, &mut out).await,
    }
}

fn fixture(config: &Config, session: &str) -> Result<Fixture, String> {
    Fixture::from_session(&config.fixtures, session)
        .map(|fixture| fixture.with_stock_policy(config.stock_policy))
        .map_err(|error| format!("failed to load session {session}: {error}"))
}

fn api(config: &Config) -> Result<HttpOrdersApi, String> {
    config
        .api_url
        .as_deref()
        .map(HttpOrdersApi::new)
        .ok_or_else(|| "no backend configured; set --api-url or TALLY_API_URL".to_string())
}

fn catalog(config: &Config, args: &CatalogArgs, out: &mut impl Write) -> Result<(), String> {
    let mut fixture = Fixture::with_base_path(&config.fixtures);

    fixture
        .load_catalog(&args.name)
        .map_err(|error| format!("failed to load catalog {}: {error}", args.name))?;

    let items: Vec<_> = fixture
        .catalog()
        .into_iter()
        .filter(|item| args.query.as_deref().is_none_or(|query| item.matches(query)))
        .collect();

    write_catalog(&items, out).map_err(|error| error.to_string())
}

fn cart(config: &Config, args: &SessionArgs, out: &mut impl Write) -> Result<(), String> {
    let cart = fixture(config, &args.session)?
        .cart()
        .map_err(|error| format!("failed to build cart: {error}"))?;

    Receipt::new(&cart)
        .write_to(&mut *out)
        .map_err(|error| error.to_string())?;

    if cart.is_empty() {
        return Ok(());
    }

    let request = cart
        .to_order_request(PaymentStatus::Pending)
        .map_err(|error| error.to_string())?;
    let body = serde_json::to_string_pretty(&request).map_err(|error| error.to_string())?;

    writeln!(out, "\nPOST /api/create-order\n{body}").map_err(|error| error.to_string())
}

fn edit(config: &Config, args: &SessionArgs, out: &mut impl Write) -> Result<(), String> {
    let fixture = fixture(config, &args.session)?;
    let edit = fixture
        .edit_set()
        .map_err(|error| format!("failed to build edit set: {error}"))?;

    Receipt::for_edit_set(&edit)
        .and_then(|receipt| receipt.write_to(&mut *out))
        .map_err(|error| error.to_string())?;

    let request = edit.to_modify_request().map_err(|error| error.to_string())?;
    let body = serde_json::to_string_pretty(&request).map_err(|error| error.to_string())?;
    let order_id = fixture.edit_order_id().unwrap_or_default();

    writeln!(out, "\nPUT /api/modify-order/{order_id}\n{body}").map_err(|error| error.to_string())
}

async fn submit(config: &Config, args: &SubmitArgs, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let mut cart = fixture(config, &args.session)?
        .cart()
        .map_err(|error| format!("failed to build cart: {error}"))?;

    Receipt::new(&cart)
        .write_to(&mut *out)
        .map_err(|error| error.to_string())?;

    session::submit_cart(&api, &mut cart, args.status)
        .await
        .map_err(|error| format!("failed to place order: {error}"))?;

    writeln!(out, "Order placed successfully").map_err(|error| error.to_string())
}

async fn orders(config: &Config, args: &OrdersArgs, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let orders = api
        .search_orders(&args.to_query())
        .await
        .map_err(|error| format!("failed to search orders: {error}"))?;

    write_orders(&orders, out).map_err(|error| error.to_string())
}

async fn modify(config: &Config, args: &ModifyArgs, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let mut edit = session::load_edit_set(&api, args.order_id, config.currency)
        .await
        .map_err(|error| format!("failed to load order {}: {error}", args.order_id))?
        .with_stock_policy(config.stock_policy);

    session::apply_edits(&api, &mut edit, &args.actions())
        .await
        .map_err(|error| format!("failed to apply changes: {error}"))?;

    Receipt::for_edit_set(&edit)
        .and_then(|receipt| receipt.write_to(&mut *out))
        .map_err(|error| error.to_string())?;

    if args.dry_run {
        return Ok(());
    }

    let response = session::save_edit_set(&api, args.order_id, &edit)
        .await
        .map_err(|error| format!("failed to modify order {}: {error}", args.order_id))?;

    writeln!(out, "{}", response.summary()).map_err(|error| error.to_string())
}

async fn cancel(config: &Config, args: &OrderIdArgs, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let order = session::find_order(&api, args.order_id)
        .await
        .map_err(|error| error.to_string())?;

    session::cancel_order(&api, &order)
        .await
        .map_err(|error| format!("failed to cancel order: {error}"))?;

    writeln!(out, "Order {} cancelled", order.id).map_err(|error| error.to_string())
}

async fn pay(config: &Config, args: &OrderIdArgs, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let order = session::find_order(&api, args.order_id)
        .await
        .map_err(|error| error.to_string())?;

    session::mark_paid(&api, &order)
        .await
        .map_err(|error| format!("failed to mark order as paid: {error}"))?;

    writeln!(out, "Order {} marked as paid", order.id).map_err(|error| error.to_string())
}

async fn item(config: &Config, command: &ItemCommand, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;

    match &command.command {
        ItemSubcommand::Show { item_id } => {
            let item = api
                .get_item(ItemId::new(*item_id))
                .await
                .map_err(|error| format!("failed to fetch item {item_id}: {error}"))?;

            write_catalog(&[&item], out).map_err(|error| error.to_string())
        }
        ItemSubcommand::Add(details) => {
            let details = details.to_item().map_err(|error| error.to_string())?;
            let item_id = inventory::create_item(&api, &details)
                .await
                .map_err(|error| format!("failed to create item: {error}"))?;

            writeln!(out, "Item {item_id} created").map_err(|error| error.to_string())
        }
        ItemSubcommand::Update { item_id, details } => {
            let details = details.to_item().map_err(|error| error.to_string())?;

            inventory::update_item(&api, ItemId::new(*item_id), &details)
                .await
                .map_err(|error| format!("failed to update item {item_id}: {error}"))?;

            writeln!(out, "Item {item_id} updated").map_err(|error| error.to_string())
        }
        ItemSubcommand::Delete { item_id } => {
            inventory::delete_item(&api, ItemId::new(*item_id))
                .await
                .map_err(|error| format!("failed to delete item {item_id}: {error}"))?;

            writeln!(out, "Item {item_id} deleted").map_err(|error| error.to_string())
        }
    }
}

async fn restock(config: &Config, out: &mut impl Write) -> Result<(), String> {
    let api = api(config)?;
    let mut items = api
        .list_items()
        .await
        .map_err(|error| format!("failed to list items: {error}"))?;

    inventory::restock_all(&api, &mut items)
        .await
        .map_err(|error| format!("failed to restock: {error}"))?;

    let items: Vec<_> = items.iter().collect();

    write_catalog(&items, out).map_err(|error| error.to_string())
}
