use clap::{Args, Subcommand};

use bistro_app::{
    context::AppContext,
    domain::{
        carts::CartsServiceError,
        catalog::records::{AddOnItemId, ChargeId, ProductId},
        orders::records::OrderId,
    },
};

use super::print_json;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add one unit of a product
    Add(ProductArgs),

    /// Remove one unit of a product
    Remove(ProductArgs),

    /// Toggle an add-on item
    AddOn(AddOnArgs),

    /// Toggle a charge
    Charge(ChargeArgs),

    /// Print the cart snapshot
    Show(OrderArgs),

    /// Rebuild the price record from the cart contents
    Recalculate(OrderArgs),
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Order id
    #[arg(long)]
    order: i64,
}

#[derive(Debug, Args)]
struct ProductArgs {
    #[command(flatten)]
    order: OrderArgs,

    #[arg(long)]
    product: i64,
}

#[derive(Debug, Args)]
struct AddOnArgs {
    #[command(flatten)]
    order: OrderArgs,

    #[arg(long)]
    item: i64,
}

#[derive(Debug, Args)]
struct ChargeArgs {
    #[command(flatten)]
    order: OrderArgs,

    #[arg(long)]
    charge: i64,
}

fn describe(error: &CartsServiceError) -> String {
    format!("cart update failed ({}): {error}", error.kind())
}

pub(crate) async fn run(ctx: &AppContext, command: CartCommand) -> Result<(), String> {
    let carts = &ctx.carts;

    match command.command {
        CartSubcommand::Add(args) => {
            let price = carts
                .add_product(
                    OrderId::from_i64(args.order.order),
                    ProductId::from_i64(args.product),
                )
                .await
                .map_err(|error| describe(&error))?;

            print_json(&price)
        }
        CartSubcommand::Remove(args) => {
            let price = carts
                .remove_product(
                    OrderId::from_i64(args.order.order),
                    ProductId::from_i64(args.product),
                )
                .await
                .map_err(|error| describe(&error))?;

            print_json(&price)
        }
        CartSubcommand::AddOn(args) => {
            let toggle = carts
                .toggle_add_on_item(
                    OrderId::from_i64(args.order.order),
                    AddOnItemId::from_i64(args.item),
                )
                .await
                .map_err(|error| describe(&error))?;

            print_json(&toggle)
        }
        CartSubcommand::Charge(args) => {
            let toggle = carts
                .toggle_charge(
                    OrderId::from_i64(args.order.order),
                    ChargeId::from_i64(args.charge),
                )
                .await
                .map_err(|error| describe(&error))?;

            print_json(&toggle)
        }
        CartSubcommand::Show(args) => {
            let cart = carts
                .get_cart(OrderId::from_i64(args.order))
                .await
                .map_err(|error| describe(&error))?;

            print_json(&cart)
        }
        CartSubcommand::Recalculate(args) => {
            let price = carts
                .recalculate(OrderId::from_i64(args.order))
                .await
                .map_err(|error| describe(&error))?;

            print_json(&price)
        }
    }
}
