use clap::{Args, Subcommand, ValueEnum};

use bistro_app::{
    context::AppContext,
    domain::orders::{
        data::NewOrder,
        records::{AddressId, CustomerId, DeliveryPartnerId, OrderId, OrderStatus, OrderType},
    },
};

use super::print_json;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Create a processing order and select it
    Create(CreateOrderArgs),

    /// Place a processing order
    Place(OrderArgs),

    /// Delete an order and everything it owns
    Delete(OrderArgs),

    /// List orders, most recently modified first
    List(ListOrdersArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderTypeArg {
    DineIn,
    DineOut,
}

impl From<OrderTypeArg> for OrderType {
    fn from(value: OrderTypeArg) -> Self {
        match value {
            OrderTypeArg::DineIn => Self::DineIn,
            OrderTypeArg::DineOut => Self::DineOut,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderStatusArg {
    Processing,
    Placed,
}

impl From<OrderStatusArg> for OrderStatus {
    fn from(value: OrderStatusArg) -> Self {
        match value {
            OrderStatusArg::Processing => Self::Processing,
            OrderStatusArg::Placed => Self::Placed,
        }
    }
}

#[derive(Debug, Args)]
struct CreateOrderArgs {
    #[arg(long = "type", value_enum, default_value_t = OrderTypeArg::DineIn)]
    order_type: OrderTypeArg,

    /// Auto-include applicable charges (dine-out only)
    #[arg(long)]
    charges_included: bool,

    #[arg(long)]
    customer: Option<i64>,

    #[arg(long)]
    address: Option<i64>,

    #[arg(long)]
    delivery_partner: Option<i64>,
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Order id
    #[arg(long)]
    id: i64,
}

#[derive(Debug, Args)]
struct ListOrdersArgs {
    #[arg(long, value_enum)]
    status: Option<OrderStatusArg>,
}

pub(crate) async fn run(ctx: &AppContext, command: OrderCommand) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Create(args) => {
            let order = ctx
                .orders
                .create_order(NewOrder {
                    order_type: args.order_type.into(),
                    charges_included: args.charges_included,
                    customer: args.customer.map(CustomerId::from_i64),
                    address: args.address.map(AddressId::from_i64),
                    delivery_partner: args.delivery_partner.map(DeliveryPartnerId::from_i64),
                })
                .await
                .map_err(|error| format!("failed to create order ({}): {error}", error.kind()))?;

            print_json(&order)
        }
        OrderSubcommand::Place(args) => {
            let order = ctx
                .orders
                .place_order(OrderId::from_i64(args.id))
                .await
                .map_err(|error| format!("failed to place order ({}): {error}", error.kind()))?;

            print_json(&order)
        }
        OrderSubcommand::Delete(args) => {
            ctx.orders
                .delete_order(OrderId::from_i64(args.id))
                .await
                .map_err(|error| format!("failed to delete order ({}): {error}", error.kind()))?;

            print_json(&serde_json::json!({ "deleted": args.id }))
        }
        OrderSubcommand::List(args) => {
            let orders = ctx
                .orders
                .list_orders(args.status.map(OrderStatus::from))
                .await
                .map_err(|error| format!("failed to list orders ({}): {error}", error.kind()))?;

            print_json(&orders)
        }
    }
}
