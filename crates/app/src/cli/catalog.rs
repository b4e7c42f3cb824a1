use clap::{Args, Subcommand};

use bistro_app::{
    context::AppContext,
    domain::catalog::data::{NewAddOnItem, NewCharge, NewProduct},
};

use super::print_json;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List products, add-on items and charges
    List,

    /// Create a product
    Product(NewEntryArgs),

    /// Create an add-on item
    AddOn(NewApplicableEntryArgs),

    /// Create a charge
    Charge(NewApplicableEntryArgs),
}

#[derive(Debug, Args)]
struct NewEntryArgs {
    #[arg(long)]
    name: String,

    /// Price in minor currency units
    #[arg(long)]
    price: u64,
}

#[derive(Debug, Args)]
struct NewApplicableEntryArgs {
    #[command(flatten)]
    entry: NewEntryArgs,

    /// Whether the entry counts towards the payable total
    #[arg(long)]
    applicable: bool,
}

pub(crate) async fn run(ctx: &AppContext, command: CatalogCommand) -> Result<(), String> {
    let catalog = &ctx.catalog;

    match command.command {
        CatalogSubcommand::List => {
            let listed = tokio::try_join!(
                catalog.list_products(),
                catalog.list_add_on_items(),
                catalog.list_charges(),
            );

            let (products, add_on_items, charges) =
                listed.map_err(|error| format!("failed to list catalog: {error}"))?;

            print_json(&serde_json::json!({
                "products": products,
                "add_on_items": add_on_items,
                "charges": charges,
            }))
        }
        CatalogSubcommand::Product(args) => {
            let product = catalog
                .create_product(NewProduct {
                    name: args.name,
                    price: args.price,
                })
                .await
                .map_err(|error| format!("failed to create product: {error}"))?;

            print_json(&product)
        }
        CatalogSubcommand::AddOn(args) => {
            let item = catalog
                .create_add_on_item(NewAddOnItem {
                    name: args.entry.name,
                    price: args.entry.price,
                    is_applicable: args.applicable,
                })
                .await
                .map_err(|error| format!("failed to create add-on item: {error}"))?;

            print_json(&item)
        }
        CatalogSubcommand::Charge(args) => {
            let charge = catalog
                .create_charge(NewCharge {
                    name: args.entry.name,
                    price: args.entry.price,
                    is_applicable: args.applicable,
                })
                .await
                .map_err(|error| format!("failed to create charge: {error}"))?;

            print_json(&charge)
        }
    }
}
