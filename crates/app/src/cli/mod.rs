use clap::{Parser, Subcommand};
use serde::Serialize;

use bistro_app::{config::AppConfig, context::AppContext, database, observability};

mod cart;
mod catalog;
mod order;

#[derive(Debug, Parser)]
#[command(name = "bistro", about = "Bistro order data CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    Catalog(catalog::CatalogCommand),
    Order(order::OrderCommand),
    Cart(cart::CartCommand),

    /// Show the currently selected order
    Selected,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_logging(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let database_url = &self.config.database.database_url;

        match self.command {
            Commands::Migrate => migrate(database_url).await,
            Commands::Catalog(command) => catalog::run(&open(database_url).await?, command).await,
            Commands::Order(command) => order::run(&open(database_url).await?, command).await,
            Commands::Cart(command) => cart::run(&open(database_url).await?, command).await,
            Commands::Selected => {
                let selected = open(database_url)
                    .await?
                    .selection
                    .current()
                    .await
                    .map_err(|error| format!("failed to read selection: {error}"))?;

                print_json(&selected)
            }
        }
    }
}

async fn open(database_url: &str) -> Result<AppContext, String> {
    AppContext::from_database_url(database_url)
        .await
        .map_err(|error| format!("failed to open database: {error}"))
}

async fn migrate(database_url: &str) -> Result<(), String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to serialise output: {error}"))?;

    println!("{json}");

    Ok(())
}
