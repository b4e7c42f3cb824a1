//! Catalog Repositories

mod add_ons;
mod charges;
mod products;

pub(crate) use add_ons::SqliteAddOnItemsRepository;
pub(crate) use charges::SqliteChargesRepository;
pub(crate) use products::SqliteProductsRepository;
