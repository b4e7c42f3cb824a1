//! Cart Repositories

mod add_ons;
mod charges;
mod lines;

pub(crate) use add_ons::SqliteAddOnMembershipsRepository;
pub(crate) use charges::SqliteChargeMembershipsRepository;
pub(crate) use lines::SqliteCartLinesRepository;
