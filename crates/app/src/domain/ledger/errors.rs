//! Price ledger errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{domain::orders::records::OrderId, errors::FailureKind};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no price record for order {0}")]
    PriceRecordNotFound(OrderId),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(
        "price record would become negative; recalculate the order to pick up current \
         catalog prices"
    )]
    NegativeBalance,

    #[error("invalid price value")]
    InvalidPrice(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl LedgerError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PriceRecordNotFound(_) | Self::NotFound(_) => FailureKind::NotFound,
            Self::NegativeBalance | Self::InvalidPrice(_) => FailureKind::InvalidState,
            Self::Sql(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl From<Error> for LedgerError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::NegativeBalance,
            _ => Self::Sql(error),
        }
    }
}
