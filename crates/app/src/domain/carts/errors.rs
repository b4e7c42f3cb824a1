//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::{ledger::LedgerError, orders::records::OrderId},
    errors::FailureKind,
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("order not found")]
    OrderNotFound,

    #[error("order {0} is placed and can no longer change")]
    OrderPlaced(OrderId),

    #[error("product is not in the cart")]
    LineNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("line quantity is too large")]
    QuantityOverflow,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CartsServiceError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::OrderNotFound | Self::LineNotFound | Self::NotFound(_) => FailureKind::NotFound,
            Self::OrderPlaced(_) | Self::QuantityOverflow => FailureKind::InvalidState,
            Self::Ledger(error) => error.kind(),
            Self::Sql(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound("cart entry");
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound("referenced catalog entry"),
            Some(ErrorKind::CheckViolation) => Self::Ledger(LedgerError::NegativeBalance),
            _ => Self::Sql(error),
        }
    }
}
