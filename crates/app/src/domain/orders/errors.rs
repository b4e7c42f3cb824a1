//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::{ledger::LedgerError, orders::records::OrderId, selection::SelectionError},
    errors::FailureKind,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("order {0} is already placed")]
    AlreadyPlaced(OrderId),

    #[error("dine-in orders cannot carry a customer or an address")]
    Inconsistent,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Selection(SelectionError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound => FailureKind::NotFound,
            Self::AlreadyPlaced(_) | Self::Inconsistent => FailureKind::InvalidState,
            Self::Ledger(error) => error.kind(),
            Self::Selection(error) => error.kind(),
            Self::Sql(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::Inconsistent,
            _ => Self::Sql(error),
        }
    }
}

impl From<SelectionError> for OrdersServiceError {
    fn from(error: SelectionError) -> Self {
        match error {
            SelectionError::OrderNotFound(_) => Self::NotFound,
            SelectionError::OrderPlaced(order) => Self::AlreadyPlaced(order),
            error => Self::Selection(error),
        }
    }
}
