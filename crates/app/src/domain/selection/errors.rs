//! Selection errors.

use sqlx::Error;
use thiserror::Error;

use crate::{domain::orders::records::OrderId, errors::FailureKind};

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("order {0} is already placed")]
    OrderPlaced(OrderId),

    #[error("selection coordinator is not running")]
    Unavailable,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl SelectionError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::OrderNotFound(_) => FailureKind::NotFound,
            Self::OrderPlaced(_) => FailureKind::InvalidState,
            Self::Unavailable | Self::Sql(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl From<Error> for SelectionError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
