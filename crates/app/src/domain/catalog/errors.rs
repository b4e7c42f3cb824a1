//! Catalog service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::FailureKind;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("still referenced by an order")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CatalogServiceError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::AlreadyExists(_) | Self::InvalidReference | Self::InvalidData | Self::Sql(_) => {
                FailureKind::PersistenceFailure
            }
        }
    }
}

impl From<Error> for CatalogServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound("catalog entry");
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists("catalog entry"),
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
