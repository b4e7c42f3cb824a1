//! Failure classification shared by every service.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

/// Coarse failure kind reported to callers alongside the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A referenced order, product, add-on item or charge does not exist.
    NotFound,

    /// The operation is not allowed in the current state.
    InvalidState,

    /// The store rejected a read or a write.
    PersistenceFailure,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::InvalidState => "invalid state",
            Self::PersistenceFailure => "persistence failure",
        })
    }
}
