use thiserror::Error;

use crate::model::period::Period;

/// Rejections for user-entered readings. All of these leave the stored
/// collection untouched; there is nothing to roll back.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("all fields are required and must be numeric")]
    IncompleteInput,
    #[error("current reading cannot be lower than the previous one")]
    NegativeConsumption,
    #[error("a record for {0} already exists for this lot")]
    DuplicatePeriod(Period),
    #[error("'{0}' is not a valid lot number")]
    InvalidLotKey(String),
    #[error("'{0}' is not a valid period (expected YYYY-MM)")]
    InvalidPeriod(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("identity store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}
