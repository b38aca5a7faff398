use async_graphql::{Error, ErrorExtensions};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

pub type FleetResult<T> = Result<T, FleetError>;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ReferenceInUse(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("vehicle {0} has a status that disagrees with its status records")]
    CorruptState(Uuid),
    #[error("database error: {0}")]
    Db(DbErr),
}

impl FleetError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            FleetError::Validation(_) => "VALIDATION",
            FleetError::ReferenceInUse(_) => "REFERENCE_IN_USE",
            FleetError::InvalidTransition(_) => "INVALID_TRANSITION",
            FleetError::NotFound(_) => "NOT_FOUND",
            FleetError::CorruptState(_) | FleetError::Db(_) => "INTERNAL",
        }
    }
}

impl From<DbErr> for FleetError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                FleetError::Validation(format!("duplicate value ({})", detail))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => FleetError::ReferenceInUse(
                "record is still linked to other records".to_string(),
            ),
            _ => FleetError::Db(err),
        }
    }
}

impl ErrorExtensions for FleetError {
    fn extend(&self) -> Error {
        let message = match self {
            FleetError::CorruptState(_) | FleetError::Db(_) => {
                tracing::error!(error = %self, "fleet operation failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let code = self.code();
        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}
