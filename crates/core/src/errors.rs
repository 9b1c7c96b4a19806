use thiserror::Error;

use crate::catalog::{CatalogError, MutationError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("rejected mutation: {0}")]
    Rejected(#[from] MutationError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<CatalogError> for ApplicationError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Load(message) | CatalogError::Persist(message) => {
                Self::Persistence(message)
            }
            CatalogError::Rejected(mutation) => Self::Rejected(mutation),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The store is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Rejected(mutation) => {
                InterfaceError::BadRequest { message: mutation.to_string(), correlation_id }
            }
            Self::Persistence(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
            Self::Configuration(message) | Self::Internal(message) => {
                InterfaceError::Internal { message, correlation_id }
            }
        }
    }
}
