//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use crate::credits::CreditKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("No {0} credits left")]
    CreditsExhausted(CreditKind),

    #[error("A {0} request is already in flight")]
    RequestInFlight(CreditKind),

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What the user can do next after a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Retry,
    UpgradePlan,
}

impl Error {
    /// Credit exhaustion is the only failure that asks for a plan change.
    pub fn recovery(&self) -> Recovery {
        match self {
            Error::CreditsExhausted(_) => Recovery::UpgradePlan,
            _ => Recovery::Retry,
        }
    }

    /// True for failures raised by the model call itself or its output.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::InvalidResponseShape(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
