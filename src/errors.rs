use thiserror::Error;

use crate::types::Source;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CashKickError {
    #[error("invalid contract {contract_id}: {reason}")]
    InvalidContract {
        contract_id: String,
        reason: String,
    },

    #[error("failed to fetch {origin}: {message}")]
    SourceFetch {
        origin: Source,
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid data: {message}")]
    InvalidData {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl From<serde_json::Error> for CashKickError {
    fn from(err: serde_json::Error) -> Self {
        CashKickError::InvalidData {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CashKickError>;
