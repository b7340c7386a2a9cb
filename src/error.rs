//! Request error type
//!
//! Handlers return `Result<_, ApiError>` and propagate with `?`. The router
//! renders every error through [`ApiError::status`] and [`ApiError::kind`].

use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    /// A referenced entity is missing or not owned by the caller
    #[error("{0}")]
    InvalidData(String),
    #[error("{0}")]
    NotFound(String),
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error type for the response body
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidData(_) => "invalid_data",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Store(_) => "unknown_error",
        }
    }

    /// Message safe to return to clients; backend details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "An unknown error occurred.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
