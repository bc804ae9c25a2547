//! Error types for the region cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for regions, access strategies and the backing store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Operation is not allowed by the region's access strategy
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Region or strategy could not be built from the given settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backing store could not complete the call
    #[error("Store error: {0}")]
    Store(String),

    /// Store is full and nothing could be evicted
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// No region registered under this name
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnsupportedOperation(_) => StatusCode::CONFLICT,
            CacheError::Configuration(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::RegionNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::CacheFull(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the region cache.
pub type Result<T> = std::result::Result<T, CacheError>;
