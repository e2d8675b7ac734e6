//! # DomainError
//!
//! Centralized error handling for the solution portal.
//! Maps collaborator failures to actionable error types.

use std::time::Duration;

use thiserror::Error;

/// The primary error type for all port operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource not found (e.g., Course, Exercise, image file)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., unknown exercise type label)
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote store or media source refused or failed the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A request exceeded its time bound
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Anything else (decode failure, broken invariant in an adapter)
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Fetch failures the user can retry in place.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// A specialized Result type for port operations.
pub type Result<T> = std::result::Result<T, DomainError>;
