//! # AppError
//!
//! Centralized error handling for topic-thumb.
//! Ineligible posts are NOT errors; see `eligibility::Ineligible`.

use thiserror::Error;

/// The primary error type for all tt-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Thread)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., malformed webhook payload)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Webhook delivery could not be authenticated
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The host refused to persist a thread
    #[error("persistence failure: {0:#}")]
    Persistence(anyhow::Error),

    /// Infrastructure failure on a read (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for topic-thumb logic.
pub type Result<T> = std::result::Result<T, AppError>;
