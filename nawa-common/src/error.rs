//! Common error types for Nawa

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Common result type for Nawa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Nawa crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload rejected before reaching storage
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Unique constraint violated on insert
    #[error("Duplicate value for {field} in {table}")]
    Duplicate { table: &'static str, field: &'static str },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
