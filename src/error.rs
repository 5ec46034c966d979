//! Error types for the Mailsift library.
//!
//! All errors are represented by the [`MailsiftError`] enum, which provides
//! detailed information about what went wrong.
//!
//! # Examples
//!
//! ```
//! use mailsift::error::{MailsiftError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MailsiftError::training("dataset is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Mailsift operations.
///
/// This enum represents all possible errors that can occur in the Mailsift
/// library. It uses the `thiserror` crate for automatic `Error` trait
/// implementation and provides convenient constructor methods for creating
/// specific error types.
#[derive(Error, Debug)]
pub enum MailsiftError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No supported text encoding decodes the dataset file.
    #[error("Dataset encoding error: {0}")]
    DatasetEncoding(String),

    /// Dataset columns match neither known schema.
    #[error("Dataset schema error: {0}")]
    DatasetSchema(String),

    /// Training data lacks one of the two classes.
    #[error("Insufficient classes: {0}")]
    InsufficientClasses(String),

    /// Requested model is untrained or unknown.
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// A persisted artifact is absent from durable storage.
    #[error("Persistence error: {0}")]
    PersistenceMissing(String),

    /// Vectorizer misuse (re-fit, transform before fit, ...).
    #[error("Vectorizer error: {0}")]
    Vectorizer(String),

    /// Training-related errors (numerical failures, bad shapes, ...).
    #[error("Training error: {0}")]
    Training(String),

    /// CSV parsing errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with MailsiftError.
pub type Result<T> = std::result::Result<T, MailsiftError>;

impl MailsiftError {
    /// Create a new dataset encoding error.
    pub fn dataset_encoding<S: Into<String>>(msg: S) -> Self {
        MailsiftError::DatasetEncoding(msg.into())
    }

    /// Create a new dataset schema error.
    pub fn dataset_schema<S: Into<String>>(msg: S) -> Self {
        MailsiftError::DatasetSchema(msg.into())
    }

    /// Create a new insufficient classes error.
    pub fn insufficient_classes<S: Into<String>>(msg: S) -> Self {
        MailsiftError::InsufficientClasses(msg.into())
    }

    /// Create a new model-not-available error.
    pub fn model_not_available<S: Into<String>>(msg: S) -> Self {
        MailsiftError::ModelNotAvailable(msg.into())
    }

    /// Create a new persistence error.
    pub fn persistence_missing<S: Into<String>>(msg: S) -> Self {
        MailsiftError::PersistenceMissing(msg.into())
    }

    /// Create a new vectorizer error.
    pub fn vectorizer<S: Into<String>>(msg: S) -> Self {
        MailsiftError::Vectorizer(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        MailsiftError::Training(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MailsiftError::Other(msg.into())
    }
}
