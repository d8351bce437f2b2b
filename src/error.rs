//! Error types for xsdvm
//!
//! Only conditions that stop the whole pipeline are represented here.
//! Recoverable conditions (unparsable samples, cycles, unresolved types...)
//! are reported as [`Notice`](crate::diagnostics::Notice) values instead.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsdvm Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdvm operations
#[derive(Error, Debug)]
pub enum Error {
    /// The schema could not be opened or is not well-formed XML
    #[error("schema load error: {0}")]
    SchemaLoad(#[from] SchemaLoadError),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal schema loading error with context
#[derive(Debug, Clone)]
pub struct SchemaLoadError {
    /// Error message
    pub message: String,
    /// Which schema input failed (file path or "<string>")
    pub location: Option<String>,
    /// Schema source snippet that caused the error
    pub source: Option<String>,
}

impl SchemaLoadError {
    /// Create a new schema load error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for SchemaLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaLoadError {}
