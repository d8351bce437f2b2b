//! Resource loading utilities
//!
//! Reads schema, sample and descriptor inputs into memory.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::fs;

/// What kind of document is being loaded, for size checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An XSD document
    Schema,
    /// A sample payload or service descriptor
    Json,
}

/// Resource loader for schemas and JSON documents
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits in effect
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location, kind: ResourceKind) -> Result<String> {
        let content = match location {
            Location::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Location::String(s) => s.clone(),
        };

        match kind {
            ResourceKind::Schema => self.limits.check_schema_size(content.len())?,
            ResourceKind::Json => self.limits.check_json_size(content.len())?,
        }

        Ok(content)
    }
}
