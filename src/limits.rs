//! Limits and constraints for input processing
//!
//! Every input is local and read whole, so the limits bound how much text is
//! accepted and how deeply the XML reader nests before giving up.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum XML element nesting depth
    pub max_xml_depth: usize,

    /// Maximum schema file size in bytes
    pub max_schema_size: usize,

    /// Maximum size of a sample or descriptor document in bytes
    pub max_json_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_schema_size: 100 * 1024 * 1024, // 100 MB
            max_json_size: 100 * 1024 * 1024,   // 100 MB
            max_attributes: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_schema_size: 10 * 1024 * 1024, // 10 MB
            max_json_size: 10 * 1024 * 1024,   // 10 MB
            max_attributes: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_schema_size: 1024 * 1024 * 1024, // 1 GB
            max_json_size: 1024 * 1024 * 1024,   // 1 GB
            max_attributes: 10000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a schema document is within the size limit
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a JSON document is within the size limit
    pub fn check_json_size(&self, size: usize) -> Result<()> {
        if size > self.max_json_size {
            Err(Error::LimitExceeded(format!(
                "JSON size {} bytes exceeds maximum {} bytes",
                size, self.max_json_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }
}
