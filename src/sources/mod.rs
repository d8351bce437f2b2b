//! Data source analysis
//!
//! - [`samples`] - sample payloads: id tables, stored values, flat fields
//! - [`descriptor`] - service form descriptor: component bindings
//!
//! Both inputs are informal JSON exports, so parsing falls back to the first
//! balanced `{...}` in the text before giving up on a document.

pub mod descriptor;
pub mod samples;

pub use descriptor::{DescriptorAnalysis, DescriptorAnalyzer};
pub use samples::{FieldKind, FlatField, SampleAnalysis, SampleAnalyzer, SampleDocument};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Where a source key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Id-to-source table entry
    IdTable,
    /// Stored-values dictionary entry
    StoredValue,
    /// Scalar or form field found by walking the payload
    FlatField,
    /// Choice selector field
    ChoiceSelector,
}

/// One key offered to the mapping engine, with the expression that reads it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCandidate {
    /// Key as found in the data
    pub key: String,
    /// Which table it came from
    pub provenance: Provenance,
    /// Source expression reading the key's value
    pub expression: String,
}

/// Parse a JSON document, falling back to its first balanced-brace object
pub fn parse_lenient(text: &str) -> std::result::Result<Value, String> {
    let err = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let embedded = first_balanced_object(text)
        .ok_or_else(|| format!("{} (no embedded JSON object found)", err))?;
    debug!(bytes = embedded.len(), "retrying with embedded JSON object");
    serde_json::from_str(embedded).map_err(|e| format!("{} (embedded object: {})", err, e))
}

/// The first `{...}` span with balanced braces, skipping braces inside strings
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// A JSON value as a key string: strings verbatim, anything else as JSON
pub(crate) fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
