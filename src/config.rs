//! Configuration
//!
//! Every naming convention the compiler, the analyzers and the mapping engine
//! rely on lives here, with defaults matching the service platform the
//! templates are written for. A JSON config file only needs the fields it
//! overrides.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::is_valid_ncname;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template output syntax
    pub template: TemplateSyntax,
    /// Shape of generated source expressions
    pub sources: SourceSyntax,
    /// Key conventions of sample payloads
    pub samples: SampleConventions,
    /// Key conventions of the service descriptor
    pub descriptor: DescriptorConventions,
    /// Fuzzy matching thresholds
    pub matching: MatchingOptions,
    /// Input limits
    pub limits: Limits,
}

/// Template output syntax
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TemplateSyntax {
    /// Prefix of every placeholder token
    pub placeholder_prefix: String,
    /// Name of the synthetic root element
    pub root_name: String,
    /// One level of indentation
    pub indent: String,
    /// Suffix of choice selector names
    pub choice_suffix: String,
    /// Wrap repeated elements in `#foreach` blocks
    pub mark_repeats: bool,
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self {
            placeholder_prefix: "$request.".to_string(),
            root_name: "FullyGeneratedVMTemplateFromXSD".to_string(),
            indent: "  ".to_string(),
            choice_suffix: "_choice".to_string(),
            mark_repeats: false,
        }
    }
}

impl TemplateSyntax {
    /// Set the placeholder prefix
    pub fn with_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }

    /// Set the synthetic root name
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Set the indent unit
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the choice selector suffix
    pub fn with_choice_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.choice_suffix = suffix.into();
        self
    }

    /// Enable or disable `#foreach` repeat blocks
    pub fn with_mark_repeats(mut self, mark: bool) -> Self {
        self.mark_repeats = mark;
        self
    }

    /// Placeholder token for `name`
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{}", self.placeholder_prefix, name)
    }
}

/// Shape of generated source expressions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceSyntax {
    /// Variable every expression starts from
    pub root: String,
    /// Segment holding stored values
    pub stored_values: String,
    /// Accessor of a field's value slot
    pub value_slot: String,
}

impl Default for SourceSyntax {
    fn default() -> Self {
        Self {
            root: "$currentValue".to_string(),
            stored_values: "storedValues".to_string(),
            value_slot: "['value']".to_string(),
        }
    }
}

impl SourceSyntax {
    /// Set the root variable
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the stored-values segment
    pub fn with_stored_values(mut self, segment: impl Into<String>) -> Self {
        self.stored_values = segment.into();
        self
    }

    /// Set the value slot accessor
    pub fn with_value_slot(mut self, slot: impl Into<String>) -> Self {
        self.value_slot = slot.into();
        self
    }

    /// `$currentValue.<key>['value']`
    pub fn value_of(&self, key: &str) -> String {
        format!("{}.{}{}", self.root, key, self.value_slot)
    }

    /// `$currentValue.storedValues.<key>`
    pub fn stored_value(&self, key: &str) -> String {
        format!("{}.{}.{}", self.root, self.stored_values, key)
    }

    /// `$currentValue.<path>`
    pub fn field(&self, path: &str) -> String {
        format!("{}.{}", self.root, path)
    }
}

/// Key conventions of sample payloads
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SampleConventions {
    /// Key of the id-to-source table
    pub id_table_key: String,
    /// Key of the stored-values dictionary
    pub stored_values_key: String,
    /// Suffix marking choice selector keys
    pub choice_suffix: String,
    /// Marker characters stripped from the start of id-table keys
    pub key_markers: String,
    /// Pattern of short form-field keys (`c12`)
    pub form_field_pattern: String,
}

impl Default for SampleConventions {
    fn default() -> Self {
        Self {
            id_table_key: "fieldToId".to_string(),
            stored_values_key: "storedValues".to_string(),
            choice_suffix: "Choice".to_string(),
            key_markers: "$".to_string(),
            form_field_pattern: r"^[A-Za-z]\d+$".to_string(),
        }
    }
}

impl SampleConventions {
    /// Set the id-table key
    pub fn with_id_table_key(mut self, key: impl Into<String>) -> Self {
        self.id_table_key = key.into();
        self
    }

    /// Set the stored-values key
    pub fn with_stored_values_key(mut self, key: impl Into<String>) -> Self {
        self.stored_values_key = key.into();
        self
    }

    /// Set the choice key suffix
    pub fn with_choice_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.choice_suffix = suffix.into();
        self
    }

    /// Set the form-field key pattern
    pub fn with_form_field_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.form_field_pattern = pattern.into();
        self
    }

    /// Compile the form-field key pattern
    pub fn form_field_regex(&self) -> Result<Regex> {
        Regex::new(&self.form_field_pattern).map_err(|e| {
            Error::Config(format!(
                "invalid form field pattern '{}': {}",
                self.form_field_pattern, e
            ))
        })
    }

    /// Strip leading marker characters from an id-table key
    pub fn strip_markers<'k>(&self, key: &'k str) -> &'k str {
        key.trim_start_matches(|c: char| self.key_markers.contains(c))
    }
}

/// Key conventions of the service descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DescriptorConventions {
    /// Key identifying a component
    pub id_key: String,
    /// Keys holding the binding path, tried in order
    pub binding_keys: Vec<String>,
    /// Key of the display name
    pub name_key: String,
    /// Key of the component type
    pub type_key: String,
}

impl Default for DescriptorConventions {
    fn default() -> Self {
        Self {
            id_key: "id".to_string(),
            binding_keys: vec!["binding".to_string(), "path".to_string()],
            name_key: "name".to_string(),
            type_key: "type".to_string(),
        }
    }
}

impl DescriptorConventions {
    /// Set the id key
    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Set the binding keys
    pub fn with_binding_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binding_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

/// Fuzzy matching thresholds, as similarity ratios in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingOptions {
    /// Minimum score of a fuzzy name match
    pub fuzzy_threshold: f64,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
        }
    }
}

impl MatchingOptions {
    /// Set the fuzzy threshold
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }
}

impl Config {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Set the template syntax
    pub fn with_template(mut self, template: TemplateSyntax) -> Self {
        self.template = template;
        self
    }

    /// Set the source expression syntax
    pub fn with_sources(mut self, sources: SourceSyntax) -> Self {
        self.sources = sources;
        self
    }

    /// Set the sample conventions
    pub fn with_samples(mut self, samples: SampleConventions) -> Self {
        self.samples = samples;
        self
    }

    /// Set the descriptor conventions
    pub fn with_descriptor(mut self, descriptor: DescriptorConventions) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Set the matching thresholds
    pub fn with_matching(mut self, matching: MatchingOptions) -> Self {
        self.matching = matching;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.template.placeholder_prefix.is_empty() {
            return Err(Error::Config("placeholder prefix must not be empty".to_string()));
        }
        if !is_valid_ncname(&self.template.root_name) {
            return Err(Error::Config(format!(
                "root name '{}' is not a valid XML name",
                self.template.root_name
            )));
        }
        let threshold = self.matching.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "fuzzy_threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        if self.descriptor.binding_keys.is_empty() {
            return Err(Error::Config("descriptor binding keys must not be empty".to_string()));
        }
        self.samples.form_field_regex()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.template.placeholder("firstName"), "$request.firstName");
        assert_eq!(config.template.root_name, "FullyGeneratedVMTemplateFromXSD");
        assert_eq!(config.sources.value_of("c1"), "$currentValue.c1['value']");
        assert_eq!(
            config.sources.stored_value("firstName"),
            "$currentValue.storedValues.firstName"
        );
        assert_eq!(config.matching.fuzzy_threshold, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{"template": {"mark_repeats": true}, "matching": {"fuzzy_threshold": 0.8}}"#,
        )
        .unwrap();
        assert!(config.template.mark_repeats);
        assert_eq!(config.template.placeholder_prefix, "$request.");
        assert_eq!(config.matching.fuzzy_threshold, 0.8);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = Config::from_json_str(r#"{"matching": {"fuzzy_threshold": 1.5}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err =
            Config::from_json_str(r#"{"samples": {"form_field_pattern": "(["}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_root_name_rejected() {
        let err = Config::from_json_str(r#"{"template": {"root_name": "1 root"}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(Config::from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"sources": {{"root": "$data"}}}}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.sources.field("a.b"), "$data.a.b");
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_template(TemplateSyntax::default().with_indent("\t").with_mark_repeats(true))
            .with_matching(MatchingOptions::default().with_fuzzy_threshold(0.5));
        assert_eq!(config.template.indent, "\t");
        assert!(config.template.mark_repeats);
        assert_eq!(config.matching.fuzzy_threshold, 0.5);
    }

    #[test]
    fn test_strip_markers() {
        let samples = SampleConventions::default();
        assert_eq!(samples.strip_markers("$c12"), "c12");
        assert_eq!(samples.strip_markers("c12"), "c12");
    }
}
