//! Service descriptor analysis
//!
//! Any object carrying an id is a component. Its display name, type and
//! binding path are recorded when present, and the walk continues into it.

use super::{key_string, parse_lenient};
use crate::config::DescriptorConventions;
use crate::diagnostics::{log_notice, Notice};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, trace};

/// Components found in a descriptor, keyed by component id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptorAnalysis {
    /// Component id -> binding path
    pub component_bindings: IndexMap<String, String>,
    /// Component id -> display name
    pub component_names: IndexMap<String, String>,
    /// Component id -> component type
    pub component_types: IndexMap<String, String>,
    /// Why the descriptor was ignored, if it was
    pub notices: Vec<Notice>,
}

impl DescriptorAnalysis {
    /// Whether no component has a binding
    pub fn is_empty(&self) -> bool {
        self.component_bindings.is_empty()
    }

    /// Analysis of an unusable descriptor
    pub fn ignored(source: impl Into<String>, reason: impl Into<String>) -> Self {
        let notice = Notice::DescriptorParse {
            source: source.into(),
            reason: reason.into(),
        };
        log_notice(&notice);
        Self {
            notices: vec![notice],
            ..Self::default()
        }
    }

}

/// Finds components in a service descriptor
#[derive(Debug, Clone, Copy)]
pub struct DescriptorAnalyzer<'c> {
    conventions: &'c DescriptorConventions,
}

impl<'c> DescriptorAnalyzer<'c> {
    /// Create an analyzer
    pub fn new(conventions: &'c DescriptorConventions) -> Self {
        Self { conventions }
    }

    /// Analyze descriptor text. Never fails: an unparsable descriptor gives
    /// an empty analysis with a `DescriptorParse` notice.
    pub fn analyze(&self, source: &str, text: &str) -> DescriptorAnalysis {
        match parse_lenient(text) {
            Ok(value) => self.analyze_value(&value),
            Err(reason) => DescriptorAnalysis::ignored(source, reason),
        }
    }

    /// Analyze a parsed descriptor
    pub fn analyze_value(&self, value: &Value) -> DescriptorAnalysis {
        let mut analysis = DescriptorAnalysis::default();
        self.walk(value, &mut analysis);
        info!(
            components = analysis.component_names.len(),
            bindings = analysis.component_bindings.len(),
            "analyzed descriptor"
        );
        analysis
    }

    fn walk(&self, value: &Value, analysis: &mut DescriptorAnalysis) {
        match value {
            Value::Object(map) => {
                if let Some(id) = map.get(&self.conventions.id_key).and_then(component_id) {
                    let name = map.get(&self.conventions.name_key).map(key_string);
                    let kind = map.get(&self.conventions.type_key).map(key_string);
                    if let Some(name) = name {
                        analysis.component_names.insert(id.clone(), name);
                    }
                    if let Some(kind) = kind {
                        analysis.component_types.insert(id.clone(), kind);
                    }
                    if let Some(binding) = self.binding_of(map) {
                        trace!(component = %id, binding = %binding, "component binding");
                        analysis.component_bindings.insert(id, binding);
                    }
                }
                for child in map.values() {
                    self.walk(child, analysis);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, analysis);
                }
            }
            _ => {}
        }
    }

    /// The first non-empty string under one of the binding keys
    fn binding_of(&self, map: &serde_json::Map<String, Value>) -> Option<String> {
        self.conventions.binding_keys.iter().find_map(|key| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

/// A usable component id: a non-empty string or a number
fn component_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
