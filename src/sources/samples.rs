//! Sample payload analysis
//!
//! A sample is a JSON export of a filled-in service form. At every object
//! level, keys are classified by name:
//!
//! - the id table (`fieldToId`) maps field names to short storage keys
//! - the stored values (`storedValues`) hold already resolved values
//! - `...Choice` keys holding `{"value": ...}` are choice selectors
//! - form-field keys (`c12`) holding `{"value": ...}` and scalar keys are
//!   flat fields, recorded under their dotted path
//!
//! Other objects and arrays are walked, arrays extending the path with `[i]`.

use super::{key_string, parse_lenient, Provenance, SourceCandidate};
use crate::config::{SampleConventions, SourceSyntax};
use crate::diagnostics::{log_notice, Notice};
use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// One sample document as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDocument {
    /// Name used in notices
    pub source: String,
    /// Raw text
    pub text: String,
}

impl SampleDocument {
    /// Create a sample document
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// How a flat field holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// The path leads to a scalar
    Scalar,
    /// The path leads to a form field object with a `value` slot
    ValueObject,
}

/// A field found by walking a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatField {
    /// Dotted path from the document root
    pub path: String,
    /// Shape of the value at `path`
    pub kind: FieldKind,
}

impl FlatField {
    /// Source expression reading this field
    pub fn expression(&self, syntax: &SourceSyntax) -> String {
        match self.kind {
            FieldKind::ValueObject => syntax.value_of(&self.path),
            FieldKind::Scalar => match self.path.strip_suffix(".value") {
                Some(owner) => syntax.value_of(owner),
                None => syntax.field(&self.path),
            },
        }
    }
}

/// Keys found across all analyzed samples
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleAnalysis {
    /// Field name -> storage key
    pub id_table: IndexMap<String, String>,
    /// Stored value name -> value
    pub stored_values: IndexMap<String, Value>,
    /// Choice selector key -> declared value
    pub choice_selectors: IndexMap<String, Value>,
    /// Key -> where it was found
    pub flat_fields: IndexMap<String, FlatField>,
    /// Id-table, stored-value and choice keys present in every parsed sample
    pub common_keys: IndexSet<String>,
    /// Number of samples that parsed
    pub documents: usize,
    /// Samples that were skipped
    pub notices: Vec<Notice>,
}

impl SampleAnalysis {
    /// Whether no keys were found
    pub fn is_empty(&self) -> bool {
        self.id_table.is_empty()
            && self.stored_values.is_empty()
            && self.choice_selectors.is_empty()
            && self.flat_fields.is_empty()
    }

    /// Expression for `name` through the id table
    pub fn id_expression(&self, name: &str, syntax: &SourceSyntax) -> Option<String> {
        self.id_table.get(name).map(|key| syntax.value_of(key))
    }

    /// Expression for `name` as a stored value
    pub fn stored_expression(&self, name: &str, syntax: &SourceSyntax) -> Option<String> {
        self.stored_values
            .contains_key(name)
            .then(|| syntax.stored_value(name))
    }

    /// Expression for `name` as a flat field
    pub fn flat_expression(&self, name: &str, syntax: &SourceSyntax) -> Option<String> {
        self.flat_fields.get(name).map(|field| field.expression(syntax))
    }

    /// Expression for a choice selector field
    pub fn choice_expression(&self, field: &str, syntax: &SourceSyntax) -> Option<String> {
        self.choice_selectors
            .contains_key(field)
            .then(|| syntax.value_of(field))
    }

    /// Resolve a key found by name matching. Stored values win over flat
    /// fields, which win over the id table.
    pub fn resolve_key(&self, key: &str, syntax: &SourceSyntax) -> Option<SourceCandidate> {
        let (provenance, expression) = if let Some(expr) = self.stored_expression(key, syntax) {
            (Provenance::StoredValue, expr)
        } else if let Some(expr) = self.flat_expression(key, syntax) {
            (Provenance::FlatField, expr)
        } else {
            (Provenance::IdTable, self.id_expression(key, syntax)?)
        };
        Some(SourceCandidate {
            key: key.to_string(),
            provenance,
            expression,
        })
    }

    /// Every key offered to name matching, once each: stored values, then
    /// id-table keys, then flat fields
    pub fn candidates(&self, syntax: &SourceSyntax) -> Vec<SourceCandidate> {
        let keys: IndexSet<&str> = self
            .stored_values
            .keys()
            .chain(self.id_table.keys())
            .chain(self.flat_fields.keys())
            .map(String::as_str)
            .collect();
        keys.into_iter()
            .filter_map(|key| self.resolve_key(key, syntax))
            .collect()
    }

    /// Choice selectors as candidates
    pub fn choice_candidates(&self, syntax: &SourceSyntax) -> Vec<SourceCandidate> {
        self.choice_selectors
            .keys()
            .filter_map(|field| {
                Some(SourceCandidate {
                    key: field.clone(),
                    provenance: Provenance::ChoiceSelector,
                    expression: self.choice_expression(field, syntax)?,
                })
            })
            .collect()
    }

    fn merge(&mut self, other: Keys) {
        self.id_table.extend(other.id_table);
        self.stored_values.extend(other.stored_values);
        self.choice_selectors.extend(other.choice_selectors);
        self.flat_fields.extend(other.flat_fields);
    }
}

/// Keys of a single document
#[derive(Debug, Default)]
struct Keys {
    id_table: IndexMap<String, String>,
    stored_values: IndexMap<String, Value>,
    choice_selectors: IndexMap<String, Value>,
    flat_fields: IndexMap<String, FlatField>,
}

impl Keys {
    fn named(&self) -> IndexSet<String> {
        self.id_table
            .keys()
            .chain(self.stored_values.keys())
            .chain(self.choice_selectors.keys())
            .cloned()
            .collect()
    }
}

/// Classifies the keys of sample payloads
#[derive(Debug, Clone)]
pub struct SampleAnalyzer<'c> {
    conventions: &'c SampleConventions,
    form_field: Regex,
}

impl<'c> SampleAnalyzer<'c> {
    /// Create an analyzer. Fails if the form-field pattern is not a valid regex.
    pub fn new(conventions: &'c SampleConventions) -> Result<Self> {
        Ok(Self {
            conventions,
            form_field: conventions.form_field_regex()?,
        })
    }

    /// Analyze every document. Unparsable documents are skipped with a
    /// `SampleParse` notice.
    pub fn analyze(&self, documents: &[SampleDocument]) -> SampleAnalysis {
        let mut values = Vec::with_capacity(documents.len());
        let mut notices = Vec::new();

        for doc in documents {
            match parse_lenient(&doc.text) {
                Ok(value) => values.push(value),
                Err(reason) => {
                    let notice = Notice::SampleParse {
                        source: doc.source.clone(),
                        reason,
                    };
                    log_notice(&notice);
                    notices.push(notice);
                }
            }
        }

        let mut analysis = self.analyze_values(&values);
        analysis.notices = notices;
        analysis
    }

    /// Analyze already parsed documents
    pub fn analyze_values(&self, values: &[Value]) -> SampleAnalysis {
        let mut analysis = SampleAnalysis::default();
        let mut common: Option<IndexSet<String>> = None;

        for (i, value) in values.iter().enumerate() {
            let mut keys = Keys::default();
            self.walk(value, "", &mut keys);
            debug!(
                sample = i + 1,
                ids = keys.id_table.len(),
                stored = keys.stored_values.len(),
                choices = keys.choice_selectors.len(),
                fields = keys.flat_fields.len(),
                "analyzed sample"
            );

            let named = keys.named();
            common = Some(match common {
                None => named,
                Some(acc) => acc.into_iter().filter(|k| named.contains(k)).collect(),
            });
            analysis.merge(keys);
        }

        analysis.common_keys = common.unwrap_or_default();
        analysis.documents = values.len();
        info!(
            documents = analysis.documents,
            ids = analysis.id_table.len(),
            stored = analysis.stored_values.len(),
            choices = analysis.choice_selectors.len(),
            fields = analysis.flat_fields.len(),
            common = analysis.common_keys.len(),
            "analyzed samples"
        );
        analysis
    }

    fn walk(&self, value: &Value, path: &str, keys: &mut Keys) {
        match value {
            Value::Object(map) => self.walk_object(map, path, keys),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk(item, &format!("{}[{}]", path, i), keys);
                }
            }
            _ => {}
        }
    }

    fn walk_object(&self, map: &Map<String, Value>, path: &str, keys: &mut Keys) {
        let conv = self.conventions;
        for (key, value) in map {
            let key_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };

            match value {
                Value::Object(table) if *key == conv.id_table_key => {
                    for (field, storage) in table {
                        keys.id_table
                            .insert(conv.strip_markers(field).to_string(), key_string(storage));
                    }
                }
                Value::Object(stored) if *key == conv.stored_values_key => {
                    keys.stored_values
                        .extend(stored.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Value::Object(field) if field.contains_key("value") => {
                    if key.ends_with(&conv.choice_suffix) {
                        let declared = field.get("value").cloned().unwrap_or_default();
                        keys.choice_selectors.insert(key.clone(), declared);
                    } else if self.form_field.is_match(key) {
                        keys.flat_fields.insert(
                            key.clone(),
                            FlatField {
                                path: key_path,
                                kind: FieldKind::ValueObject,
                            },
                        );
                    } else {
                        self.walk_object(field, &key_path, keys);
                    }
                }
                Value::Object(nested) => self.walk_object(nested, &key_path, keys),
                Value::Array(_) => self.walk(value, &key_path, keys),
                _ => {
                    keys.flat_fields.insert(
                        key.clone(),
                        FlatField {
                            path: key_path,
                            kind: FieldKind::Scalar,
                        },
                    );
                }
            }
        }
    }
}
