//! Placeholder mapping
//!
//! Strategies run in a fixed order and never overwrite a placeholder that an
//! earlier strategy already mapped:
//!
//! 1. exact id-table key
//! 2. exact stored-value key
//! 3. fuzzy name match over stored values, id-table keys and flat fields
//! 4. descriptor binding, by the binding path's last segment
//! 5. choice selectors from the samples

use super::similarity::{best_match, NormalizedLevenshtein, StringSimilarity};
use crate::config::Config;
use crate::schema::PathIndex;
use crate::sources::{DescriptorAnalysis, SampleAnalysis, SourceCandidate};
use indexmap::{IndexMap, IndexSet};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{info, trace};

/// Which strategy produced a mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Element name is an id-table key
    ExactId,
    /// Element name is a stored-value key
    ExactStoredValue,
    /// Element name is close to a sample key
    FuzzyName,
    /// A descriptor component is bound to the element
    DescriptorBinding,
    /// Sample choice selector
    ChoiceSelector,
}

impl Strategy {
    /// Every strategy, in precedence order
    pub const ALL: [Strategy; 5] = [
        Strategy::ExactId,
        Strategy::ExactStoredValue,
        Strategy::FuzzyName,
        Strategy::DescriptorBinding,
        Strategy::ChoiceSelector,
    ];

    /// Stable label
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::ExactId => "exact-id",
            Strategy::ExactStoredValue => "exact-stored-value",
            Strategy::FuzzyName => "fuzzy-name",
            Strategy::DescriptorBinding => "descriptor-binding",
            Strategy::ChoiceSelector => "choice-selector",
        }
    }
}

/// One mapped placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingEntry {
    /// Placeholder name without the template prefix
    pub placeholder: String,
    /// Source expression substituted for the placeholder
    pub expression: String,
    /// Strategy that produced the entry
    pub strategy: Strategy,
    /// Similarity score of fuzzy matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// The sample key, binding or component the expression came from
    pub source_key: String,
}

/// Placeholder name -> entry, in the order entries were made
///
/// Serializes as a JSON object of placeholder token -> source expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    prefix: String,
    entries: IndexMap<String, MappingEntry>,
}

impl Mapping {
    /// Empty mapping for placeholders written with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add `entry` unless its placeholder is already mapped
    pub fn insert(&mut self, entry: MappingEntry) -> bool {
        if self.entries.contains_key(&entry.placeholder) {
            return false;
        }
        trace!(
            placeholder = %entry.placeholder,
            expression = %entry.expression,
            strategy = entry.strategy.label(),
            source = %entry.source_key,
            "mapped"
        );
        self.entries.insert(entry.placeholder.clone(), entry);
        true
    }

    /// Entry for a placeholder name
    pub fn get(&self, placeholder: &str) -> Option<&MappingEntry> {
        self.entries.get(placeholder)
    }

    /// Whether a placeholder name is mapped
    pub fn contains(&self, placeholder: &str) -> bool {
        self.entries.contains_key(placeholder)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries made by `strategy`
    pub fn count(&self, strategy: Strategy) -> usize {
        self.entries().filter(|e| e.strategy == strategy).count()
    }

    /// Placeholder token -> source expression, as the finalizer takes it
    pub fn tokens(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .map(|(name, entry)| (format!("{}{}", self.prefix, name), entry.expression.clone()))
            .collect()
    }

    /// Per-strategy summary
    pub fn report(&self) -> MappingReport {
        MappingReport {
            total: self.len(),
            counts: Strategy::ALL
                .iter()
                .map(|&strategy| (strategy, self.count(strategy)))
                .collect(),
            entries: self.entries().cloned().collect(),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(&format!("{}{}", self.prefix, name), &entry.expression)?;
        }
        map.end()
    }
}

/// What the mapping engine did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingReport {
    /// Number of mapped placeholders
    pub total: usize,
    /// Entries per strategy, in precedence order
    pub counts: IndexMap<Strategy, usize>,
    /// Every entry with its provenance
    pub entries: Vec<MappingEntry>,
}

/// Builds a [`Mapping`] from the schema vocabulary and the analyzed sources
pub struct MappingEngine<'c> {
    config: &'c Config,
    similarity: Box<dyn StringSimilarity + 'c>,
}

impl<'c> MappingEngine<'c> {
    /// Engine scoring names with [`NormalizedLevenshtein`]
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            similarity: Box::new(NormalizedLevenshtein),
        }
    }

    /// Replace the name similarity function
    pub fn with_similarity(mut self, similarity: impl StringSimilarity + 'c) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    /// Map every placeholder name of `index` that some source can fill
    pub fn build(
        &self,
        index: &PathIndex,
        samples: &SampleAnalysis,
        descriptor: &DescriptorAnalysis,
    ) -> Mapping {
        let names: IndexSet<&str> = index
            .element_names()
            .into_iter()
            .chain(index.attribute_names())
            .collect();
        let mut mapping = Mapping::new(self.config.template.placeholder_prefix.clone());

        self.exact_ids(&names, samples, &mut mapping);
        self.exact_stored(&names, samples, &mut mapping);
        self.fuzzy_names(&names, samples, &mut mapping);
        self.descriptor_bindings(index, samples, descriptor, &mut mapping);
        self.choice_selectors(samples, &mut mapping);

        info!(
            placeholders = names.len(),
            mapped = mapping.len(),
            exact_id = mapping.count(Strategy::ExactId),
            exact_stored = mapping.count(Strategy::ExactStoredValue),
            fuzzy = mapping.count(Strategy::FuzzyName),
            descriptor = mapping.count(Strategy::DescriptorBinding),
            choice = mapping.count(Strategy::ChoiceSelector),
            "built mapping"
        );
        mapping
    }

    fn exact_ids(&self, names: &IndexSet<&str>, samples: &SampleAnalysis, mapping: &mut Mapping) {
        let syntax = &self.config.sources;
        for &name in names {
            if let Some(expression) = samples.id_expression(name, syntax) {
                mapping.insert(entry(name, expression, Strategy::ExactId, None, name));
            }
        }
    }

    fn exact_stored(&self, names: &IndexSet<&str>, samples: &SampleAnalysis, mapping: &mut Mapping) {
        let syntax = &self.config.sources;
        for &name in names {
            if mapping.contains(name) {
                continue;
            }
            if let Some(expression) = samples.stored_expression(name, syntax) {
                mapping.insert(entry(name, expression, Strategy::ExactStoredValue, None, name));
            }
        }
    }

    fn fuzzy_names(&self, names: &IndexSet<&str>, samples: &SampleAnalysis, mapping: &mut Mapping) {
        let pool = samples.candidates(&self.config.sources);
        if pool.is_empty() {
            return;
        }
        let by_key: IndexMap<&str, &SourceCandidate> =
            pool.iter().map(|c| (c.key.as_str(), c)).collect();

        for &name in names {
            if mapping.contains(name) {
                continue;
            }
            let found = best_match(
                self.similarity.as_ref(),
                name,
                by_key.keys().copied(),
                self.config.matching.fuzzy_threshold,
            );
            if let Some((key, score)) = found {
                if let Some(candidate) = by_key.get(key) {
                    mapping.insert(entry(
                        name,
                        candidate.expression.clone(),
                        Strategy::FuzzyName,
                        Some(score),
                        key,
                    ));
                }
            }
        }
    }

    fn descriptor_bindings(
        &self,
        index: &PathIndex,
        samples: &SampleAnalysis,
        descriptor: &DescriptorAnalysis,
        mapping: &mut Mapping,
    ) {
        let syntax = &self.config.sources;
        for (component, binding) in &descriptor.component_bindings {
            let Some(candidate) = binding.rsplit('.').next().filter(|s| !s.is_empty()) else {
                continue;
            };
            if !index.contains_element(candidate) || mapping.contains(candidate) {
                continue;
            }

            let expression = samples
                .id_expression(binding, syntax)
                .or_else(|| samples.stored_expression(binding, syntax))
                .or_else(|| samples.id_expression(component, syntax))
                .or_else(|| samples.stored_expression(component, syntax));
            if let Some(expression) = expression {
                mapping.insert(entry(
                    candidate,
                    expression,
                    Strategy::DescriptorBinding,
                    None,
                    component,
                ));
            } else {
                trace!(component = %component, binding = %binding, "binding has no sample source");
            }
        }
    }

    fn choice_selectors(&self, samples: &SampleAnalysis, mapping: &mut Mapping) {
        let suffix = &self.config.template.choice_suffix;
        for candidate in samples.choice_candidates(&self.config.sources) {
            let placeholder = format!("{}{}", candidate.key, suffix);
            mapping.insert(entry(
                &placeholder,
                candidate.expression,
                Strategy::ChoiceSelector,
                None,
                &candidate.key,
            ));
        }
    }
}

fn entry(
    placeholder: &str,
    expression: String,
    strategy: Strategy,
    score: Option<f64>,
    source_key: &str,
) -> MappingEntry {
    MappingEntry {
        placeholder: placeholder.to_string(),
        expression,
        strategy,
        score,
        source_key: source_key.to_string(),
    }
}
