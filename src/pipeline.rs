//! End-to-end generation
//!
//! load schema -> compile template -> index paths -> analyze samples and
//! descriptor -> build mapping -> finalize template. Only schema loading and
//! invalid configuration are fatal; everything else degrades to notices.

use crate::config::Config;
use crate::diagnostics::{log_notice, Notice};
use crate::error::Result;
use crate::loaders::{Loader, ResourceKind};
use crate::locations::Location;
use crate::mapping::{Mapping, MappingEngine, MappingReport};
use crate::schema::{PathIndex, PathIndexer, SchemaModel};
use crate::sources::{DescriptorAnalysis, DescriptorAnalyzer, SampleAnalysis, SampleAnalyzer, SampleDocument};
use crate::template::{CompiledTemplate, TemplateCompiler, TemplateFinalizer};
use tracing::info;

/// The inputs of one generation run
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    /// XSD document
    pub schema: Location,
    /// Sample payloads, zero or more
    pub samples: Vec<Location>,
    /// Service descriptor
    pub descriptor: Option<Location>,
}

impl Inputs {
    /// Inputs with a schema and nothing else
    pub fn new(schema: Location) -> Self {
        Self {
            schema,
            samples: Vec::new(),
            descriptor: None,
        }
    }

    /// Add a sample payload
    pub fn with_sample(mut self, sample: Location) -> Self {
        self.samples.push(sample);
        self
    }

    /// Set the service descriptor
    pub fn with_descriptor(mut self, descriptor: Location) -> Self {
        self.descriptor = Some(descriptor);
        self
    }
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct Generated {
    /// Finalized template
    pub text: String,
    /// Template before substitution
    pub template: String,
    /// Path inventory the mapping was built from
    pub index: PathIndex,
    /// Placeholder mapping
    pub mapping: Mapping,
    /// Per-strategy mapping summary
    pub report: MappingReport,
    /// Number of substitutions made
    pub replacements: usize,
    /// Recovered conditions, in pipeline order
    pub notices: Vec<Notice>,
}

/// Runs the pipeline with one configuration
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: Config,
    loader: Loader,
}

impl Generator {
    /// Create a generator
    pub fn new(config: Config) -> Self {
        let loader = Loader::new().with_limits(config.limits.clone());
        Self { config, loader }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load and parse the schema
    pub fn load_schema(&self, location: &Location) -> Result<SchemaModel> {
        SchemaModel::load(location, &self.loader)
    }

    /// Compile `schema` into a raw template
    pub fn compile(&self, schema: &SchemaModel) -> CompiledTemplate {
        TemplateCompiler::new(schema, &self.config.template).compile_document()
    }

    /// Inventory the element paths of `schema`
    pub fn index(&self, schema: &SchemaModel) -> PathIndex {
        PathIndexer::new(schema)
            .with_choice_suffix(self.config.template.choice_suffix.clone())
            .index()
    }

    /// Read and analyze sample payloads. Unreadable samples are skipped.
    pub fn analyze_samples(&self, samples: &[Location]) -> Result<SampleAnalysis> {
        let analyzer = SampleAnalyzer::new(&self.config.samples)?;
        let mut documents = Vec::with_capacity(samples.len());
        let mut unreadable = Vec::new();

        for (i, location) in samples.iter().enumerate() {
            let source = describe(location, "sample", i);
            match self.loader.load(location, ResourceKind::Json) {
                Ok(text) => documents.push(SampleDocument::new(source, text)),
                Err(e) => {
                    let notice = Notice::SampleParse {
                        source,
                        reason: e.to_string(),
                    };
                    log_notice(&notice);
                    unreadable.push(notice);
                }
            }
        }

        let mut analysis = analyzer.analyze(&documents);
        unreadable.append(&mut analysis.notices);
        analysis.notices = unreadable;
        Ok(analysis)
    }

    /// Read and analyze the service descriptor. Never fails.
    pub fn analyze_descriptor(&self, descriptor: Option<&Location>) -> DescriptorAnalysis {
        let Some(location) = descriptor else {
            return DescriptorAnalysis::default();
        };
        let source = describe(location, "descriptor", 0);
        let analyzer = DescriptorAnalyzer::new(&self.config.descriptor);
        match self.loader.load(location, ResourceKind::Json) {
            Ok(text) => analyzer.analyze(&source, &text),
            Err(e) => DescriptorAnalysis::ignored(source, e.to_string()),
        }
    }

    /// Build the mapping for `schema` from the inputs' samples and descriptor
    pub fn map(&self, schema: &SchemaModel, inputs: &Inputs) -> Result<(PathIndex, Mapping, Vec<Notice>)> {
        let index = self.index(schema);
        let samples = self.analyze_samples(&inputs.samples)?;
        let descriptor = self.analyze_descriptor(inputs.descriptor.as_ref());
        let mapping = MappingEngine::new(&self.config).build(&index, &samples, &descriptor);

        let mut notices = samples.notices;
        notices.extend(descriptor.notices);
        Ok((index, mapping, notices))
    }

    /// Run the whole pipeline
    pub fn generate(&self, inputs: &Inputs) -> Result<Generated> {
        self.config.validate()?;
        let schema = self.load_schema(&inputs.schema)?;
        let compiled = self.compile(&schema);
        let (index, mapping, mut notices) = self.map(&schema, inputs)?;
        notices.extend(compiled.notices);

        let finalized = TemplateFinalizer::new(&self.config.template)?.finalize(&compiled.text, &mapping.tokens());
        notices.extend(finalized.notices);

        info!(
            schema = %inputs.schema,
            samples = inputs.samples.len(),
            mapped = mapping.len(),
            replacements = finalized.replacements,
            notices = notices.len(),
            "generated template"
        );
        Ok(Generated {
            text: finalized.text,
            template: compiled.text,
            report: mapping.report(),
            index,
            mapping,
            replacements: finalized.replacements,
            notices,
        })
    }
}

fn describe(location: &Location, what: &str, i: usize) -> String {
    if location.is_file() {
        location.describe()
    } else {
        format!("{} {}", what, i + 1)
    }
}
