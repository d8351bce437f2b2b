//! XSD schema model
//!
//! Loads a schema document and indexes its global elements and named types:
//!
//! - [`types`] - element, attribute and type components
//! - [`particles`] - occurrence bounds and model groups
//! - [`resolver`] - type and element reference resolution
//! - [`paths`] - flat inventory of every reachable element path

mod parsing;
pub mod particles;
pub mod paths;
pub mod resolver;
pub mod types;

pub use particles::{ModelGroup, ModelType, Occurs, Particle};
pub use paths::{index, ChoiceGroup, ContentOrigin, PathIndex, PathIndexer, PathInfo};
pub use resolver::{TypeResolution, TypeResolver};
pub use types::{
    AttributeDecl, ComplexContent, ComplexTypeDef, Derivation, ElementContent, ElementDecl,
    SchemaTypeDef, SimpleTypeDef,
};

use crate::documents::Document;
use crate::error::{Error, Result, SchemaLoadError};
use crate::limits::Limits;
use crate::loaders::{Loader, ResourceKind};
use crate::locations::Location;
use crate::namespaces::NamespaceContext;
use indexmap::IndexMap;
use tracing::info;

/// How much of a broken schema to quote in a load error
const SOURCE_SNIPPET_CHARS: usize = 200;

/// A loaded schema: its namespace context and global components
#[derive(Debug, Clone)]
pub struct SchemaModel {
    /// Where the schema came from, for messages
    pub source: String,
    /// `targetNamespace` of the schema, if declared
    pub target_namespace: Option<String>,
    /// Prefixes declared on the schema root, in declaration order
    pub namespaces: NamespaceContext,
    /// Named global elements in declaration order
    pub elements: IndexMap<String, ElementDecl>,
    /// Named global simple and complex types
    pub types: IndexMap<String, SchemaTypeDef>,
}

impl SchemaModel {
    /// Load a schema from a location.
    ///
    /// A missing file or malformed XML is a fatal [`SchemaLoadError`].
    pub fn load(location: &Location, loader: &Loader) -> Result<Self> {
        let source = location.describe();
        let text = loader
            .load(location, ResourceKind::Schema)
            .map_err(|e| match e {
                Error::Resource(msg) => Error::from(SchemaLoadError::new(msg).with_location(&source)),
                other => other,
            })?;
        Self::parse_with_limits(&text, &source, loader.limits())
    }

    /// Parse a schema held in memory
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, "<string>", &Limits::default())
    }

    fn parse_with_limits(xml: &str, source: &str, limits: &Limits) -> Result<Self> {
        let doc = Document::parse(xml.as_bytes(), limits).map_err(|e| match e {
            Error::Xml(msg) => {
                let snippet: String = xml.chars().take(SOURCE_SNIPPET_CHARS).collect();
                Error::from(
                    SchemaLoadError::new(format!("Schema is not well-formed XML: {}", msg))
                        .with_location(source)
                        .with_source(snippet),
                )
            }
            other => other,
        })?;

        let model = Self::from_document(&doc, source)?;
        info!(
            source = %model.source,
            elements = model.elements.len(),
            types = model.types.len(),
            target_namespace = model.target_namespace.as_deref().unwrap_or(""),
            "loaded schema"
        );
        Ok(model)
    }

    /// Global element by name
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// Named type by local name
    pub fn get_type(&self, name: &str) -> Option<&SchemaTypeDef> {
        self.types.get(name)
    }

    /// Resolver over this schema
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PERSON: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns:tns="urn:person" targetNamespace="urn:person">
      <xs:element name="Person" type="tns:PersonType"/>
      <xs:complexType name="PersonType">
        <xs:sequence>
          <xs:element name="firstName" type="xs:string"/>
        </xs:sequence>
      </xs:complexType>
    </xs:schema>"#;

    #[test]
    fn test_from_str() {
        let model = SchemaModel::from_string(PERSON).unwrap();
        assert!(model.element("Person").is_some());
        assert!(model.get_type("PersonType").is_some());
        assert_eq!(model.namespaces.get_namespace("tns"), Some("urn:person"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", PERSON).unwrap();

        let location = Location::path(file.path());
        let model = SchemaModel::load(&location, &Loader::new()).unwrap();
        assert_eq!(model.source, file.path().display().to_string());
    }

    #[test]
    fn test_missing_file_is_schema_load_error() {
        let location = Location::path("/no/such/schema.xsd");
        let err = SchemaModel::load(&location, &Loader::new()).unwrap_err();
        assert!(matches!(err, Error::SchemaLoad(_)));
        assert!(err.to_string().contains("/no/such/schema.xsd"));
    }

    #[test]
    fn test_malformed_xml_is_schema_load_error() {
        let err = SchemaModel::from_string("<xs:schema><xs:element").unwrap_err();
        match err {
            Error::SchemaLoad(e) => {
                assert!(e.message.contains("not well-formed"));
                assert_eq!(e.location.as_deref(), Some("<string>"));
                assert!(e.source.is_some());
            }
            other => panic!("expected schema load error, got {:?}", other),
        }
    }
}
