//! XSD Document Parsing
//!
//! Turns a parsed [`Document`] into the component tables of a [`SchemaModel`].
//! Parsing is best effort: constructs with no bearing on template output
//! (annotations, facets, identity constraints, wildcards) are skipped.

use super::particles::{parse_occurs, ModelGroup, ModelType, Particle};
use super::types::{
    AttributeDecl, ComplexContent, ComplexTypeDef, Derivation, ElementContent, ElementDecl,
    SchemaTypeDef, SimpleTypeDef,
};
use super::SchemaModel;

use crate::documents::{Document, Element};
use crate::error::{SchemaLoadError, Result};
use crate::names::local_part;
use crate::XSD_NAMESPACE;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const BASE: &str = "base";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

impl SchemaModel {
    /// Build the model from a parsed XML document
    pub(crate) fn from_document(doc: &Document, source: &str) -> Result<Self> {
        let root = doc.root().ok_or_else(|| {
            SchemaLoadError::new("Document has no root element").with_location(source)
        })?;

        if root.local_name() != xsd_elements::SCHEMA {
            return Err(SchemaLoadError::new(format!(
                "Expected xs:schema root element, got {}",
                root.local_name()
            ))
            .with_location(source)
            .into());
        }

        let target_namespace = root
            .get_attribute(xsd_attrs::TARGET_NAMESPACE)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);

        let mut elements = IndexMap::new();
        let mut types = IndexMap::new();

        for child in &root.children {
            match child.local_name() {
                xsd_elements::ELEMENT => {
                    if child.get_attribute(xsd_attrs::NAME).is_some() {
                        let decl = parse_element(child);
                        trace!(element = %decl.name, "global element");
                        elements.insert(decl.name.clone(), decl);
                    }
                }
                xsd_elements::COMPLEX_TYPE => {
                    if let Some(name) = child.get_attribute(xsd_attrs::NAME) {
                        types.insert(
                            name.to_string(),
                            SchemaTypeDef::Complex(parse_complex_type(child)),
                        );
                    }
                }
                xsd_elements::SIMPLE_TYPE => {
                    if let Some(name) = child.get_attribute(xsd_attrs::NAME) {
                        types.insert(
                            name.to_string(),
                            SchemaTypeDef::Simple(parse_simple_type(child)),
                        );
                    }
                }
                other => debug!(component = other, "skipping top-level schema component"),
            }
        }

        Ok(SchemaModel {
            source: source.to_string(),
            target_namespace,
            namespaces: root.namespaces.clone(),
            elements,
            types,
        })
    }

    /// Prefixes to declare on generated documents: all except those bound to
    /// the XSD namespace itself
    pub(crate) fn output_prefixes(&self) -> impl Iterator<Item = (&String, &String)> {
        self.namespaces
            .iter()
            .filter(|(_, uri)| uri.as_str() != XSD_NAMESPACE)
    }
}

/// Parse an `xs:element` (global or local)
fn parse_element(elem: &Element) -> ElementDecl {
    let occurs = parse_occurs(
        elem.get_attribute(xsd_attrs::MIN_OCCURS),
        elem.get_attribute(xsd_attrs::MAX_OCCURS),
    );

    let (name, content) = if let Some(reference) = elem.get_attribute(xsd_attrs::REF) {
        (
            local_part(reference).to_string(),
            ElementContent::Reference(reference.to_string()),
        )
    } else {
        let name = elem.get_attribute(xsd_attrs::NAME).unwrap_or_default().to_string();
        let content = if let Some(type_ref) = elem.get_attribute(xsd_attrs::TYPE) {
            ElementContent::Typed(type_ref.to_string())
        } else if let Some(ct) = elem.find_child(xsd_elements::COMPLEX_TYPE) {
            ElementContent::Inline(Box::new(SchemaTypeDef::Complex(parse_complex_type(ct))))
        } else if let Some(st) = elem.find_child(xsd_elements::SIMPLE_TYPE) {
            ElementContent::Inline(Box::new(SchemaTypeDef::Simple(parse_simple_type(st))))
        } else {
            ElementContent::Untyped
        };
        (name, content)
    };

    ElementDecl {
        name,
        occurs,
        content,
        attributes: parse_attributes(elem),
    }
}

/// Parse the `xs:attribute` children of a component
fn parse_attributes(elem: &Element) -> Vec<AttributeDecl> {
    elem.find_children(xsd_elements::ATTRIBUTE)
        .filter_map(|attr| {
            let name = attr
                .get_attribute(xsd_attrs::NAME)
                .or_else(|| attr.get_attribute(xsd_attrs::REF).map(local_part))?;
            Some(AttributeDecl {
                name: name.to_string(),
                type_ref: attr.get_attribute(xsd_attrs::TYPE).map(str::to_string),
            })
        })
        .collect()
}

/// Find the content model element (sequence, choice, all) of a component
fn find_content_model_element(elem: &Element) -> Option<&Element> {
    elem.children
        .iter()
        .find(|child| ModelType::from_tag(child.local_name()).is_some())
}

/// Parse a `sequence` / `choice` / `all` with its nested particles
fn parse_model_group(elem: &Element) -> Option<ModelGroup> {
    let model = ModelType::from_tag(elem.local_name())?;
    let mut group = ModelGroup::new(model);
    group.occurs = parse_occurs(
        elem.get_attribute(xsd_attrs::MIN_OCCURS),
        elem.get_attribute(xsd_attrs::MAX_OCCURS),
    );

    for child in &elem.children {
        match child.local_name() {
            xsd_elements::ELEMENT => group.particles.push(Particle::Element(parse_element(child))),
            xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
                if let Some(nested) = parse_model_group(child) {
                    group.particles.push(Particle::Group(nested));
                }
            }
            other => trace!(particle = other, "skipping particle"),
        }
    }

    Some(group)
}

/// Parse an `xs:complexType`
fn parse_complex_type(elem: &Element) -> ComplexTypeDef {
    let name = elem.get_attribute(xsd_attrs::NAME).map(str::to_string);

    if let Some(simple) = elem.find_child(xsd_elements::SIMPLE_CONTENT) {
        if let Some((derivation, derivation_elem)) = find_derivation(simple) {
            return ComplexTypeDef {
                name,
                content: ComplexContent::Simple {
                    derivation,
                    base: derivation_elem
                        .get_attribute(xsd_attrs::BASE)
                        .unwrap_or_default()
                        .to_string(),
                    attributes: parse_attributes(derivation_elem),
                },
            };
        }
    }

    if let Some(complex) = elem.find_child(xsd_elements::COMPLEX_CONTENT) {
        if let Some((derivation, derivation_elem)) = find_derivation(complex) {
            return ComplexTypeDef {
                name,
                content: ComplexContent::Complex {
                    derivation,
                    base: derivation_elem
                        .get_attribute(xsd_attrs::BASE)
                        .unwrap_or_default()
                        .to_string(),
                    attributes: parse_attributes(derivation_elem),
                    particle: find_content_model_element(derivation_elem)
                        .and_then(parse_model_group),
                },
            };
        }
    }

    ComplexTypeDef {
        name,
        content: ComplexContent::Ordinary {
            attributes: parse_attributes(elem),
            particle: find_content_model_element(elem).and_then(parse_model_group),
        },
    }
}

/// First `xs:extension` / `xs:restriction` child
fn find_derivation(elem: &Element) -> Option<(Derivation, &Element)> {
    elem.children
        .iter()
        .find_map(|child| Derivation::from_tag(child.local_name()).map(|d| (d, child)))
}

/// Parse an `xs:simpleType`
fn parse_simple_type(elem: &Element) -> SimpleTypeDef {
    let base = elem.children.iter().find_map(|child| match child.local_name() {
        xsd_elements::RESTRICTION => child.get_attribute(xsd_attrs::BASE).map(str::to_string),
        xsd_elements::LIST => child.get_attribute(xsd_attrs::ITEM_TYPE).map(str::to_string),
        xsd_elements::UNION => child
            .get_attribute(xsd_attrs::MEMBER_TYPES)
            .and_then(|members| members.split_whitespace().next())
            .map(str::to_string),
        _ => None,
    });

    SimpleTypeDef {
        name: elem.get_attribute(xsd_attrs::NAME).map(str::to_string),
        base,
    }
}
