//! Schema components
//!
//! Element, attribute and type declarations as read from an XSD document.
//! Type references are kept as written (`tns:PersonType`); resolution
//! happens in [`TypeResolver`](super::TypeResolver).

use super::particles::{ModelGroup, Occurs};

/// A simple or complex type definition
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTypeDef {
    /// `xs:simpleType`
    Simple(SimpleTypeDef),
    /// `xs:complexType`
    Complex(ComplexTypeDef),
}

impl SchemaTypeDef {
    /// Type name, `None` for anonymous types
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaTypeDef::Simple(t) => t.name.as_deref(),
            SchemaTypeDef::Complex(t) => t.name.as_deref(),
        }
    }

    /// Whether this is a complex type
    pub fn is_complex(&self) -> bool {
        matches!(self, SchemaTypeDef::Complex(_))
    }

    /// The complex type, if this is one
    pub fn as_complex(&self) -> Option<&ComplexTypeDef> {
        match self {
            SchemaTypeDef::Complex(t) => Some(t),
            SchemaTypeDef::Simple(_) => None,
        }
    }
}

/// `xs:simpleType`: always rendered as a scalar
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleTypeDef {
    /// Type name
    pub name: Option<String>,
    /// Restriction base, list item type or first union member, as written
    pub base: Option<String>,
}

/// Derivation method of simpleContent / complexContent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// `xs:extension`
    Extension,
    /// `xs:restriction`
    Restriction,
}

impl Derivation {
    /// Parse from element local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "extension" => Some(Self::Extension),
            "restriction" => Some(Self::Restriction),
            _ => None,
        }
    }
}

/// The content shape of a complex type
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexContent {
    /// No simpleContent/complexContent wrapper
    Ordinary {
        /// Attributes in declaration order
        attributes: Vec<AttributeDecl>,
        /// Content model
        particle: Option<ModelGroup>,
    },
    /// Scalar text content with attributes
    Simple {
        /// Extension or restriction
        derivation: Derivation,
        /// Base type as written
        base: String,
        /// Attributes declared on the derivation
        attributes: Vec<AttributeDecl>,
    },
    /// Derived from another complex type
    Complex {
        /// Extension or restriction
        derivation: Derivation,
        /// Base type as written
        base: String,
        /// Attributes declared on the derivation
        attributes: Vec<AttributeDecl>,
        /// Content model declared on the derivation
        particle: Option<ModelGroup>,
    },
}

impl ComplexContent {
    /// Attributes declared directly on this content (not inherited)
    pub fn attributes(&self) -> &[AttributeDecl] {
        match self {
            ComplexContent::Ordinary { attributes, .. }
            | ComplexContent::Simple { attributes, .. }
            | ComplexContent::Complex { attributes, .. } => attributes,
        }
    }

    /// Content model declared directly on this content (not inherited)
    pub fn particle(&self) -> Option<&ModelGroup> {
        match self {
            ComplexContent::Ordinary { particle, .. } | ComplexContent::Complex { particle, .. } => {
                particle.as_ref()
            }
            ComplexContent::Simple { .. } => None,
        }
    }

    /// Base type reference, if derived
    pub fn base(&self) -> Option<&str> {
        match self {
            ComplexContent::Ordinary { .. } => None,
            ComplexContent::Simple { base, .. } | ComplexContent::Complex { base, .. } => Some(base),
        }
    }
}

/// `xs:complexType`
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexTypeDef {
    /// Type name
    pub name: Option<String>,
    /// Content shape
    pub content: ComplexContent,
}

impl ComplexTypeDef {
    /// An anonymous type with no attributes and no content model
    pub fn empty() -> Self {
        Self {
            name: None,
            content: ComplexContent::Ordinary {
                attributes: Vec::new(),
                particle: None,
            },
        }
    }
}

/// `xs:attribute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name (local part of `ref` for references)
    pub name: String,
    /// Declared type as written
    pub type_ref: Option<String>,
}

impl AttributeDecl {
    /// Create an attribute declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
        }
    }
}

/// What an element declaration says about its content
#[derive(Debug, Clone, PartialEq)]
pub enum ElementContent {
    /// `type="..."`, as written
    Typed(String),
    /// Anonymous nested `xs:complexType` / `xs:simpleType`
    Inline(Box<SchemaTypeDef>),
    /// `ref="..."` to a global element, as written
    Reference(String),
    /// No type information at all
    Untyped,
}

/// `xs:element`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Element name (local part of `ref` for references)
    pub name: String,
    /// minOccurs / maxOccurs
    pub occurs: Occurs,
    /// Declared content
    pub content: ElementContent,
    /// Attributes declared directly on the element
    pub attributes: Vec<AttributeDecl>,
}

impl ElementDecl {
    /// An untyped element occurring once
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occurs: Occurs::once(),
            content: ElementContent::Untyped,
            attributes: Vec::new(),
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, type_ref: impl Into<String>) -> Self {
        self.content = ElementContent::Typed(type_ref.into());
        self
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Inline type definition, if any
    pub fn inline_type(&self) -> Option<&SchemaTypeDef> {
        match &self.content {
            ElementContent::Inline(def) => Some(def),
            _ => None,
        }
    }
}
