//! Type and reference resolution
//!
//! Resolves `type="..."`, `base="..."` and `ref="..."` values against the
//! schema's namespace context. Only named components declared in the schema's
//! own target namespace can be resolved; XSD builtins are leaves.

use super::types::{ElementContent, ElementDecl, SchemaTypeDef};
use super::SchemaModel;
use crate::names::split_qname;
use crate::XSD_NAMESPACE;
use tracing::debug;

/// Local names of the XSD builtin datatypes
const BUILTIN_TYPES: &[&str] = &[
    "string", "normalizedString", "token", "language", "Name", "NCName", "ID", "IDREF",
    "IDREFS", "ENTITY", "ENTITIES", "NMTOKEN", "NMTOKENS", "boolean", "decimal", "integer",
    "long", "int", "short", "byte", "nonNegativeInteger", "positiveInteger", "unsignedLong",
    "unsignedInt", "unsignedShort", "unsignedByte", "nonPositiveInteger", "negativeInteger",
    "float", "double", "duration", "dateTime", "time", "date", "gYearMonth", "gYear",
    "gMonthDay", "gDay", "gMonth", "hexBinary", "base64Binary", "anyURI", "QName", "NOTATION",
    "anyType", "anySimpleType", "dateTimeStamp", "dayTimeDuration", "yearMonthDuration",
];

/// Whether `local_name` names an XSD builtin datatype
pub fn is_builtin_name(local_name: &str) -> bool {
    BUILTIN_TYPES.contains(&local_name)
}

/// Outcome of resolving a type reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeResolution<'a> {
    /// A named type declared in this schema
    Schema(&'a SchemaTypeDef),
    /// An XSD builtin, by local name
    Builtin(&'a str),
    /// Neither builtin nor declared in this schema
    Unknown,
}

/// Resolves references against one [`SchemaModel`]
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    schema: &'a SchemaModel,
    target_prefix: Option<&'a str>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver for `schema`
    pub fn new(schema: &'a SchemaModel) -> Self {
        let target_prefix = schema
            .target_namespace
            .as_deref()
            .and_then(|tns| schema.namespaces.prefix_for(tns));
        Self {
            schema,
            target_prefix,
        }
    }

    /// The schema being resolved against
    pub fn schema(&self) -> &'a SchemaModel {
        self.schema
    }

    /// Prefix bound to the target namespace, if any
    pub fn target_prefix(&self) -> Option<&'a str> {
        self.target_prefix
    }

    /// Tag name for an element: `prefix:local` when a prefix is bound to
    /// the target namespace, else the bare local name
    pub fn qualified_tag(&self, local_name: &str) -> String {
        match self.target_prefix {
            Some(prefix) => format!("{}:{}", prefix, local_name),
            None => local_name.to_string(),
        }
    }

    /// Resolve a type reference as written (`tns:PersonType`, `xs:string`)
    pub fn resolve_name(&self, type_ref: &'a str) -> TypeResolution<'a> {
        let (prefix, local) = split_qname(type_ref);
        let namespace = match prefix {
            Some(p) => match self.schema.namespaces.get_namespace(p) {
                Some(ns) => Some(ns),
                None => {
                    debug!(prefix = p, type_ref, "undeclared prefix, resolving by local name");
                    None
                }
            },
            None => self.schema.namespaces.get_default_namespace(),
        };

        if namespace == Some(XSD_NAMESPACE) {
            return TypeResolution::Builtin(local);
        }

        let same_schema = match (namespace, self.schema.target_namespace.as_deref()) {
            (None, _) => true,
            (Some(ns), Some(tns)) => ns == tns,
            (Some(_), None) => false,
        };

        if same_schema {
            if let Some(def) = self.schema.get_type(local) {
                return TypeResolution::Schema(def);
            }
            if prefix.is_none() && is_builtin_name(local) {
                return TypeResolution::Builtin(local);
            }
        }

        TypeResolution::Unknown
    }

    /// Resolve an element's declared type to a schema type.
    ///
    /// Returns `None` for builtins, unknown names and declarations without a
    /// `type` attribute; callers then fall back to the inline type.
    pub fn resolve_type(&self, decl: &'a ElementDecl) -> Option<&'a SchemaTypeDef> {
        match &decl.content {
            ElementContent::Typed(type_ref) => match self.resolve_name(type_ref) {
                TypeResolution::Schema(def) => Some(def),
                _ => None,
            },
            _ => None,
        }
    }

    /// Resolve an element reference to its global declaration
    pub fn resolve_element_ref(&self, reference: &str) -> Option<&'a ElementDecl> {
        let (_, local) = split_qname(reference);
        self.schema.element(local)
    }
}
