//! Element path inventory
//!
//! Walks every global element down through its type graph and records one
//! [`PathInfo`] per reachable `/`-joined name path. The walk visits the same
//! structural cases as the template compiler so the inventory names exactly
//! the placeholders the compiler emits.

use super::particles::{ModelGroup, Occurs, Particle};
use super::resolver::{TypeResolution, TypeResolver};
use super::types::{AttributeDecl, ComplexContent, ComplexTypeDef, ElementContent, ElementDecl, SchemaTypeDef};
use super::SchemaModel;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, trace};

/// Default suffix of choice selector names
pub const DEFAULT_CHOICE_SUFFIX: &str = "_choice";

/// Where a node's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentOrigin {
    /// `xs:simpleContent` derivation
    SimpleContent,
    /// `xs:complexContent` derivation
    ComplexContent,
}

/// One reachable element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathInfo {
    /// Element name
    pub name: String,
    /// Resolved type name, synthetic for inline types, `None` when untyped
    pub type_name: Option<String>,
    /// minOccurs / maxOccurs
    pub occurs: Occurs,
    /// Attribute names, inherited ones first
    pub attributes: Vec<String>,
    /// simpleContent / complexContent origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<ContentOrigin>,
    /// Selector of the choice this element is a branch of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
}

/// A `choice` particle and its branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceGroup {
    /// Path of the element holding the choice
    pub parent: String,
    /// Selector variable name
    pub selector: String,
    /// Branch element paths in declaration order
    pub branches: Vec<String>,
}

/// The inventory of element paths
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathIndex {
    /// Path to node info, in discovery order
    pub paths: IndexMap<String, PathInfo>,
    /// Choice groups in discovery order
    pub choice_groups: Vec<ChoiceGroup>,
}

impl PathIndex {
    /// Distinct element names in path order
    pub fn element_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self.paths.values().map(|info| info.name.as_str()).collect();
        names.into_iter().collect()
    }

    /// Distinct attribute names in path order
    pub fn attribute_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self
            .paths
            .values()
            .flat_map(|info| info.attributes.iter().map(String::as_str))
            .collect();
        names.into_iter().collect()
    }

    /// Whether some path ends in an element named `name`
    pub fn contains_element(&self, name: &str) -> bool {
        self.paths.values().any(|info| info.name == name)
    }

    /// Number of indexed paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Index `schema` with the default choice suffix
pub fn index(schema: &SchemaModel) -> PathIndex {
    PathIndexer::new(schema).index()
}

/// Builds a [`PathIndex`]
#[derive(Debug, Clone)]
pub struct PathIndexer<'a> {
    resolver: TypeResolver<'a>,
    choice_suffix: String,
}

type Visited = HashSet<String>;

/// Per-element numbering of choice selectors
pub(crate) struct ChoiceCounter {
    hint: String,
    count: u32,
}

impl ChoiceCounter {
    pub(crate) fn new(hint: &str) -> Self {
        Self {
            hint: hint.to_string(),
            count: 0,
        }
    }

    pub(crate) fn next(&mut self, suffix: &str) -> String {
        self.count += 1;
        choice_selector(&self.hint, suffix, self.count)
    }
}

/// Selector variable name for the `ordinal`-th choice under `hint`
pub fn choice_selector(hint: &str, suffix: &str, ordinal: u32) -> String {
    if ordinal <= 1 {
        format!("{}{}", hint, suffix)
    } else {
        format!("{}{}{}", hint, suffix, ordinal)
    }
}

/// Visited-set key of an element reference
pub(crate) fn ref_key(name: &str) -> String {
    format!("ref:{}", name)
}

impl<'a> PathIndexer<'a> {
    /// Create an indexer over `schema`
    pub fn new(schema: &'a SchemaModel) -> Self {
        Self {
            resolver: TypeResolver::new(schema),
            choice_suffix: DEFAULT_CHOICE_SUFFIX.to_string(),
        }
    }

    /// Set the choice selector suffix
    pub fn with_choice_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.choice_suffix = suffix.into();
        self
    }

    /// Walk every global element
    pub fn index(&self) -> PathIndex {
        let mut out = PathIndex::default();
        for decl in self.resolver.schema().elements.values() {
            self.visit_element(decl, "", &Visited::new(), None, &mut out);
        }
        info!(
            paths = out.paths.len(),
            choice_groups = out.choice_groups.len(),
            "indexed schema paths"
        );
        out
    }

    fn visit_element(
        &self,
        decl: &'a ElementDecl,
        parent: &str,
        visited: &Visited,
        choice: Option<&str>,
        out: &mut PathIndex,
    ) -> String {
        let path = if parent.is_empty() {
            decl.name.clone()
        } else {
            format!("{}/{}", parent, decl.name)
        };

        // Element references take the target's content, keep their own bounds
        let (target, visited) = match &decl.content {
            ElementContent::Reference(reference) => {
                let key = ref_key(&decl.name);
                match self.resolver.resolve_element_ref(reference) {
                    Some(target) if !visited.contains(&key) => {
                        let mut next = visited.clone();
                        next.insert(key);
                        (Some(target), next)
                    }
                    _ => (None, visited.clone()),
                }
            }
            _ => (Some(decl), visited.clone()),
        };

        let Some(target) = target else {
            self.record(out, &path, leaf_info(decl, None, choice));
            return path;
        };

        let (type_name, def) = match &target.content {
            ElementContent::Typed(type_ref) => match self.resolver.resolve_name(type_ref) {
                TypeResolution::Schema(def) => (def.name().map(str::to_string), Some(def)),
                TypeResolution::Builtin(_) | TypeResolution::Unknown => (Some(type_ref.clone()), None),
            },
            ElementContent::Inline(def) => {
                let synthetic = match def.as_ref() {
                    SchemaTypeDef::Complex(_) => format!("{}_InlineComplexType", decl.name),
                    SchemaTypeDef::Simple(_) => format!("{}_InlineSimpleType", decl.name),
                };
                (Some(synthetic), Some(def.as_ref()))
            }
            ElementContent::Reference(_) | ElementContent::Untyped => (None, None),
        };

        let complex = match def {
            Some(SchemaTypeDef::Complex(ct)) => ct,
            _ => {
                let mut info = leaf_info(decl, type_name, choice);
                info.attributes = attribute_names(&target.attributes);
                self.record(out, &path, info);
                return path;
            }
        };

        let mut visited = visited;
        if let Some(name) = &complex.name {
            if visited.contains(name) {
                trace!(path = %path, type_name = %name, "cycle, not descending");
                self.record(out, &path, leaf_info(decl, type_name, choice));
                return path;
            }
            visited.insert(name.clone());
        }

        let mut info = leaf_info(decl, type_name, choice);
        info.origin = content_origin(&complex.content);
        self.collect_attributes(complex, &visited, &mut info.attributes);
        self.record(out, &path, info);

        let mut counter = ChoiceCounter::new(&decl.name);
        self.visit_content(complex, &path, &visited, &mut counter, out);
        path
    }

    fn record(&self, out: &mut PathIndex, path: &str, info: PathInfo) {
        // Schemas reusing a name at the same position collide; first wins
        out.paths.entry(path.to_string()).or_insert(info);
    }

    /// Attributes of `def`, those of its base chain first
    fn collect_attributes(&self, def: &'a ComplexTypeDef, visited: &Visited, out: &mut Vec<String>) {
        if let Some(base) = def.content.base() {
            if let Some((base_def, next)) = self.enter_base(base, visited) {
                self.collect_attributes(base_def, &next, out);
            }
        }
        for attr in def.content.attributes() {
            if !out.contains(&attr.name) {
                out.push(attr.name.clone());
            }
        }
    }

    /// Child elements of `def`: base content first, then its own particle
    fn visit_content(
        &self,
        def: &'a ComplexTypeDef,
        path: &str,
        visited: &Visited,
        counter: &mut ChoiceCounter,
        out: &mut PathIndex,
    ) {
        if let ComplexContent::Complex { base, .. } = &def.content {
            if let Some((base_def, next)) = self.enter_base(base, visited) {
                self.visit_content(base_def, path, &next, counter, out);
            }
        }
        if let Some(group) = def.content.particle() {
            self.visit_group(group, path, visited, counter, None, out);
        }
    }

    /// Resolve a base type to a complex type not yet on the chain
    fn enter_base(&self, base: &'a str, visited: &Visited) -> Option<(&'a ComplexTypeDef, Visited)> {
        match self.resolver.resolve_name(base) {
            TypeResolution::Schema(SchemaTypeDef::Complex(base_def)) => {
                let name = base_def.name.clone().unwrap_or_default();
                if visited.contains(&name) {
                    return None;
                }
                let mut next = visited.clone();
                next.insert(name);
                Some((base_def, next))
            }
            _ => None,
        }
    }

    fn visit_group(
        &self,
        group: &'a ModelGroup,
        parent: &str,
        visited: &Visited,
        counter: &mut ChoiceCounter,
        choice: Option<&str>,
        out: &mut PathIndex,
    ) -> Vec<String> {
        let mut visited_paths = Vec::new();

        if group.is_choice() {
            let selector = counter.next(&self.choice_suffix);
            let mut branches = Vec::new();
            for particle in &group.particles {
                match particle {
                    Particle::Element(decl) => {
                        branches.push(self.visit_element(decl, parent, visited, Some(&selector), out));
                    }
                    Particle::Group(nested) => {
                        branches.extend(self.visit_group(nested, parent, visited, counter, Some(&selector), out));
                    }
                }
            }
            visited_paths.extend(branches.iter().cloned());
            out.choice_groups.push(ChoiceGroup {
                parent: parent.to_string(),
                selector,
                branches,
            });
            return visited_paths;
        }

        for particle in &group.particles {
            match particle {
                Particle::Element(decl) => {
                    visited_paths.push(self.visit_element(decl, parent, visited, choice, out));
                }
                Particle::Group(nested) => {
                    visited_paths.extend(self.visit_group(nested, parent, visited, counter, choice, out));
                }
            }
        }
        visited_paths
    }
}

fn leaf_info(decl: &ElementDecl, type_name: Option<String>, choice: Option<&str>) -> PathInfo {
    PathInfo {
        name: decl.name.clone(),
        type_name,
        occurs: decl.occurs,
        attributes: Vec::new(),
        origin: None,
        choice: choice.map(str::to_string),
    }
}

fn attribute_names(attributes: &[AttributeDecl]) -> Vec<String> {
    attributes.iter().map(|a| a.name.clone()).collect()
}

fn content_origin(content: &ComplexContent) -> Option<ContentOrigin> {
    match content {
        ComplexContent::Ordinary { .. } => None,
        ComplexContent::Simple { .. } => Some(ContentOrigin::SimpleContent),
        ComplexContent::Complex { .. } => Some(ContentOrigin::ComplexContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: &str = r#"xmlns:xs="http://www.w3.org/2001/XMLSchema""#;

    fn schema(body: &str) -> SchemaModel {
        SchemaModel::from_string(&format!(
            r#"<xs:schema {} xmlns:tns="urn:t" targetNamespace="urn:t">{}</xs:schema>"#,
            XS, body
        ))
        .unwrap()
    }

    #[test]
    fn test_index_sequence_paths() {
        let schema = schema(
            r#"<xs:element name="Person" type="tns:PersonType"/>
               <xs:complexType name="PersonType">
                 <xs:sequence>
                   <xs:element name="firstName" type="xs:string"/>
                   <xs:element name="phones" maxOccurs="unbounded">
                     <xs:complexType>
                       <xs:sequence><xs:element name="number"/></xs:sequence>
                     </xs:complexType>
                   </xs:element>
                 </xs:sequence>
               </xs:complexType>"#,
        );

        let index = index(&schema);
        let paths: Vec<_> = index.paths.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec!["Person", "Person/firstName", "Person/phones", "Person/phones/number"]
        );
        assert_eq!(index.paths["Person"].type_name.as_deref(), Some("PersonType"));
        assert_eq!(index.paths["Person/firstName"].type_name.as_deref(), Some("xs:string"));
        assert_eq!(
            index.paths["Person/phones"].type_name.as_deref(),
            Some("phones_InlineComplexType")
        );
        assert!(index.paths["Person/phones"].occurs.is_multiple());
        assert_eq!(index.paths["Person/phones/number"].type_name, None);
    }

    #[test]
    fn test_contains_element_matches_last_segment() {
        let schema = schema(
            r#"<xs:element name="Person">
                 <xs:complexType>
                   <xs:sequence><xs:element name="snils"/></xs:sequence>
                   <xs:attribute name="code"/>
                 </xs:complexType>
               </xs:element>"#,
        );
        let index = index(&schema);
        assert!(index.contains_element("snils"));
        assert!(index.contains_element("Person"));
        assert!(!index.contains_element("Person/snils"));
        assert!(!index.contains_element("code"));
    }

    #[test]
    fn test_index_inherited_attributes_and_children() {
        let schema = schema(
            r#"<xs:element name="item" type="tns:Derived"/>
               <xs:complexType name="Base">
                 <xs:sequence><xs:element name="id"/></xs:sequence>
                 <xs:attribute name="version"/>
               </xs:complexType>
               <xs:complexType name="Derived">
                 <xs:complexContent>
                   <xs:extension base="tns:Base">
                     <xs:sequence><xs:element name="label"/></xs:sequence>
                     <xs:attribute name="lang"/>
                   </xs:extension>
                 </xs:complexContent>
               </xs:complexType>"#,
        );

        let index = index(&schema);
        let item = &index.paths["item"];
        assert_eq!(item.attributes, vec!["version", "lang"]);
        assert_eq!(item.origin, Some(ContentOrigin::ComplexContent));
        let paths: Vec<_> = index.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["item", "item/id", "item/label"]);
        assert_eq!(index.attribute_names(), vec!["version", "lang"]);
    }

    #[test]
    fn test_index_simple_content_origin() {
        let schema = schema(
            r#"<xs:element name="amount">
                 <xs:complexType>
                   <xs:simpleContent>
                     <xs:extension base="xs:decimal">
                       <xs:attribute name="currency"/>
                     </xs:extension>
                   </xs:simpleContent>
                 </xs:complexType>
               </xs:element>"#,
        );

        let index = index(&schema);
        let amount = &index.paths["amount"];
        assert_eq!(amount.origin, Some(ContentOrigin::SimpleContent));
        assert_eq!(amount.attributes, vec!["currency"]);
    }

    #[test]
    fn test_index_choice_groups() {
        let schema = schema(
            r#"<xs:element name="doc">
                 <xs:complexType>
                   <xs:sequence>
                     <xs:choice>
                       <xs:element name="x"/>
                       <xs:element name="y"/>
                     </xs:choice>
                     <xs:choice>
                       <xs:element name="p"/>
                       <xs:element name="q"/>
                     </xs:choice>
                   </xs:sequence>
                 </xs:complexType>
               </xs:element>"#,
        );

        let index = index(&schema);
        assert_eq!(index.choice_groups.len(), 2);
        assert_eq!(index.choice_groups[0].selector, "doc_choice");
        assert_eq!(index.choice_groups[0].branches, vec!["doc/x", "doc/y"]);
        assert_eq!(index.choice_groups[1].selector, "doc_choice2");
        assert_eq!(index.paths["doc/q"].choice.as_deref(), Some("doc_choice2"));
        assert_eq!(index.paths["doc"].choice, None);
    }

    #[test]
    fn test_index_terminates_on_cycles() {
        let schema = schema(
            r#"<xs:element name="node" type="tns:Node"/>
               <xs:complexType name="Node">
                 <xs:sequence>
                   <xs:element name="child" type="tns:Node" minOccurs="0"/>
                 </xs:sequence>
               </xs:complexType>"#,
        );

        let index = index(&schema);
        let paths: Vec<_> = index.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["node", "node/child"]);
    }

    #[test]
    fn test_index_element_ref() {
        let schema = schema(
            r#"<xs:element name="Address" type="xs:string"/>
               <xs:element name="Order">
                 <xs:complexType>
                   <xs:sequence>
                     <xs:element ref="tns:Address" minOccurs="0"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:element>"#,
        );

        let index = index(&schema);
        let address = &index.paths["Order/Address"];
        assert_eq!(address.type_name.as_deref(), Some("xs:string"));
        assert!(address.occurs.is_emptiable());
        assert_eq!(index.element_names(), vec!["Address", "Order"]);
    }

    #[test]
    fn test_custom_choice_suffix() {
        let schema = schema(
            r#"<xs:element name="doc">
                 <xs:complexType>
                   <xs:choice><xs:element name="a"/><xs:element name="b"/></xs:choice>
                 </xs:complexType>
               </xs:element>"#,
        );
        let index = PathIndexer::new(&schema).with_choice_suffix("Selector").index();
        assert_eq!(index.choice_groups[0].selector, "docSelector");
    }
}
