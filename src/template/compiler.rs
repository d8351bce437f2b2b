//! XSD to Velocity template compiler
//!
//! Renders every global element of a schema as template markup:
//!
//! - scalar content becomes a `$request.<name>` placeholder
//! - attributes become `name="$request.<name>"` placeholders
//! - complexContent renders the base type's structure before the derived one
//! - each `choice` becomes one `#if` block per branch, keyed by a selector
//! - a named type already on the recursion chain becomes a cycle marker

use super::context::RenderContext;
use crate::config::TemplateSyntax;
use crate::diagnostics::{log_notice, Notice};
use crate::schema::paths::{ref_key, ChoiceCounter};
use crate::schema::{
    AttributeDecl, ComplexContent, ComplexTypeDef, ElementContent, ElementDecl, ModelGroup,
    Particle, SchemaModel, SchemaTypeDef, TypeResolution, TypeResolver,
};
use tracing::{debug, info};

/// Compiler output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledTemplate {
    /// Template text
    pub text: String,
    /// Conditions met while compiling
    pub notices: Vec<Notice>,
}

impl CompiledTemplate {
    /// Number of cycle markers in the text
    pub fn cycle_count(&self) -> usize {
        self.text.matches(CYCLE_MARKER).count()
    }
}

const CYCLE_MARKER: &str = "<!-- cycle: ";

/// Compile every global element of `schema` into one template document
pub fn compile_document(schema: &SchemaModel, syntax: &TemplateSyntax) -> CompiledTemplate {
    TemplateCompiler::new(schema, syntax).compile_document()
}

/// Content of a complex type, before it is wrapped in the element's tag
enum Body {
    /// Scalar text content
    Text,
    /// Child markup, already indented
    Children(String),
}

/// Attributes and content of an expanded complex type
struct Expansion {
    /// Lines written before the opening tag
    preamble: String,
    attributes: Vec<String>,
    body: Body,
}

#[derive(Default)]
struct Sink {
    notices: Vec<Notice>,
}

impl Sink {
    fn raise(&mut self, notice: Notice) {
        log_notice(&notice);
        self.notices.push(notice);
    }
}

/// Renders schema components as template markup
#[derive(Debug, Clone)]
pub struct TemplateCompiler<'a> {
    resolver: TypeResolver<'a>,
    syntax: &'a TemplateSyntax,
}

impl<'a> TemplateCompiler<'a> {
    /// Create a compiler over `schema`
    pub fn new(schema: &'a SchemaModel, syntax: &'a TemplateSyntax) -> Self {
        Self {
            resolver: TypeResolver::new(schema),
            syntax,
        }
    }

    /// Wrap every global element inside the synthetic root tag
    pub fn compile_document(&self) -> CompiledTemplate {
        let schema = self.resolver.schema();
        let root_tag = self.resolver.qualified_tag(&self.syntax.root_name);

        let mut declarations: Vec<String> = schema
            .output_prefixes()
            .map(|(prefix, uri)| format!("xmlns:{}=\"{}\"", prefix, uri))
            .collect();
        if self.resolver.target_prefix().is_some() {
            if let Some(tns) = &schema.target_namespace {
                declarations.push(format!("xmlns=\"{}\"", tns));
            }
        }

        let mut text = if declarations.is_empty() {
            format!("<{}>\n", root_tag)
        } else {
            format!("<{} {}>\n", root_tag, declarations.join(" "))
        };

        let mut sink = Sink::default();
        for decl in schema.elements.values() {
            let ctx = RenderContext::root(decl.name.as_str(), 1);
            self.element(decl, &ctx, &mut text, &mut sink);
        }
        text.push_str(&format!("</{}>\n", root_tag));

        info!(
            elements = schema.elements.len(),
            bytes = text.len(),
            notices = sink.notices.len(),
            "compiled template"
        );
        CompiledTemplate {
            text,
            notices: sink.notices,
        }
    }

    /// Compile one element declaration at the position described by `ctx`
    pub fn compile_element(&self, decl: &'a ElementDecl, ctx: &RenderContext) -> CompiledTemplate {
        let mut text = String::new();
        let mut sink = Sink::default();
        let ctx = ctx.renamed(decl.name.as_str());
        self.element(decl, &ctx, &mut text, &mut sink);
        CompiledTemplate {
            text,
            notices: sink.notices,
        }
    }

    /// Compile a type definition as the content of an element named by the
    /// context hint
    pub fn compile_type(&self, def: &'a SchemaTypeDef, ctx: &RenderContext) -> CompiledTemplate {
        let mut text = String::new();
        let mut sink = Sink::default();
        self.typed(def, &[], ctx, &mut text, &mut sink);
        CompiledTemplate {
            text,
            notices: sink.notices,
        }
    }

    fn placeholder(&self, name: &str) -> String {
        self.syntax.placeholder(name)
    }

    fn element(&self, decl: &'a ElementDecl, ctx: &RenderContext, out: &mut String, sink: &mut Sink) {
        let repeat = self.syntax.mark_repeats && decl.occurs.is_multiple();
        let indent = ctx.indent(&self.syntax.indent);
        if repeat {
            out.push_str(&format!(
                "{}#foreach(${}Item in {})\n",
                indent,
                decl.name,
                self.placeholder(&format!("{}List", decl.name))
            ));
        }

        match &decl.content {
            ElementContent::Reference(reference) => {
                let key = ref_key(&decl.name);
                if ctx.has_visited(&key) {
                    self.cycle(&decl.name, ctx, out, sink);
                } else {
                    match self.resolver.resolve_element_ref(reference) {
                        Some(target) => self.declared(target, &ctx.entering(key), out, sink),
                        None => {
                            sink.raise(Notice::UnresolvedType {
                                element: decl.name.clone(),
                                type_name: reference.clone(),
                            });
                            self.leaf(&decl.attributes, ctx, out);
                        }
                    }
                }
            }
            _ => self.declared(decl, ctx, out, sink),
        }

        if repeat {
            out.push_str(&format!("{}#end\n", indent));
        }
    }

    /// Render a non-reference declaration under the context hint
    fn declared(&self, decl: &'a ElementDecl, ctx: &RenderContext, out: &mut String, sink: &mut Sink) {
        match &decl.content {
            ElementContent::Typed(type_ref) => match self.resolver.resolve_name(type_ref) {
                TypeResolution::Schema(def) => self.typed(def, &decl.attributes, ctx, out, sink),
                TypeResolution::Builtin(_) => self.leaf(&decl.attributes, ctx, out),
                TypeResolution::Unknown => {
                    sink.raise(Notice::UnresolvedType {
                        element: decl.name.clone(),
                        type_name: type_ref.clone(),
                    });
                    self.leaf(&decl.attributes, ctx, out);
                }
            },
            ElementContent::Inline(def) => self.typed(def, &decl.attributes, ctx, out, sink),
            ElementContent::Reference(_) | ElementContent::Untyped => {
                self.leaf(&decl.attributes, ctx, out)
            }
        }
    }

    fn typed(
        &self,
        def: &'a SchemaTypeDef,
        direct: &[AttributeDecl],
        ctx: &RenderContext,
        out: &mut String,
        sink: &mut Sink,
    ) {
        let complex = match def {
            SchemaTypeDef::Simple(_) => return self.leaf(direct, ctx, out),
            SchemaTypeDef::Complex(ct) => ct,
        };

        let ctx = match &complex.name {
            Some(name) if ctx.has_visited(name) => return self.cycle(name, ctx, out, sink),
            Some(name) => ctx.entering(name.as_str()),
            None => ctx.clone(),
        };

        let mut choices = ChoiceCounter::new(ctx.hint());
        let mut expansion = self.expand(complex, &ctx, &mut choices, sink);
        for attr in direct {
            if !expansion.attributes.contains(&attr.name) {
                expansion.attributes.push(attr.name.clone());
            }
        }
        self.wrap(&expansion, &ctx, out);
    }

    /// Attributes and body of a complex type, base structure first
    fn expand(
        &self,
        def: &'a ComplexTypeDef,
        ctx: &RenderContext,
        choices: &mut ChoiceCounter,
        sink: &mut Sink,
    ) -> Expansion {
        match &def.content {
            ComplexContent::Ordinary {
                attributes,
                particle,
            } => {
                let mut body = String::new();
                if let Some(group) = particle {
                    self.group(group, &ctx.deeper(), choices, &mut body, sink);
                }
                Expansion {
                    preamble: String::new(),
                    attributes: names_of(attributes),
                    body: Body::Children(body),
                }
            }
            ComplexContent::Simple {
                base, attributes, ..
            } => {
                let mut preamble = String::new();
                let mut inherited = Vec::new();
                self.inherited_attributes(base, ctx, &mut inherited, &mut preamble, sink);
                push_names(&mut inherited, attributes);
                Expansion {
                    preamble,
                    attributes: inherited,
                    body: Body::Text,
                }
            }
            ComplexContent::Complex {
                base,
                attributes,
                particle,
                ..
            } => self.expand_derived(def, base, attributes, particle.as_ref(), ctx, choices, sink),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_derived(
        &self,
        def: &'a ComplexTypeDef,
        base: &'a str,
        attributes: &'a [AttributeDecl],
        particle: Option<&'a ModelGroup>,
        ctx: &RenderContext,
        choices: &mut ChoiceCounter,
        sink: &mut Sink,
    ) -> Expansion {
        let mut preamble = String::new();
        let mut merged = Vec::new();
        let mut body = String::new();
        let mut scalar = false;

        match self.resolver.resolve_name(base) {
            TypeResolution::Builtin(_) => {
                sink.raise(Notice::BuiltinComplexBase {
                    type_name: def.name.clone().unwrap_or_else(|| ctx.hint().to_string()),
                    base: base.to_string(),
                });
                push_names(&mut merged, attributes);
                return Expansion {
                    preamble,
                    attributes: merged,
                    body: Body::Text,
                };
            }
            TypeResolution::Schema(SchemaTypeDef::Complex(base_def)) => {
                let base_name = base_def.name.clone().unwrap_or_default();
                if ctx.has_visited(&base_name) {
                    self.cycle(&base_name, &ctx.deeper(), &mut body, sink);
                } else {
                    let inherited = self.expand(base_def, &ctx.entering(base_name), choices, sink);
                    preamble = inherited.preamble;
                    merged = inherited.attributes;
                    match inherited.body {
                        Body::Children(children) => body.push_str(&children),
                        Body::Text => scalar = true,
                    }
                }
            }
            TypeResolution::Schema(SchemaTypeDef::Simple(_)) => {
                debug!(base, hint = ctx.hint(), "complexContent over a simple type, scalar content");
                scalar = true;
            }
            TypeResolution::Unknown => sink.raise(Notice::UnresolvedType {
                element: ctx.hint().to_string(),
                type_name: base.to_string(),
            }),
        }

        push_names(&mut merged, attributes);
        if let Some(group) = particle {
            self.group(group, &ctx.deeper(), choices, &mut body, sink);
        }

        let body = if scalar && body.is_empty() {
            Body::Text
        } else {
            Body::Children(body)
        };
        Expansion {
            preamble,
            attributes: merged,
            body,
        }
    }

    /// Attributes of a simpleContent base chain. A cycle in the chain writes
    /// its marker to `markers`.
    fn inherited_attributes(
        &self,
        base: &'a str,
        ctx: &RenderContext,
        out: &mut Vec<String>,
        markers: &mut String,
        sink: &mut Sink,
    ) {
        let base_def = match self.resolver.resolve_name(base) {
            TypeResolution::Schema(SchemaTypeDef::Complex(base_def)) => base_def,
            _ => return,
        };
        let base_name = base_def.name.clone().unwrap_or_default();
        if ctx.has_visited(&base_name) {
            return self.cycle(&base_name, ctx, markers, sink);
        }
        let ctx = ctx.entering(base_name);
        if let Some(next) = base_def.content.base() {
            self.inherited_attributes(next, &ctx, out, markers, sink);
        }
        push_names(out, base_def.content.attributes());
    }

    /// Render the particles of `group`; `ctx` is already at child depth and
    /// still carries the parent's hint
    fn group(
        &self,
        group: &'a ModelGroup,
        ctx: &RenderContext,
        choices: &mut ChoiceCounter,
        out: &mut String,
        sink: &mut Sink,
    ) {
        if !group.is_choice() {
            for particle in &group.particles {
                self.particle(particle, ctx, choices, out, sink);
            }
            return;
        }

        let indent = ctx.indent(&self.syntax.indent);
        let selector = choices.next(&self.syntax.choice_suffix);
        let selector_token = self.placeholder(&selector);
        out.push_str(&format!("{}## choice: {}\n", indent, selector));
        for (i, particle) in group.particles.iter().enumerate() {
            out.push_str(&format!("{}#if({} == {})\n", indent, selector_token, i + 1));
            self.particle(particle, ctx, choices, out, sink);
            out.push_str(&format!("{}#end\n", indent));
        }
    }

    fn particle(
        &self,
        particle: &'a Particle,
        ctx: &RenderContext,
        choices: &mut ChoiceCounter,
        out: &mut String,
        sink: &mut Sink,
    ) {
        match particle {
            Particle::Element(decl) => self.element(decl, &ctx.renamed(decl.name.as_str()), out, sink),
            Particle::Group(nested) => self.group(nested, ctx, choices, out, sink),
        }
    }

    /// `<tag attrs>$request.hint</tag>`
    fn leaf(&self, attributes: &[AttributeDecl], ctx: &RenderContext, out: &mut String) {
        let expansion = Expansion {
            preamble: String::new(),
            attributes: names_of(attributes),
            body: Body::Text,
        };
        self.wrap(&expansion, ctx, out);
    }

    fn wrap(&self, expansion: &Expansion, ctx: &RenderContext, out: &mut String) {
        let indent = ctx.indent(&self.syntax.indent);
        let tag = self.resolver.qualified_tag(ctx.hint());
        let attrs: String = expansion
            .attributes
            .iter()
            .map(|name| format!(" {}=\"{}\"", name, self.placeholder(name)))
            .collect();

        out.push_str(&expansion.preamble);
        match &expansion.body {
            Body::Text => out.push_str(&format!(
                "{}<{}{}>{}</{}>\n",
                indent,
                tag,
                attrs,
                self.placeholder(ctx.hint()),
                tag
            )),
            Body::Children(children) if children.is_empty() => {
                out.push_str(&format!("{}<{}{}></{}>\n", indent, tag, attrs, tag))
            }
            Body::Children(children) => out.push_str(&format!(
                "{}<{}{}>\n{}{}</{}>\n",
                indent, tag, attrs, children, indent, tag
            )),
        }
    }

    fn cycle(&self, type_name: &str, ctx: &RenderContext, out: &mut String, sink: &mut Sink) {
        out.push_str(&format!(
            "{}{}{} -->\n",
            ctx.indent(&self.syntax.indent),
            CYCLE_MARKER,
            type_name
        ));
        sink.raise(Notice::CycleDetected {
            type_name: type_name.to_string(),
            element: ctx.hint().to_string(),
        });
    }
}

fn names_of(attributes: &[AttributeDecl]) -> Vec<String> {
    let mut names = Vec::new();
    push_names(&mut names, attributes);
    names
}

fn push_names(names: &mut Vec<String>, attributes: &[AttributeDecl]) {
    for attr in attributes {
        if !names.contains(&attr.name) {
            names.push(attr.name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema(body: &str) -> SchemaModel {
        SchemaModel::from_string(&format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
            body
        ))
        .unwrap()
    }

    fn compile(schema: &SchemaModel) -> CompiledTemplate {
        compile_document(schema, &TemplateSyntax::default())
    }

    #[test]
    fn test_sequence_of_builtins() {
        let schema = schema(
            r#"<xs:element name="Person" type="PersonType"/>
               <xs:complexType name="PersonType">
                 <xs:sequence>
                   <xs:element name="firstName" type="xs:string"/>
                   <xs:element name="lastName" type="xs:string"/>
                 </xs:sequence>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert_eq!(
            compiled.text,
            "<FullyGeneratedVMTemplateFromXSD>\n\
             \x20 <Person>\n\
             \x20   <firstName>$request.firstName</firstName>\n\
             \x20   <lastName>$request.lastName</lastName>\n\
             \x20 </Person>\n\
             </FullyGeneratedVMTemplateFromXSD>\n"
        );
        assert!(compiled.notices.is_empty());
    }

    #[test]
    fn test_target_prefix_and_root_declarations() {
        let schema = SchemaModel::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                          xmlns:soc="urn:orders" targetNamespace="urn:orders">
                 <xs:element name="code" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        let compiled = compile(&schema);
        assert_eq!(
            compiled.text,
            "<soc:FullyGeneratedVMTemplateFromXSD xmlns:soc=\"urn:orders\" xmlns=\"urn:orders\">\n\
             \x20 <soc:code>$request.code</soc:code>\n\
             </soc:FullyGeneratedVMTemplateFromXSD>\n"
        );
    }

    #[test]
    fn test_simple_content_with_attributes() {
        let schema = schema(
            r#"<xs:element name="amount">
                 <xs:complexType>
                   <xs:simpleContent>
                     <xs:extension base="xs:decimal">
                       <xs:attribute name="currency" type="xs:string"/>
                     </xs:extension>
                   </xs:simpleContent>
                 </xs:complexType>
               </xs:element>"#,
        );

        let compiled = compile(&schema);
        assert!(compiled
            .text
            .contains("  <amount currency=\"$request.currency\">$request.amount</amount>\n"));
    }

    #[test]
    fn test_inherited_fields_precede_declared_fields() {
        let schema = schema(
            r#"<xs:element name="item" type="Derived"/>
               <xs:complexType name="Base">
                 <xs:sequence><xs:element name="id"/></xs:sequence>
                 <xs:attribute name="version"/>
               </xs:complexType>
               <xs:complexType name="Derived">
                 <xs:complexContent>
                   <xs:extension base="Base">
                     <xs:sequence><xs:element name="label"/></xs:sequence>
                     <xs:attribute name="lang"/>
                   </xs:extension>
                 </xs:complexContent>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert_eq!(
            compiled.text,
            "<FullyGeneratedVMTemplateFromXSD>\n\
             \x20 <item version=\"$request.version\" lang=\"$request.lang\">\n\
             \x20   <id>$request.id</id>\n\
             \x20   <label>$request.label</label>\n\
             \x20 </item>\n\
             </FullyGeneratedVMTemplateFromXSD>\n"
        );
    }

    #[test]
    fn test_mutual_extension_emits_one_cycle_marker() {
        let schema = schema(
            r#"<xs:element name="root" type="A"/>
               <xs:complexType name="A">
                 <xs:complexContent><xs:extension base="B"/></xs:complexContent>
               </xs:complexType>
               <xs:complexType name="B">
                 <xs:complexContent><xs:extension base="A"/></xs:complexContent>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert_eq!(compiled.text.matches("<!-- cycle:").count(), 1);
        assert_eq!(compiled.cycle_count(), 1);
    }

    #[test]
    fn test_simple_content_cycle_writes_marker() {
        let schema = schema(
            r#"<xs:element name="root" type="A"/>
               <xs:complexType name="A">
                 <xs:simpleContent>
                   <xs:extension base="B"><xs:attribute name="a" type="xs:string"/></xs:extension>
                 </xs:simpleContent>
               </xs:complexType>
               <xs:complexType name="B">
                 <xs:simpleContent>
                   <xs:extension base="A"><xs:attribute name="b" type="xs:string"/></xs:extension>
                 </xs:simpleContent>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert_eq!(
            compiled.text,
            "<FullyGeneratedVMTemplateFromXSD>\n\
             \x20 <!-- cycle: A -->\n\
             \x20 <root b=\"$request.b\" a=\"$request.a\">$request.root</root>\n\
             </FullyGeneratedVMTemplateFromXSD>\n"
        );
        assert_eq!(compiled.cycle_count(), 1);
        assert_eq!(compiled.notices.len(), 1);
    }

    #[test]
    fn test_recursive_child_is_cut() {
        let schema = schema(
            r#"<xs:element name="node" type="Node"/>
               <xs:complexType name="Node">
                 <xs:sequence>
                   <xs:element name="value" type="xs:int"/>
                   <xs:element name="next" type="Node" minOccurs="0"/>
                 </xs:sequence>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert!(compiled.text.contains("    <!-- cycle: Node -->\n"));
        assert_eq!(compiled.cycle_count(), 1);
        assert_eq!(
            compiled.notices[0],
            Notice::CycleDetected {
                type_name: "Node".to_string(),
                element: "next".to_string(),
            }
        );
    }

    #[test]
    fn test_choice_blocks_numbered_in_order() {
        let schema = schema(
            r#"<xs:element name="doc">
                 <xs:complexType>
                   <xs:choice>
                     <xs:element name="x" type="xs:string"/>
                     <xs:element name="y" type="xs:string"/>
                     <xs:element name="z" type="xs:string"/>
                   </xs:choice>
                 </xs:complexType>
               </xs:element>"#,
        );

        let compiled = compile(&schema);
        assert_eq!(
            compiled.text,
            "<FullyGeneratedVMTemplateFromXSD>\n\
             \x20 <doc>\n\
             \x20   ## choice: doc_choice\n\
             \x20   #if($request.doc_choice == 1)\n\
             \x20   <x>$request.x</x>\n\
             \x20   #end\n\
             \x20   #if($request.doc_choice == 2)\n\
             \x20   <y>$request.y</y>\n\
             \x20   #end\n\
             \x20   #if($request.doc_choice == 3)\n\
             \x20   <z>$request.z</z>\n\
             \x20   #end\n\
             \x20 </doc>\n\
             </FullyGeneratedVMTemplateFromXSD>\n"
        );
    }

    #[test]
    fn test_second_choice_gets_ordinal() {
        let schema = schema(
            r#"<xs:element name="doc">
                 <xs:complexType>
                   <xs:sequence>
                     <xs:choice><xs:element name="a"/><xs:element name="b"/></xs:choice>
                     <xs:choice><xs:element name="c"/><xs:element name="d"/></xs:choice>
                   </xs:sequence>
                 </xs:complexType>
               </xs:element>"#,
        );

        let compiled = compile(&schema);
        assert!(compiled.text.contains("#if($request.doc_choice == 2)"));
        assert!(compiled.text.contains("#if($request.doc_choice2 == 1)"));
    }

    #[test]
    fn test_unresolved_type_is_leaf_with_notice() {
        let schema = schema(r#"<xs:element name="thing" type="MissingType"/>"#);

        let compiled = compile(&schema);
        assert!(compiled.text.contains("<thing>$request.thing</thing>"));
        assert_eq!(
            compiled.notices,
            vec![Notice::UnresolvedType {
                element: "thing".to_string(),
                type_name: "MissingType".to_string(),
            }]
        );
    }

    #[test]
    fn test_complex_content_over_builtin() {
        let schema = schema(
            r#"<xs:element name="odd" type="Odd"/>
               <xs:complexType name="Odd">
                 <xs:complexContent>
                   <xs:extension base="xs:string">
                     <xs:attribute name="flag"/>
                   </xs:extension>
                 </xs:complexContent>
               </xs:complexType>"#,
        );

        let compiled = compile(&schema);
        assert!(compiled
            .text
            .contains("<odd flag=\"$request.flag\">$request.odd</odd>"));
        assert!(matches!(
            compiled.notices.as_slice(),
            [Notice::BuiltinComplexBase { .. }]
        ));
    }

    #[test]
    fn test_empty_complex_type() {
        let schema = schema(
            r#"<xs:element name="marker"><xs:complexType/></xs:element>"#,
        );
        assert!(compile(&schema).text.contains("  <marker></marker>\n"));
    }

    #[test]
    fn test_element_ref_renders_target() {
        let schema = schema(
            r#"<xs:element name="Address" type="AddressType"/>
               <xs:complexType name="AddressType">
                 <xs:sequence><xs:element name="city"/></xs:sequence>
               </xs:complexType>
               <xs:element name="Order">
                 <xs:complexType>
                   <xs:sequence><xs:element ref="Address"/></xs:sequence>
                 </xs:complexType>
               </xs:element>"#,
        );

        let compiled = compile(&schema);
        assert!(compiled
            .text
            .contains("    <Address>\n      <city>$request.city</city>\n    </Address>\n"));
    }

    #[test]
    fn test_mark_repeats() {
        let schema = schema(
            r#"<xs:element name="list">
                 <xs:complexType>
                   <xs:sequence>
                     <xs:element name="entry" type="xs:string" maxOccurs="unbounded"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:element>"#,
        );

        let syntax = TemplateSyntax::default().with_mark_repeats(true);
        let compiled = compile_document(&schema, &syntax);
        assert!(compiled.text.contains(
            "    #foreach($entryItem in $request.entryList)\n    <entry>$request.entry</entry>\n    #end\n"
        ));

        let plain = compile(&schema);
        assert!(!plain.text.contains("#foreach"));
    }

    #[test]
    fn test_compile_type_uses_hint() {
        let schema = schema(
            r#"<xs:complexType name="Pair">
                 <xs:sequence><xs:element name="left"/><xs:element name="right"/></xs:sequence>
               </xs:complexType>"#,
        );
        let syntax = TemplateSyntax::default();
        let compiler = TemplateCompiler::new(&schema, &syntax);
        let def = schema.get_type("Pair").unwrap();

        let compiled = compiler.compile_type(def, &RenderContext::root("pair", 0));
        assert_eq!(
            compiled.text,
            "<pair>\n  <left>$request.left</left>\n  <right>$request.right</right>\n</pair>\n"
        );
    }

    #[test]
    fn test_compile_element_at_depth() {
        let schema = schema(
            r#"<xs:element name="Person">
                 <xs:complexType>
                   <xs:sequence><xs:element name="snils" type="xs:string"/></xs:sequence>
                   <xs:attribute name="code" type="xs:string"/>
                 </xs:complexType>
               </xs:element>"#,
        );
        let syntax = TemplateSyntax::default();
        let compiler = TemplateCompiler::new(&schema, &syntax);
        let decl = schema.element("Person").unwrap();

        let compiled = compiler.compile_element(decl, &RenderContext::root("ignored", 2));
        assert_eq!(
            compiled.text,
            "    <Person code=\"$request.code\">\n      <snils>$request.snils</snils>\n    </Person>\n"
        );
        assert!(compiled.notices.is_empty());
    }
}
