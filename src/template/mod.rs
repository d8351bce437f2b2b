//! Template generation
//!
//! - [`compiler`] - renders a schema's type graph as Velocity markup
//! - [`context`] - immutable recursion state of the compiler
//! - [`finalizer`] - substitutes mapped source expressions into the markup

pub mod compiler;
pub mod context;
pub mod finalizer;

pub use compiler::{compile_document, CompiledTemplate, TemplateCompiler};
pub use context::RenderContext;
pub use finalizer::{apply, FinalizedTemplate, TemplateFinalizer};
