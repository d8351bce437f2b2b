//! # xsdvm
//!
//! Compiles an XML Schema (XSD) into a Velocity template and maps its
//! placeholders onto fields found in sample JSON payloads.
//!
//! ## Features
//!
//! - XSD type graph walk with inheritance, choice groups and cycle breaking
//! - Flat inventory of every reachable element path
//! - Sample payload and service descriptor analysis
//! - Ordered multi-strategy placeholder mapping with fuzzy name matching
//! - Longest-first placeholder substitution
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsdvm::pipeline::{Generator, Inputs};
//! use xsdvm::locations::Location;
//!
//! let inputs = Inputs::new(Location::path("schema.xsd"))
//!     .with_sample(Location::path("sample.json"))
//!     .with_descriptor(Location::path("form.json"));
//!
//! let generated = Generator::default().generate(&inputs)?;
//! println!("{}", generated.text);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod documents;
pub mod loaders;

// Components
pub mod mapping;
pub mod schema;
pub mod sources;
pub mod template;

// End-to-end driver
pub mod pipeline;

// Re-exports for convenience
pub use config::Config;
pub use diagnostics::Notice;
pub use error::{Error, Result};
pub use pipeline::{Generated, Generator, Inputs};

/// Version of the xsdvm library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
