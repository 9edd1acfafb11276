#![deny(missing_docs)]
//! md2sv Svelte engine: markup conversion, raw directive passthrough, and
//! serialization.
//!
//! ```
//! let processor = md2sv_svelte::Processor::default();
//! let out = processor.process("hello :raw[{name}]").unwrap();
//! assert_eq!(out, "<p>hello {name}</p>");
//! ```

/// Document tree to markup tree conversion and the handler table.
pub mod convert;
/// Curly brace escaping for Svelte text.
pub mod escape;
/// Literal HTML expansion into markup nodes.
pub mod literal;
/// The markup tree.
pub mod markup;
/// Metadata injection into the module script.
pub mod metadata;
/// Processor and extension points.
pub mod pipeline;
/// Raw directive reclassification, extraction, and finalization.
pub mod raw;
/// Markup serialization.
pub mod serialize;
/// Built-in transforms (smartypants).
pub mod transform;

pub use convert::{Converter, Handlers, NodeHandler, State};
pub use escape::{escape_braces, escape_tree};
pub use literal::expand;
pub use markup::{Element, MarkupNode, Passthrough, PropertyValue};
pub use metadata::inject_metadata;
pub use pipeline::{MarkupTransform, Processor, ProcessorBuilder};
pub use raw::{RAW_DIRECTIVE, finalize, raw_handlers, reclassify};
pub use serialize::to_html;
pub use transform::Smartypants;
