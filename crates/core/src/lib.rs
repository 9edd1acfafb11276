#![deny(missing_docs)]
//! md2sv core: source documents, frontmatter extraction, directive scanning,
//! and the document tree built from Markdown.

/// Code fence detection utilities.
pub mod code_fence;
/// Directive scanning utilities.
pub mod directives;
/// Source documents and their position index.
pub mod document;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction helpers.
pub mod frontmatter;
/// Document-tree building and extension hooks.
pub mod parse;
/// Document tree types.
pub mod tree;

pub use document::Document;
pub use error::{Md2svError, SourceLocation, Stage};
pub use frontmatter::{FrontmatterError, FrontmatterExtraction, extract_frontmatter};
pub use parse::{DocTransform, ParseOptions, ParserPipeline, ParserSetup, build_tree};
pub use tree::{Align, DirectiveShape, DocKind, DocNode, Point, Position};

pub use code_fence::{FencePhase, FenceState, LineParseOutcome, advance_fence_state};
pub use directives::{
    DirectiveOpening, DirectiveSpan, container_prefix_len, parse_directive_closer,
    parse_opening_directive, scan_directives, scan_inline, strip_container_prefix,
};
