use crate::frontmatter::FrontmatterError;
use crate::tree::{Point, Position};
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<&Point> for SourceLocation {
    fn from(point: &Point) -> Self {
        Self::new(point.line, point.column)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Pipeline stage in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Frontmatter extraction.
    Metadata,
    /// Markdown and directive parsing.
    Parse,
    /// Raw directive reclassification.
    Reclassify,
    /// Document tree to markup tree conversion.
    Convert,
    /// Curly brace escaping.
    Escape,
    /// Literal markup expansion.
    Expand,
    /// Passthrough finalization.
    Finalize,
    /// Metadata injection.
    Inject,
    /// Markup serialization.
    Serialize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Metadata => "metadata",
            Stage::Parse => "parse",
            Stage::Reclassify => "reclassify",
            Stage::Convert => "convert",
            Stage::Escape => "escape",
            Stage::Expand => "expand",
            Stage::Finalize => "finalize",
            Stage::Inject => "inject",
            Stage::Serialize => "serialize",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while transpiling a document.
#[derive(Debug, Error)]
pub enum Md2svError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The leading metadata block could not be extracted or parsed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// A node lacks the position needed to address the original source.
    #[error("Malformed position on {kind} node during {stage}{}", location_suffix(.location))]
    MalformedPosition {
        /// Stage that needed the position
        stage: Stage,
        /// Kind of the offending node
        kind: &'static str,
        /// Where the node starts, when known
        location: Option<SourceLocation>,
    },
    /// Metadata could not be encoded as a code literal.
    #[error("Metadata encoding error: {0}")]
    MetadataEncode(#[from] serde_json::Error),
    /// A node kind reached a stage that has no way to process it.
    #[error("Unhandled {kind} node during {stage}")]
    UnhandledNode {
        /// Stage that rejected the node
        stage: Stage,
        /// Kind of the offending node
        kind: &'static str,
    },
}

impl Md2svError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a malformed position error for a node.
    pub fn malformed_position(
        stage: Stage,
        kind: &'static str,
        position: Option<&Position>,
    ) -> Self {
        Self::MalformedPosition {
            stage,
            kind,
            location: position.map(|p| SourceLocation::from(&p.start)),
        }
    }

    /// Create an unhandled node error.
    pub fn unhandled(stage: Stage, kind: &'static str) -> Self {
        Self::UnhandledNode { stage, kind }
    }

    /// Stage the error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Md2svError::MarkdownAdapter { .. } => Stage::Parse,
            Md2svError::Frontmatter(_) => Stage::Metadata,
            Md2svError::MetadataEncode(_) => Stage::Inject,
            Md2svError::MalformedPosition { stage, .. } | Md2svError::UnhandledNode { stage, .. } => {
                *stage
            }
        }
    }
}

fn location_suffix(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" at {}", location),
        None => " (no position)".to_string(),
    }
}
