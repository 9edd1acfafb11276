//! Source documents and their position index.

use crate::frontmatter::{FrontmatterError, extract_frontmatter};
use crate::tree::Point;
use serde_json::{Map, Value as JsonValue};
use std::ops::Range;

/// One source document for the duration of a run.
///
/// Owns the original text, never modifies it, and answers offset and line
/// queries against it. Every stage that slices source text goes through the
/// document rather than through the tree.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    line_starts: Vec<usize>,
    metadata: Map<String, JsonValue>,
    body_start: usize,
}

impl Document {
    /// Creates a document, splitting off and parsing leading YAML frontmatter.
    pub fn parse(source: impl Into<String>) -> Result<Self, FrontmatterError> {
        let source = source.into();
        let extraction = extract_frontmatter(&source)?;
        Ok(Self::from_parts(
            source,
            extraction.value,
            extraction.body_start,
        ))
    }

    /// Creates a document whose whole text is body, with no metadata.
    pub fn from_body(source: impl Into<String>) -> Self {
        Self::from_parts(source.into(), Map::new(), 0)
    }

    fn from_parts(source: String, metadata: Map<String, JsonValue>, body_start: usize) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
            metadata,
            body_start,
        }
    }

    /// The original, untouched source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Frontmatter mapping, empty when the document has none.
    pub fn metadata(&self) -> &Map<String, JsonValue> {
        &self.metadata
    }

    /// Byte range of the Markdown body (everything after the frontmatter).
    pub fn body_range(&self) -> Range<usize> {
        self.body_start..self.source.len()
    }

    /// Number of lines, counting a trailing empty line after a final newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where a 1-indexed line starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index))
            .copied()
    }

    /// Text of a 1-indexed line, without its `\n` terminator.
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        self.source.get(start..end)
    }

    /// Text of the 1-indexed lines in `lines`, joined with `\n`.
    pub fn lines(&self, lines: Range<usize>) -> Option<String> {
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            out.push(self.line(line)?);
        }
        Some(out.join("\n"))
    }

    /// Slices the original source, `None` when the range does not address it.
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.source.get(range)
    }

    /// Resolves a byte offset into a line/column point.
    ///
    /// Offsets past the end clamp to the end of the source.
    pub fn point_at(&self, offset: usize) -> Point {
        let offset = offset.min(self.source.len());
        let index = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.line_starts[index];
        let column = match self.source.get(line_start..offset) {
            Some(prefix) => prefix.chars().count() + 1,
            None => offset - line_start + 1,
        };
        Point::new(index + 1, column, offset)
    }
}
