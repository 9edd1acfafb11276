//! Document-tree building and extension hooks.
//!
//! The body of a [`Document`] is parsed with markdown-rs and converted into a
//! [`DocNode`] tree. Directives are found first by
//! [`scan_directives`](crate::directives::scan_directives) and hidden from
//! markdown-rs:
//!
//! - leaf and container directives are blanked out (newlines kept, so every
//!   offset still lines up with the source) and spliced back into the tree
//!   by position;
//! - inline directives are overwritten with sentinel bytes, which come back
//!   out of markdown-rs inside text nodes and are split into directive nodes.
//!
//! Directive labels and container bodies are parsed as fragments of their
//! own, so every position in the result addresses the original source.

use crate::directives::{DirectiveSpan, scan_directives, scan_inline, strip_container_prefix};
use crate::document::Document;
use crate::error::{Md2svError, SourceLocation};
use crate::tree::{Align, DirectiveShape, DocKind, DocNode, Position};
use markdown::mdast::{AlignKind, Node};
use markdown::message::{Message, Place};
use serde::Deserialize;
use std::ops::Range;

/// Sentinels used for inline directives, alternating so that two adjacent
/// directives stay distinguishable.
const SENTINELS: [char; 2] = ['\u{1}', '\u{2}'];

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs (tables, strikethrough,
    /// task lists, autolink literals).
    pub gfm: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Keep literal HTML as HTML rather than text.
    pub raw_html: bool,
    /// Recognize `:name[...]`, `::name[...]` and `:::name` directives.
    pub directives: bool,
}

impl ParseOptions {
    /// CommonMark with literal HTML and directives.
    pub const fn commonmark() -> Self {
        Self {
            gfm: false,
            math: false,
            code_indented: true,
            raw_html: true,
            directives: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// Frontmatter is split off before parsing, so that construct stays off.
    /// GFM footnotes are not enabled.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::commonmark()
    }
}

/// Adjusts parse options before a document tree is built.
pub trait ParserSetup: Send + Sync {
    /// Mutate the options in place.
    fn setup(&self, options: &mut ParseOptions);
}

impl<F> ParserSetup for F
where
    F: Fn(&mut ParseOptions) + Send + Sync,
{
    fn setup(&self, options: &mut ParseOptions) {
        (self)(options)
    }
}

/// Mutates the document tree after it has been built.
pub trait DocTransform: Send + Sync {
    /// Mutate the tree in place. The document gives access to the source.
    fn transform(&self, root: &mut DocNode, document: &Document);
}

impl<F> DocTransform for F
where
    F: Fn(&mut DocNode, &Document) + Send + Sync,
{
    fn transform(&self, root: &mut DocNode, document: &Document) {
        (self)(root, document)
    }
}

/// Configurable parsing pipeline with optional tree transforms.
pub struct ParserPipeline {
    options: ParseOptions,
    transforms: Vec<Box<dyn DocTransform>>,
}

impl ParserPipeline {
    /// Create a new pipeline from parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            transforms: Vec::new(),
        }
    }

    /// Options the pipeline parses with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Options, for adjusting before the first parse.
    pub fn options_mut(&mut self) -> &mut ParseOptions {
        &mut self.options
    }

    /// Add a tree transform. Transforms run in insertion order.
    pub fn add_transform<T: DocTransform + 'static>(&mut self, transform: T) {
        self.transforms.push(Box::new(transform));
    }

    /// Build the document tree and run every transform over it.
    pub fn parse(&self, document: &Document) -> Result<DocNode, Md2svError> {
        let mut root = build_tree(document, &self.options)?;
        for transform in &self.transforms {
            transform.transform(&mut root, document);
        }
        Ok(root)
    }
}

/// Build the document tree for the body of `document`.
pub fn build_tree(document: &Document, options: &ParseOptions) -> Result<DocNode, Md2svError> {
    let builder = TreeBuilder {
        document,
        markdown: options.to_markdown(),
        directives: options.directives,
    };
    let region = document.body_range();
    let spans = if options.directives {
        scan_directives(document.source(), region.clone())
    } else {
        Vec::new()
    };
    let children = builder.build_blocks(region.clone(), &spans, 0)?;
    Ok(DocNode::root(children).at(Some(builder.position(region))))
}

struct TreeBuilder<'a> {
    document: &'a Document,
    markdown: markdown::ParseOptions,
    directives: bool,
}

/// A slice of the source parsed on its own.
struct Fragment<'s> {
    base: usize,
    inline: Vec<&'s DirectiveSpan>,
}

impl<'s> Fragment<'s> {
    fn within(&self, range: Range<usize>) -> impl Iterator<Item = &'s DirectiveSpan> + '_ {
        self.inline
            .iter()
            .copied()
            .filter(move |span| range.start <= span.range.start && span.range.end <= range.end)
    }
}

impl TreeBuilder<'_> {
    fn position(&self, range: Range<usize>) -> Position {
        Position::new(
            self.document.point_at(range.start),
            self.document.point_at(range.end),
        )
    }

    fn fragment_position(
        &self,
        fragment: &Fragment<'_>,
        position: Option<&markdown::unist::Position>,
    ) -> Option<Position> {
        position.map(|p| {
            self.position(fragment.base + p.start.offset..fragment.base + p.end.offset)
        })
    }

    /// Parses `region` as blocks. `prefix` is the width of the container
    /// prefix every line of the region repeats, blanked before parsing.
    fn build_blocks(
        &self,
        region: Range<usize>,
        spans: &[DirectiveSpan],
        prefix: usize,
    ) -> Result<Vec<DocNode>, Md2svError> {
        let mut spans: Vec<&DirectiveSpan> = spans.iter().collect();
        spans.sort_by_key(|span| span.range.start);

        let mut masked = mask(self.document.source(), region.clone(), &spans);
        if prefix > 0 {
            masked = blank_prefixes(&masked, prefix);
        }
        let mdast = markdown::to_mdast(&masked, &self.markdown)
            .map_err(|err| self.adapter_error(&err, region.start))?;

        let (blocks, inline): (Vec<_>, Vec<_>) = spans.into_iter().partition(|s| s.is_block());
        let fragment = Fragment {
            base: region.start,
            inline,
        };

        let mut children = match mdast {
            Node::Root(root) => self.convert_children(root.children, &fragment)?,
            other => self.convert_children(vec![other], &fragment)?,
        };

        for span in blocks {
            let node = self.directive_node(span)?;
            splice(&mut children, node);
        }

        Ok(children)
    }

    fn build_label(&self, label: Range<usize>) -> Result<Vec<DocNode>, Md2svError> {
        let spans = if self.directives {
            let text = self.document.slice(label.clone()).unwrap_or_default();
            scan_inline(text, label.start)
        } else {
            Vec::new()
        };
        let mut blocks = self.build_blocks(label, &spans, 0)?;
        if blocks.len() == 1 && blocks[0].kind == DocKind::Paragraph {
            return Ok(blocks.remove(0).children);
        }
        Ok(blocks)
    }

    fn directive_node(&self, span: &DirectiveSpan) -> Result<DocNode, Md2svError> {
        let mut children = Vec::new();

        if let Some(label) = &span.label {
            let label_nodes = self.build_label(label.clone())?;
            match span.shape {
                DirectiveShape::Inline | DirectiveShape::Leaf => children.extend(label_nodes),
                DirectiveShape::Container if !label_nodes.is_empty() => children.push(
                    DocNode::with_children(DocKind::Paragraph, label_nodes)
                        .at(Some(self.position(label.clone()))),
                ),
                DirectiveShape::Container => {}
            }
        }

        if let Some(body) = &span.body {
            let prefix = column_offset(self.document.source(), span.range.start);
            children.extend(self.build_blocks(body.clone(), &span.nested, prefix)?);
        }

        let kind = DocKind::Directive {
            name: span.name.clone(),
            shape: span.shape,
        };
        Ok(DocNode::with_children(kind, children).at(Some(self.position(span.range.clone()))))
    }

    fn convert_children(
        &self,
        nodes: Vec<Node>,
        fragment: &Fragment<'_>,
    ) -> Result<Vec<DocNode>, Md2svError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.convert(node, fragment, &mut out)?;
        }
        Ok(out)
    }

    fn convert(
        &self,
        node: Node,
        fragment: &Fragment<'_>,
        out: &mut Vec<DocNode>,
    ) -> Result<(), Md2svError> {
        let position = self.fragment_position(fragment, node.position());
        let range = position.map(|p| p.start.offset..p.end.offset);
        let mut spans = fragment.within(range.clone().unwrap_or_default());

        let (kind, children) = match node {
            Node::Root(root) => {
                out.extend(self.convert_children(root.children, fragment)?);
                return Ok(());
            }
            Node::Text(text) => {
                out.extend(self.split_text(text.value, position, fragment)?);
                return Ok(());
            }
            Node::Paragraph(n) => (DocKind::Paragraph, n.children),
            Node::Heading(n) => (DocKind::Heading { depth: n.depth }, n.children),
            Node::ThematicBreak(_) => (DocKind::ThematicBreak, Vec::new()),
            Node::Blockquote(n) => (DocKind::Blockquote, n.children),
            Node::List(n) => (
                DocKind::List {
                    ordered: n.ordered,
                    start: n.start,
                    spread: n.spread,
                },
                n.children,
            ),
            Node::ListItem(n) => (
                DocKind::ListItem {
                    spread: n.spread,
                    checked: n.checked,
                },
                n.children,
            ),
            Node::Code(n) => (
                DocKind::Code {
                    value: self.restore(n.value, &mut spans),
                    lang: n.lang,
                    meta: n.meta,
                },
                Vec::new(),
            ),
            Node::Math(n) => (
                DocKind::Math {
                    value: self.restore(n.value, &mut spans),
                },
                Vec::new(),
            ),
            Node::Html(n) => (
                DocKind::Html {
                    value: self.restore(n.value, &mut spans),
                },
                Vec::new(),
            ),
            Node::Definition(n) => (
                DocKind::Definition {
                    identifier: n.identifier,
                    url: self.restore(n.url, &mut spans),
                    title: n.title.map(|t| self.restore(t, &mut spans)),
                },
                Vec::new(),
            ),
            Node::Emphasis(n) => (DocKind::Emphasis, n.children),
            Node::Strong(n) => (DocKind::Strong, n.children),
            Node::Delete(n) => (DocKind::Delete, n.children),
            Node::InlineCode(n) => (
                DocKind::InlineCode {
                    value: self.restore(n.value, &mut spans),
                },
                Vec::new(),
            ),
            Node::InlineMath(n) => (
                DocKind::InlineMath {
                    value: self.restore(n.value, &mut spans),
                },
                Vec::new(),
            ),
            Node::Break(_) => (DocKind::Break, Vec::new()),
            Node::Link(n) => {
                // Directives in the label are split out of its text nodes;
                // only the destination and title remain.
                let label_end = n
                    .children
                    .last()
                    .and_then(|child| self.fragment_position(fragment, child.position()))
                    .map(|p| p.end.offset);
                let mut spans = match (label_end, range.clone()) {
                    (Some(label_end), Some(range)) => fragment.within(label_end..range.end),
                    _ => fragment.within(range.clone().unwrap_or_default()),
                };
                (
                    DocKind::Link {
                        url: self.restore(n.url, &mut spans),
                        title: n.title.map(|t| self.restore(t, &mut spans)),
                    },
                    n.children,
                )
            }
            Node::Image(n) => (
                DocKind::Image {
                    alt: self.restore(n.alt, &mut spans),
                    url: self.restore(n.url, &mut spans),
                    title: n.title.map(|t| self.restore(t, &mut spans)),
                },
                Vec::new(),
            ),
            Node::LinkReference(n) => (
                DocKind::LinkReference {
                    identifier: n.identifier,
                    label: n.label,
                },
                n.children,
            ),
            Node::ImageReference(n) => (
                DocKind::ImageReference {
                    identifier: n.identifier,
                    alt: self.restore(n.alt, &mut spans),
                    label: n.label,
                },
                Vec::new(),
            ),
            Node::Table(n) => (
                DocKind::Table {
                    align: n.align.iter().map(convert_align).collect(),
                },
                n.children,
            ),
            Node::TableRow(n) => (DocKind::TableRow, n.children),
            Node::TableCell(n) => (DocKind::TableCell, n.children),
            other => {
                log::warn!("Skipping unsupported markdown node: {:?}", other);
                return Ok(());
            }
        };

        let children = self.convert_children(children, fragment)?;
        out.push(DocNode::with_children(kind, children).at(position));
        Ok(())
    }

    /// Splits sentinel runs out of a text value into directive nodes.
    fn split_text(
        &self,
        value: String,
        position: Option<Position>,
        fragment: &Fragment<'_>,
    ) -> Result<Vec<DocNode>, Md2svError> {
        let Some(position) = position.filter(|_| has_sentinel(&value)) else {
            return Ok(vec![DocNode::text(value).at(position)]);
        };

        let mut spans = fragment.within(position.start.offset..position.end.offset);
        let mut nodes = Vec::new();
        let mut cursor = 0;
        let mut offset = position.start.offset;

        for run in sentinel_runs(&value) {
            let Some(span) = spans.next() else {
                break;
            };
            self.push_text(&mut nodes, &value[cursor..run.start], offset..span.range.start);
            nodes.push(self.directive_node(span)?);
            cursor = run.end;
            offset = span.range.end;
        }
        self.push_text(&mut nodes, &value[cursor..], offset..position.end.offset);

        Ok(nodes)
    }

    fn push_text(&self, nodes: &mut Vec<DocNode>, text: &str, range: Range<usize>) {
        if !text.is_empty() {
            nodes.push(DocNode::text(text).at(Some(self.position(range))));
        }
    }

    /// Puts the source text of inline directives back into a literal value.
    fn restore<'s>(
        &self,
        value: String,
        spans: &mut impl Iterator<Item = &'s DirectiveSpan>,
    ) -> String {
        if !has_sentinel(&value) {
            return value;
        }

        let mut out = String::with_capacity(value.len());
        let mut cursor = 0;
        for run in sentinel_runs(&value) {
            let Some(span) = spans.next() else {
                break;
            };
            out.push_str(&value[cursor..run.start]);
            out.push_str(self.document.slice(span.range.clone()).unwrap_or_default());
            cursor = run.end;
        }
        out.push_str(&value[cursor..]);
        out
    }

    fn adapter_error(&self, message: &Message, base: usize) -> Md2svError {
        let offset = match message.place.as_deref() {
            Some(Place::Point(point)) => point.offset,
            Some(Place::Position(position)) => position.start.offset,
            None => 0,
        };
        Md2svError::MarkdownAdapter {
            message: message.to_string(),
            location: SourceLocation::from(&self.document.point_at(base + offset)),
        }
    }
}

/// Copies `region` of `source`, blanking block directives and overwriting
/// inline directives with sentinels. Byte offsets are unchanged.
///
/// Continuation lines of a block directive keep their container prefix, so
/// a directive inside a blockquote leaves the blockquote whole.
fn mask(source: &str, region: Range<usize>, spans: &[&DirectiveSpan]) -> String {
    let mut out = String::with_capacity(region.len());
    let mut cursor = region.start;
    let mut inline_index = 0;

    for span in spans {
        out.push_str(&source[cursor..span.range.start]);
        let hidden = &source[span.range.clone()];
        if span.is_block() {
            let prefix = column_offset(source, span.range.start);
            for (index, line) in hidden.split_inclusive('\n').enumerate() {
                let kept = match index {
                    0 => 0,
                    _ => line.len() - strip_container_prefix(line, prefix).len(),
                };
                out.push_str(&line[..kept]);
                out.extend(line[kept..].bytes().map(blank));
            }
        } else {
            let sentinel = SENTINELS[inline_index % SENTINELS.len()];
            inline_index += 1;
            out.extend(std::iter::repeat_n(sentinel, hidden.len()));
        }
        cursor = span.range.end;
    }

    out.push_str(&source[cursor..region.end]);
    out
}

fn blank(byte: u8) -> char {
    match byte {
        b'\n' | b'\r' => byte as char,
        _ => ' ',
    }
}

/// Replaces the first `prefix` bytes of container markup on every line with
/// spaces.
fn blank_prefixes(text: &str, prefix: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let rest = strip_container_prefix(line, prefix);
        let stripped = line.len() - rest.len();
        out.extend(std::iter::repeat_n(' ', stripped));
        out.push_str(rest);
    }
    out
}

/// Byte distance from the start of the line holding `offset`.
fn column_offset(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    offset - line_start
}

fn has_sentinel(value: &str) -> bool {
    value.contains(SENTINELS)
}

fn sentinel_runs(value: &str) -> Vec<Range<usize>> {
    let bytes = value.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if SENTINELS.iter().any(|s| *s as u8 == b) {
            let len = bytes[i..].iter().take_while(|x| **x == b).count();
            runs.push(i..i + len);
            i += len;
        } else {
            i += 1;
        }
    }
    runs
}

/// Inserts a block directive into the deepest block container holding it,
/// keeping siblings in source order.
///
/// A container left empty by masking (`> ::raw[x]`) may end before the
/// directive does, so a container also holds a directive starting on one
/// of its lines.
fn splice(nodes: &mut Vec<DocNode>, node: DocNode) {
    let Some(position) = node.position else {
        nodes.push(node);
        return;
    };
    let (start, end) = (position.start.offset, position.end.offset);

    if let Some(parent) = nodes.iter_mut().find(|child| {
        holds_blocks(&child.kind)
            && child.position.is_some_and(|p| {
                p.start.offset <= start
                    && (end <= p.end.offset || position.start.line <= p.end.line)
            })
    }) {
        splice(&mut parent.children, node);
        return;
    }

    let index = nodes
        .iter()
        .position(|child| child.position.is_some_and(|p| p.start.offset >= start))
        .unwrap_or(nodes.len());
    nodes.insert(index, node);
}

fn holds_blocks(kind: &DocKind) -> bool {
    matches!(
        kind,
        DocKind::Blockquote
            | DocKind::List { .. }
            | DocKind::ListItem { .. }
            | DocKind::Directive {
                shape: DirectiveShape::Container,
                ..
            }
    )
}

fn convert_align(align: &AlignKind) -> Align {
    match align {
        AlignKind::Left => Align::Left,
        AlignKind::Right => Align::Right,
        AlignKind::Center => Align::Center,
        AlignKind::None => Align::None,
    }
}
