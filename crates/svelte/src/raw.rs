//! Raw directives: `:raw[...]`, `::raw[...]` and `:::raw` blocks carry
//! literal Svelte markup from the source straight to the output.
//!
//! The flow is reclassify (document tree), slice the source in the converter
//! handlers, carry the text as an opaque [`Passthrough`] through escaping and
//! literal-markup expansion, then [`finalize`] into verbatim raw nodes.

use crate::convert::{Handlers, State};
use crate::markup::{MarkupNode, Passthrough};
use md2sv_core::{
    DirectiveShape, DocKind, DocNode, Document, Md2svError, Stage, container_prefix_len,
    parse_directive_closer, strip_container_prefix,
};

/// Directive name reserved for literal passthrough.
pub const RAW_DIRECTIVE: &str = "raw";

const INLINE_PREFIX: &str = ":raw[";
const LEAF_PREFIX: &str = "::raw[";

/// Retags every directive named `raw` into its raw kind.
///
/// Positions and children are left alone.
pub fn reclassify(root: &mut DocNode) {
    root.walk_mut(&mut |node| {
        if let DocKind::Directive { name, shape } = &node.kind
            && name == RAW_DIRECTIVE
        {
            let kind = match shape {
                DirectiveShape::Inline => DocKind::RawTextDirective,
                DirectiveShape::Leaf => DocKind::RawLeafDirective,
                DirectiveShape::Container => DocKind::RawContainerDirective,
            };
            node.kind = kind;
        }
    });
}

/// Handler table with the three raw handlers registered.
pub fn raw_handlers() -> Handlers {
    let mut handlers = Handlers::new();
    handlers.insert(DocKind::RawTextDirective.name(), handle_raw_text);
    handlers.insert(DocKind::RawLeafDirective.name(), handle_raw_leaf);
    handlers.insert(DocKind::RawContainerDirective.name(), handle_raw_container);
    handlers
}

fn handle_raw_text(
    node: &mut DocNode,
    state: &mut State<'_>,
) -> Result<Vec<MarkupNode>, Md2svError> {
    let value = raw_text(node, state.document())?;
    node.children.clear();
    Ok(vec![MarkupNode::Passthrough(Passthrough::new(value))])
}

fn handle_raw_leaf(
    node: &mut DocNode,
    state: &mut State<'_>,
) -> Result<Vec<MarkupNode>, Md2svError> {
    let value = raw_leaf(node, state.document())?;
    node.children.clear();
    Ok(vec![MarkupNode::Passthrough(Passthrough::new(value))])
}

fn handle_raw_container(
    node: &mut DocNode,
    state: &mut State<'_>,
) -> Result<Vec<MarkupNode>, Md2svError> {
    let value = raw_container(node, state.document())?;
    node.children.clear();
    Ok(vec![MarkupNode::Passthrough(Passthrough::new(value))])
}

/// Literal label of `:raw[...]`.
pub fn raw_text(node: &DocNode, document: &Document) -> Result<String, Md2svError> {
    slice_label(node, document, INLINE_PREFIX.len())
}

/// Literal label of `::raw[...]`.
pub fn raw_leaf(node: &DocNode, document: &Document) -> Result<String, Md2svError> {
    slice_label(node, document, LEAF_PREFIX.len())
}

/// Literal body of a `:::raw` block: the lines strictly between the opening
/// and closing fence lines, joined with `\n`.
///
/// A block that was never closed ends on a content line, which is kept.
/// Inside a blockquote or list item, the container prefix the opener sits
/// behind is stripped from every body line.
pub fn raw_container(node: &DocNode, document: &Document) -> Result<String, Md2svError> {
    let malformed = || {
        Md2svError::malformed_position(Stage::Convert, node.kind.name(), node.position.as_ref())
    };
    let position = node.position.ok_or_else(malformed)?;
    let (open_line, close_line) = (position.start.line, position.end.line);
    if close_line < open_line {
        return Err(malformed());
    }

    let prefix = document
        .line_start(open_line)
        .and_then(|start| position.start.offset.checked_sub(start))
        .ok_or_else(malformed)?;
    let opener = document.line(open_line).ok_or_else(malformed)?;
    let last = document.line(close_line).ok_or_else(malformed)?;
    let closed = close_line > open_line && closes(opener, last);
    let end = if closed { close_line } else { close_line + 1 };
    let start = (open_line + 1).min(end);

    let mut lines = Vec::with_capacity(end - start);
    for line in start..end {
        let line = document.line(line).ok_or_else(malformed)?;
        lines.push(strip_container_prefix(line, prefix));
    }
    Ok(lines.join("\n"))
}

fn closes(opener: &str, line: &str) -> bool {
    let opener = &opener[container_prefix_len(opener)..];
    let opener_colons = opener.trim_start().bytes().take_while(|b| *b == b':').count();
    parse_directive_closer(&line[container_prefix_len(line)..])
        .is_some_and(|(colons, _)| colons >= opener_colons)
}

fn slice_label(node: &DocNode, document: &Document, prefix: usize) -> Result<String, Md2svError> {
    let malformed = || {
        Md2svError::malformed_position(Stage::Convert, node.kind.name(), node.position.as_ref())
    };
    let position = node.position.ok_or_else(malformed)?;
    let start = position.start.offset + prefix;
    let end = position.end.offset.checked_sub(1).ok_or_else(malformed)?;
    if start > end {
        return Err(malformed());
    }
    document
        .slice(start..end)
        .map(str::to_string)
        .ok_or_else(malformed)
}

/// Turns every passthrough node into a raw node with the same text.
pub fn finalize(root: &mut MarkupNode) {
    root.walk_mut(&mut |node| {
        if let MarkupNode::Passthrough(passthrough) = node {
            let value = std::mem::replace(passthrough, Passthrough::new(String::new())).into_value();
            *node = MarkupNode::Raw { value };
        }
    });
}
