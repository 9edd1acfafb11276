//! Directive scanning.
//!
//! markdown-rs has no directive construct, so directives are located with a
//! line scanner before the Markdown pass:
//!
//! ```text
//! :name[label]        inline, anywhere in running text
//! ::name[label]       leaf, alone on its line
//! :::name[label]      container opener, alone on its line
//! ...
//! :::                 container closer (at least as many colons)
//! ```
//!
//! Block directives may sit behind blockquote (`>`) and list item markers.
//! Lines inside fenced code are never scanned. Spans are reported as byte
//! ranges of the original source; directives inside a container body are
//! nested under that container.

use crate::code_fence::{FencePhase, FenceState, advance_fence_state, leading_whitespace_info};
use crate::tree::DirectiveShape;
use std::ops::Range;

/// A directive found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSpan {
    /// Directive identifier.
    pub name: String,
    /// Syntax the directive was written with.
    pub shape: DirectiveShape,
    /// Whole construct. Inline and leaf: first colon through `]` (or the
    /// name when there is no label). Container: first colon of the opener
    /// through the last colon of the closer, or the end of the scanned region
    /// when the container is never closed.
    pub range: Range<usize>,
    /// Text between the label brackets.
    pub label: Option<Range<usize>>,
    /// Container body: from the start of the line after the opener to the
    /// start of the closer line.
    pub body: Option<Range<usize>>,
    /// Directives found inside a container body.
    pub nested: Vec<DirectiveSpan>,
}

impl DirectiveSpan {
    fn new(name: &str, shape: DirectiveShape, range: Range<usize>) -> Self {
        Self {
            name: name.to_string(),
            shape,
            range,
            label: None,
            body: None,
            nested: Vec::new(),
        }
    }

    /// Whether this span is a block construct (leaf or container).
    pub fn is_block(&self) -> bool {
        !matches!(self.shape, DirectiveShape::Inline)
    }
}

/// Parsed block-level directive line, offsets relative to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Number of leading colons (2 for leaf, 3+ for container).
    pub colons: usize,
    /// Directive identifier.
    pub name: String,
    /// Byte offset of the first colon.
    pub start: usize,
    /// Byte offset just past the directive (before trailing whitespace).
    pub end: usize,
    /// Text between the label brackets.
    pub label: Option<Range<usize>>,
}

/// Parse a line holding a leaf (`::name[label]`) or container opener
/// (`:::name[label]`).
///
/// Returns `None` if the line is anything else, including indented code.
pub fn parse_opening_directive(line: &str) -> Option<DirectiveOpening> {
    let (visual_indent, start) = leading_whitespace_info(line);
    if visual_indent > 3 {
        return None;
    }

    let bytes = line.as_bytes();
    let colons = bytes[start..].iter().take_while(|b| **b == b':').count();
    if colons < 2 {
        return None;
    }

    let name_start = start + colons;
    let name_len = directive_name_len(&line[name_start..]);
    if name_len == 0 {
        return None;
    }
    let mut end = name_start + name_len;

    let mut label = None;
    if bytes.get(end) == Some(&b'[') {
        let close = find_label_end(line, end)?;
        label = Some(end + 1..close);
        end = close + 1;
    }

    if !line[end..].chars().all(char::is_whitespace) {
        return None;
    }

    Some(DirectiveOpening {
        colons,
        name: line[name_start..name_start + name_len].to_string(),
        start,
        end,
        label,
    })
}

/// Check if a line is a container closer (`:::` or longer), returning the
/// colon count and the offset just past the last colon.
pub fn parse_directive_closer(line: &str) -> Option<(usize, usize)> {
    let (visual_indent, start) = leading_whitespace_info(line);
    if visual_indent > 3 {
        return None;
    }
    let colons = line.as_bytes()[start..]
        .iter()
        .take_while(|b| **b == b':')
        .count();
    if colons < 3 || !line[start + colons..].chars().all(char::is_whitespace) {
        return None;
    }
    Some((colons, start + colons))
}

/// Byte length of the blockquote markers (`>`) and list item markers
/// (`-`, `*`, `+`, `1.`, `1)`) that open `line`, each with one following
/// space.
pub fn container_prefix_len(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut end = 0;
    loop {
        let (visual_indent, indent) = leading_whitespace_info(&line[end..]);
        if visual_indent > 3 {
            return end;
        }
        let at = end + indent;
        let marker = match bytes.get(at) {
            Some(b'>') => 1,
            Some(b'-' | b'*' | b'+') => 1,
            Some(b) if b.is_ascii_digit() => {
                let digits = bytes[at..].iter().take_while(|b| b.is_ascii_digit()).count();
                match bytes.get(at + digits) {
                    Some(b'.' | b')') if digits <= 9 => digits + 1,
                    _ => return end,
                }
            }
            _ => return end,
        };
        let spaced = matches!(bytes.get(at + marker), Some(b' ' | b'\t'));
        if bytes[at] == b'>' {
            end = at + marker + usize::from(spaced);
        } else if spaced {
            end = at + marker + 1;
        } else {
            return end;
        }
    }
}

/// Strips the container prefix a directive's continuation line repeats:
/// up to `width` leading bytes of whitespace and `>` markers.
pub fn strip_container_prefix(line: &str, width: usize) -> &str {
    let len = line
        .bytes()
        .take(width)
        .take_while(|b| matches!(*b, b' ' | b'\t' | b'>'))
        .count();
    &line[len..]
}

/// Length of a directive name at the start of `s`: an ASCII letter followed by
/// letters, digits, `-` or `_`. Zero when there is no name.
fn directive_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-' || **b == b'_')
        .count()
}

/// Finds the `]` matching the `[` at `open`, honouring nesting and
/// backslash escapes. The label must close on the same line.
fn find_label_end(line: &str, open: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'\n' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Finds inline directives (`:name[label]`) in one line of running text.
///
/// Code spans and backslash escapes are skipped. A colon directly after
/// another colon, or directly before one, never starts a directive. Offsets
/// are shifted by `base`.
pub fn scan_inline(line: &str, base: usize) -> Vec<DirectiveSpan> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
                i = match find_backtick_run(bytes, i + run, run) {
                    Some(close) => close + run,
                    None => i + run,
                };
            }
            b':' if (i == 0 || bytes[i - 1] != b':') && bytes.get(i + 1) != Some(&b':') => {
                let name_len = directive_name_len(&line[i + 1..]);
                let open = i + 1 + name_len;
                if name_len > 0
                    && bytes.get(open) == Some(&b'[')
                    && let Some(close) = find_label_end(line, open)
                {
                    let mut span = DirectiveSpan::new(
                        &line[i + 1..open],
                        DirectiveShape::Inline,
                        base + i..base + close + 1,
                    );
                    span.label = Some(base + open + 1..base + close);
                    spans.push(span);
                    i = close + 1;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    spans
}

fn find_backtick_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

struct OpenContainer {
    span: DirectiveSpan,
    colons: usize,
    body_start: usize,
}

/// Scans `region` of `source` for directives.
///
/// `region` must start at a line boundary. Top-level spans are returned in
/// source order; container bodies carry their own nested spans.
pub fn scan_directives(source: &str, region: Range<usize>) -> Vec<DirectiveSpan> {
    let mut fence_state = FenceState::default();
    let mut fence_prefix = 0;
    let mut stack: Vec<OpenContainer> = Vec::new();
    let mut out: Vec<DirectiveSpan> = Vec::new();

    let text = &source[region.clone()];
    let mut line_start = region.start;
    for raw_line in text.split_inclusive('\n') {
        let next_start = line_start + raw_line.len();
        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);

        // Inside a fence only the fence's own container prefix is structure.
        let prefix = match fence_state.phase {
            FencePhase::Outside => container_prefix_len(line),
            FencePhase::InsideFence => container_prefix_len(line).min(fence_prefix),
        };
        let content = &line[prefix..];

        let fence_outcome = advance_fence_state(content, fence_state);
        if fence_state.phase == FencePhase::Outside {
            fence_prefix = prefix;
        }
        fence_state = fence_outcome.next_state;
        if fence_outcome.is_code {
            line_start = next_start;
            continue;
        }

        let content_start = line_start + prefix;
        if let Some((colons, end)) = parse_directive_closer(content)
            && stack.last().is_some_and(|open| colons >= open.colons)
            && let Some(mut open) = stack.pop()
        {
            open.span.range.end = content_start + end;
            open.span.body = Some(open.body_start..line_start);
            push_span(&mut stack, &mut out, open.span);
        } else if let Some(opening) = parse_opening_directive(content) {
            let shape = if opening.colons == 2 {
                DirectiveShape::Leaf
            } else {
                DirectiveShape::Container
            };
            let mut span = DirectiveSpan::new(
                &opening.name,
                shape,
                content_start + opening.start..content_start + opening.end,
            );
            span.label = opening
                .label
                .map(|label| content_start + label.start..content_start + label.end);

            if opening.colons == 2 {
                push_span(&mut stack, &mut out, span);
            } else {
                stack.push(OpenContainer {
                    span,
                    colons: opening.colons,
                    body_start: next_start,
                });
            }
        } else {
            for span in scan_inline(line, line_start) {
                push_span(&mut stack, &mut out, span);
            }
        }

        line_start = next_start;
    }

    // Unclosed containers run to the end of the region.
    let region_end = trim_trailing_newline(source, region);
    while let Some(mut open) = stack.pop() {
        open.span.range.end = region_end.max(open.span.range.end);
        open.span.body = Some(open.body_start.min(region_end)..region_end);
        push_span(&mut stack, &mut out, open.span);
    }

    out
}

fn push_span(stack: &mut [OpenContainer], out: &mut Vec<DirectiveSpan>, span: DirectiveSpan) {
    match stack.last_mut() {
        Some(parent) => parent.span.nested.push(span),
        None => out.push(span),
    }
}

fn trim_trailing_newline(source: &str, region: Range<usize>) -> usize {
    let text = &source[region.clone()];
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    region.start + trimmed.len()
}
