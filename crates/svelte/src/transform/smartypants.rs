//! Smart punctuation transformations (smart quotes, dashes, ellipsis).

use crate::raw::RAW_DIRECTIVE;
use md2sv_core::{DocKind, DocNode, DocTransform, Document};
use std::iter::Peekable;
use std::str::Chars;

/// Document transform applying smartypants-style replacements to text.
///
/// `--` becomes an em dash; other hyphen runs are kept. Code, math, literal
/// HTML and raw directives are left alone. Quote direction looks back across
/// inline siblings, so `"**a**"` closes properly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Smartypants;

impl DocTransform for Smartypants {
    fn transform(&self, root: &mut DocNode, _document: &Document) {
        let mut previous = None;
        smarten(root, &mut previous);
    }
}

fn smarten(node: &mut DocNode, previous: &mut Option<char>) {
    match &mut node.kind {
        DocKind::Text { value } => {
            if let Some(replaced) = apply_smartypants(value, *previous) {
                *value = replaced;
            }
            if let Some(last) = value.chars().last() {
                *previous = Some(last);
            }
            return;
        }
        DocKind::InlineCode { value } | DocKind::InlineMath { value } => {
            *previous = value.chars().last().or(*previous);
            return;
        }
        DocKind::Break => {
            *previous = Some('\n');
            return;
        }
        DocKind::RawTextDirective
        | DocKind::RawLeafDirective
        | DocKind::RawContainerDirective
        | DocKind::Code { .. }
        | DocKind::Math { .. }
        | DocKind::Html { .. } => return,
        DocKind::Directive { name, .. } if *name == RAW_DIRECTIVE => return,
        _ => {}
    }

    let block = matches!(
        node.kind,
        DocKind::Root
            | DocKind::Paragraph
            | DocKind::Heading { .. }
            | DocKind::TableCell
            | DocKind::Blockquote
            | DocKind::List { .. }
            | DocKind::ListItem { .. }
            | DocKind::Directive { .. }
    );
    if block {
        *previous = None;
    }
    for child in &mut node.children {
        smarten(child, previous);
    }
    if block {
        *previous = None;
    }
}

/// Applies smartypants-style replacements to plain text. `previous` is the
/// character before `input`, used to decide quote direction.
///
/// Returns `None` when nothing changed.
pub fn apply_smartypants(input: &str, previous: Option<char>) -> Option<String> {
    if !input.contains(['"', '\'', '-']) && !input.contains("...") {
        return None;
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let before = out.chars().last().or(previous);
        replace_punctuation(c, before, &mut chars, &mut out);
    }

    (out != input).then_some(out)
}

/// Replaces ASCII punctuation with smart Unicode equivalents.
fn replace_punctuation(
    c: char,
    before: Option<char>,
    chars: &mut Peekable<Chars<'_>>,
    out: &mut String,
) {
    let is_opening = before
        .is_none_or(|c| c.is_whitespace() || "([{\u{201c}\u{2018}\u{2013}\u{2014}".contains(c));

    match c {
        '-' => {
            let mut run = 1;
            while chars.next_if_eq(&'-').is_some() {
                run += 1;
            }
            match run {
                2 => out.push('\u{2014}'),
                _ => out.extend(std::iter::repeat_n('-', run)),
            }
        }
        '.' => match chars.peek() {
            Some('.') => {
                if let Some('.') = chars.clone().nth(1) {
                    chars.next();
                    chars.next();
                    out.push('\u{2026}');
                } else {
                    out.push('.');
                }
            }
            _ => out.push('.'),
        },
        '"' => out.push(if is_opening { '\u{201c}' } else { '\u{201d}' }),
        '\'' => out.push(if is_opening { '\u{2018}' } else { '\u{2019}' }),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use md2sv_core::{ParseOptions, build_tree};

    fn smarten_source(source: &str) -> DocNode {
        let document = Document::from_body(source);
        let mut root = build_tree(&document, &ParseOptions::default()).unwrap();
        Smartypants.transform(&mut root, &document);
        root
    }

    fn texts(root: &DocNode) -> Vec<String> {
        let mut out = Vec::new();
        root.walk(&mut |node| {
            if let DocKind::Text { value } = &node.kind {
                out.push(value.clone());
            }
        });
        out
    }

    #[test]
    fn transforms_basic_punctuation() {
        let input = "Hello -- \"world\" ... and 'quote' --- end";
        assert_eq!(
            apply_smartypants(input, None).unwrap(),
            "Hello \u{2014} \u{201c}world\u{201d} \u{2026} and \u{2018}quote\u{2019} --- end"
        );
    }

    #[test]
    fn unchanged_text_is_none() {
        assert_eq!(apply_smartypants("plain text", None), None);
        assert_eq!(apply_smartypants("a-b", None), None);
    }

    #[test]
    fn quotes_look_across_inline_nodes() {
        let root = smarten_source("\"**bold**\" and it's");
        assert_eq!(
            texts(&root),
            vec!["\u{201c}", "bold", "\u{201d} and it\u{2019}s"]
        );
    }

    #[test]
    fn skips_code_and_raw_directives() {
        let root = smarten_source("`--` and :raw[\"x\"] -- ok\n\n```\n\"---\"\n```\n");
        let mut code = Vec::new();
        root.walk(&mut |node| match &node.kind {
            DocKind::InlineCode { value } | DocKind::Code { value, .. } => code.push(value.clone()),
            _ => {}
        });
        assert_eq!(code, vec!["--", "\"---\""]);
        let raw_label: Vec<_> = texts(&root).into_iter().filter(|t| t.contains('x')).collect();
        assert_eq!(raw_label, vec!["\"x\""]);
        assert!(texts(&root).iter().any(|t| t.contains("\u{2014} ok")));
    }

    #[test]
    fn each_paragraph_starts_fresh() {
        let root = smarten_source("end.\n\n\"start\"");
        assert_eq!(texts(&root)[1], "\u{201c}start\u{201d}");
    }
}
