//! Curly brace escaping for Svelte.
//!
//! Svelte reads `{...}` in markup as an expression, so braces in ordinary
//! text are rewritten as the string-literal expressions `{'{'}` and `{'}'}`.

use crate::markup::MarkupNode;
use std::borrow::Cow;

/// Elements whose text is never escaped.
const VERBATIM_PARENTS: [&str; 2] = ["style", "svg"];

/// Escapes `{` and `}` in `input`, borrowing when there is nothing to do.
pub fn escape_braces(input: &str) -> Cow<'_, str> {
    if !input.contains(['{', '}']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '{' => out.push_str("{'{'}"),
            '}' => out.push_str("{'}'}"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escapes every text node except those whose nearest element ancestor is
/// `style` or `svg`. Raw and passthrough nodes are not text and stay as
/// they are.
pub fn escape_tree(root: &mut MarkupNode) {
    escape_node(root, false);
}

fn escape_node(node: &mut MarkupNode, verbatim: bool) {
    match node {
        MarkupNode::Text { value, .. } if !verbatim => {
            let escaped = match escape_braces(value) {
                Cow::Owned(escaped) => Some(escaped),
                Cow::Borrowed(_) => None,
            };
            if let Some(escaped) = escaped {
                *value = escaped;
            }
        }
        MarkupNode::Element(element) => {
            let verbatim = VERBATIM_PARENTS.iter().any(|tag| element.is(tag));
            for child in &mut element.children {
                escape_node(child, verbatim);
            }
        }
        MarkupNode::Root { children } => {
            for child in children {
                escape_node(child, verbatim);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Element, Passthrough};

    #[test]
    fn escapes_each_brace() {
        assert_eq!(escape_braces("{test}"), "{'{'}test{'}'}");
        assert_eq!(escape_braces("{}"), "{'{'}{'}'}");
        assert_eq!(escape_braces("}{"), "{'}'}{'{'}");
    }

    #[test]
    fn borrows_when_nothing_to_escape() {
        assert!(matches!(escape_braces("plain text"), Cow::Borrowed(_)));
        assert!(matches!(escape_braces(""), Cow::Borrowed(_)));
    }

    #[test]
    fn consecutive_calls_are_independent() {
        // Each call scans its own input from the start.
        assert_eq!(escape_braces("a{"), "a{'{'}");
        assert_eq!(escape_braces("{b"), "{'{'}b");
        assert_eq!(escape_braces("c"), "c");
    }

    #[test]
    fn skips_style_and_svg_text() {
        let mut root = MarkupNode::root(vec![
            Element::new("style")
                .with_children(vec![MarkupNode::text("p { color: red; }")])
                .into(),
            Element::new("SVG")
                .with_children(vec![MarkupNode::text("{x}")])
                .into(),
            Element::new("p")
                .with_children(vec![MarkupNode::text("{y}")])
                .into(),
            MarkupNode::text("{z}"),
        ]);
        escape_tree(&mut root);
        let texts: Vec<_> = root
            .children()
            .iter()
            .map(|node| match node {
                MarkupNode::Element(element) => element.children[0].text_value().unwrap().to_string(),
                other => other.text_value().unwrap().to_string(),
            })
            .collect();
        assert_eq!(
            texts,
            vec!["p { color: red; }", "{x}", "{'{'}y{'}'}", "{'{'}z{'}'}"]
        );
    }

    #[test]
    fn nearest_element_decides() {
        let mut root = MarkupNode::root(vec![
            Element::new("svg")
                .with_children(vec![
                    Element::new("text")
                        .with_children(vec![MarkupNode::text("{a}")])
                        .into(),
                ])
                .into(),
        ]);
        escape_tree(&mut root);
        let inner = root.children()[0].children()[0].children()[0].text_value();
        assert_eq!(inner, Some("{'{'}a{'}'}"));
    }

    #[test]
    fn leaves_raw_and_passthrough_alone() {
        let mut root = MarkupNode::root(vec![
            MarkupNode::raw("<b>{x}</b>"),
            MarkupNode::Passthrough(Passthrough::new("{y}".into())),
        ]);
        let before = root.clone();
        escape_tree(&mut root);
        assert_eq!(root, before);
    }
}
