//! Markup tree serialization.

use crate::markup::{Element, MarkupNode, PropertyValue};
use md2sv_core::{Md2svError, Stage};

/// Elements whose text children are written without escaping.
const RAW_TEXT_PARENTS: [&str; 2] = ["script", "style"];

/// Renders the markup tree as Svelte component text.
///
/// Fails on passthrough nodes, which must be finalized first.
pub fn to_html(root: &MarkupNode) -> Result<String, Md2svError> {
    let mut out = String::new();
    write_node(root, false, &mut out)?;
    Ok(out)
}

fn write_node(node: &MarkupNode, raw_text: bool, out: &mut String) -> Result<(), Md2svError> {
    match node {
        MarkupNode::Root { children } => {
            for child in children {
                write_node(child, raw_text, out)?;
            }
        }
        MarkupNode::Element(element) => write_element(element, out)?,
        MarkupNode::Text { value, .. } if raw_text => out.push_str(value),
        MarkupNode::Text { value, .. } => {
            html_escape::encode_text_minimal_to_string(value, out);
        }
        MarkupNode::Comment { value } => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        MarkupNode::Doctype => out.push_str("<!doctype html>"),
        MarkupNode::Raw { value } => out.push_str(value),
        MarkupNode::Passthrough(_) => {
            return Err(Md2svError::unhandled(Stage::Serialize, node.kind()));
        }
    }
    Ok(())
}

fn write_element(element: &Element, out: &mut String) -> Result<(), Md2svError> {
    out.push('<');
    out.push_str(&element.tag_name);
    for (name, value) in &element.properties {
        match value {
            PropertyValue::Bool(false) => {}
            PropertyValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropertyValue::String(value) => write_attribute(name, value, out),
            PropertyValue::List(tokens) => write_attribute(name, &tokens.join(" "), out),
        }
    }

    if element.is_void() {
        out.push('>');
        return Ok(());
    }
    if element.self_closing && element.children.is_empty() {
        out.push_str(" />");
        return Ok(());
    }
    out.push('>');

    let raw_text = RAW_TEXT_PARENTS.iter().any(|tag| element.is(tag));
    for child in &element.children {
        write_node(child, raw_text, out)?;
    }

    out.push_str("</");
    out.push_str(&element.tag_name);
    out.push('>');
    Ok(())
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_attribute(value, out);
    out.push('"');
}

/// Escapes `&` and `"` only; `<` and `>` stay readable in attribute values.
fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Passthrough;

    #[test]
    fn escapes_text_minimally() {
        let root = MarkupNode::root(vec![
            Element::new("code")
                .with_children(vec![MarkupNode::text("<html> & \"x\"")])
                .into(),
        ]);
        assert_eq!(to_html(&root).unwrap(), "<code>&lt;html> &amp; \"x\"</code>");
    }

    #[test]
    fn writes_attributes() {
        let element = Element::new("input")
            .with_property("type", "checkbox")
            .with_property("checked", true)
            .with_property("disabled", false)
            .with_property("title", "a \"b\" & c");
        let mut code = Element::new("code");
        code.set_property(
            "class",
            PropertyValue::List(vec!["language-math".into(), "math-inline".into()]),
        );
        let root = MarkupNode::root(vec![element.into(), code.into()]);
        assert_eq!(
            to_html(&root).unwrap(),
            "<input type=\"checkbox\" checked title=\"a &quot;b&quot; &amp; c\"><code class=\"language-math math-inline\"></code>"
        );
    }

    #[test]
    fn script_and_style_text_is_verbatim() {
        let root = MarkupNode::root(vec![
            Element::new("script")
                .with_children(vec![MarkupNode::text("if (a < b && c) {}")])
                .into(),
            Element::new("style")
                .with_children(vec![MarkupNode::text("p > a {}")])
                .into(),
        ]);
        assert_eq!(
            to_html(&root).unwrap(),
            "<script>if (a < b && c) {}</script><style>p > a {}</style>"
        );
    }

    #[test]
    fn void_and_self_closing_elements() {
        let mut component = Element::new("Counter").with_property("start", "{1}");
        component.self_closing = true;
        let mut br = Element::new("br");
        br.self_closing = true;
        let root = MarkupNode::root(vec![component.into(), br.into(), Element::new("hr").into()]);
        assert_eq!(to_html(&root).unwrap(), "<Counter start=\"{1}\" /><br><hr>");
    }

    #[test]
    fn comments_doctype_and_raw() {
        let root = MarkupNode::root(vec![
            MarkupNode::Doctype,
            MarkupNode::Comment { value: " c ".into() },
            MarkupNode::raw("{#if x}<b>&</b>{/if}"),
        ]);
        assert_eq!(
            to_html(&root).unwrap(),
            "<!doctype html><!-- c -->{#if x}<b>&</b>{/if}"
        );
    }

    #[test]
    fn passthrough_is_rejected() {
        let root = MarkupNode::root(vec![MarkupNode::Passthrough(Passthrough::new("x".into()))]);
        let err = to_html(&root).unwrap_err();
        assert!(matches!(
            err,
            Md2svError::UnhandledNode {
                stage: Stage::Serialize,
                kind: "passthrough"
            }
        ));
    }
}
