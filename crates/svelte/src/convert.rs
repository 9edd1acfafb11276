//! Document tree to markup tree conversion.
//!
//! Mirrors mdast-util-to-hast: block children of the root, lists, and
//! blockquotes are separated by `"\n"` text nodes, tight list items unwrap
//! their paragraphs, and literal HTML becomes [`MarkupNode::Raw`] for the
//! literal-markup expander. Kinds with an entry in [`Handlers`] are converted
//! by that handler instead.

use crate::markup::{Element, MarkupNode, PropertyValue};
use md2sv_core::{Align, DocKind, DocNode, Document, Md2svError, Stage};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;

/// Converts one document-tree node kind into markup.
pub trait NodeHandler: Send + Sync {
    /// Convert `node`. The node may be mutated; its children are not
    /// converted unless the handler asks `state` to.
    fn handle(
        &self,
        node: &mut DocNode,
        state: &mut State<'_>,
    ) -> Result<Vec<MarkupNode>, Md2svError>;
}

impl<F> NodeHandler for F
where
    F: Fn(&mut DocNode, &mut State<'_>) -> Result<Vec<MarkupNode>, Md2svError> + Send + Sync,
{
    fn handle(
        &self,
        node: &mut DocNode,
        state: &mut State<'_>,
    ) -> Result<Vec<MarkupNode>, Md2svError> {
        (self)(node, state)
    }
}

/// Handler table keyed by document-tree kind name (see [`DocKind::name`]).
#[derive(Default)]
pub struct Handlers {
    entries: HashMap<&'static str, Box<dyn NodeHandler>>,
}

impl Handlers {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn insert<H: NodeHandler + 'static>(&mut self, kind: &'static str, handler: H) {
        self.entries.insert(kind, Box::new(handler));
    }

    /// Handler registered for `kind`.
    pub fn get(&self, kind: &str) -> Option<&dyn NodeHandler> {
        self.entries.get(kind).map(|handler| handler.as_ref())
    }

    /// Whether a handler is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }
}

/// Converts document trees using a handler table.
#[derive(Default)]
pub struct Converter {
    handlers: Handlers,
}

impl Converter {
    /// Creates a converter with the given handlers.
    pub fn new(handlers: Handlers) -> Self {
        Self { handlers }
    }

    /// Handler table, for registering more handlers.
    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    /// Converts `root` into a markup root.
    pub fn convert(&self, root: &mut DocNode, document: &Document) -> Result<MarkupNode, Md2svError> {
        let mut state = State {
            document,
            handlers: &self.handlers,
            definitions: collect_definitions(root),
            list_loose: None,
        };
        let children = state.one(root)?;
        match <[MarkupNode; 1]>::try_from(children) {
            Ok([root @ MarkupNode::Root { .. }]) => Ok(root),
            Ok([node]) => Ok(MarkupNode::root(vec![node])),
            Err(children) => Ok(MarkupNode::root(children)),
        }
    }
}

#[derive(Debug, Clone)]
struct Definition {
    url: String,
    title: Option<String>,
}

fn collect_definitions(root: &DocNode) -> HashMap<String, Definition> {
    let mut definitions = HashMap::new();
    root.walk(&mut |node| {
        if let DocKind::Definition {
            identifier,
            url,
            title,
        } = &node.kind
        {
            // First definition wins.
            definitions
                .entry(identifier.clone())
                .or_insert_with(|| Definition {
                    url: url.clone(),
                    title: title.clone(),
                });
        }
    });
    definitions
}

/// Conversion state shared with handlers.
pub struct State<'a> {
    document: &'a Document,
    handlers: &'a Handlers,
    definitions: HashMap<String, Definition>,
    list_loose: Option<bool>,
}

impl<'a> State<'a> {
    /// Document being converted.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Converts every child of `parent`, in order.
    pub fn all(&mut self, parent: &mut DocNode) -> Result<Vec<MarkupNode>, Md2svError> {
        let mut values = Vec::with_capacity(parent.children.len());
        let mut after_break = false;
        for child in &mut parent.children {
            let mut result = self.one(child)?;
            if after_break && let Some(first) = result.first_mut() {
                trim_start_after_break(first);
            }
            after_break = child.kind == DocKind::Break;
            values.extend(result);
        }
        Ok(values)
    }

    /// Converts a single node.
    pub fn one(&mut self, node: &mut DocNode) -> Result<Vec<MarkupNode>, Md2svError> {
        let handlers = self.handlers;
        if let Some(handler) = handlers.get(node.kind.name()) {
            return handler.handle(node, self);
        }

        let position = node.position;
        match node.kind.clone() {
            DocKind::Root => {
                let children = self.all(node)?;
                Ok(vec![MarkupNode::root(wrap(children, false))])
            }
            DocKind::Paragraph => self.parent("p", node),
            DocKind::Heading { depth } => self.parent(&format!("h{depth}"), node),
            DocKind::ThematicBreak => Ok(vec![Element::new("hr").at(position).into()]),
            DocKind::Blockquote => {
                let children = wrap(self.all(node)?, true);
                Ok(vec![
                    Element::new("blockquote")
                        .with_children(children)
                        .at(position)
                        .into(),
                ])
            }
            DocKind::List {
                ordered,
                start,
                spread,
            } => self.list(node, ordered, start, spread),
            DocKind::ListItem { spread, checked } => self.list_item(node, spread, checked),
            DocKind::Code { value, lang, .. } => {
                let value = if value.is_empty() {
                    value
                } else {
                    value + "\n"
                };
                let mut code = Element::new("code").with_children(vec![MarkupNode::text(value)]);
                if let Some(lang) = lang.as_deref().and_then(|l| l.split_whitespace().next()) {
                    code.set_property("class", class_list(&[&format!("language-{lang}")]));
                }
                Ok(vec![
                    Element::new("pre")
                        .with_children(vec![code.into()])
                        .at(position)
                        .into(),
                ])
            }
            DocKind::Math { value } => {
                let code = Element::new("code")
                    .with_property("class", class_list(&["language-math", "math-display"]))
                    .with_children(vec![MarkupNode::text(value)]);
                Ok(vec![
                    Element::new("pre")
                        .with_children(vec![code.into()])
                        .at(position)
                        .into(),
                ])
            }
            DocKind::Html { value } => Ok(vec![MarkupNode::raw(value)]),
            DocKind::Definition { .. } => Ok(Vec::new()),
            DocKind::Text { value } => Ok(vec![MarkupNode::Text {
                value: trim_lines(&value),
                position,
            }]),
            DocKind::Emphasis => self.parent("em", node),
            DocKind::Strong => self.parent("strong", node),
            DocKind::Delete => self.parent("del", node),
            DocKind::InlineCode { value } => {
                let value = value.replace("\r\n", " ").replace(['\r', '\n'], " ");
                Ok(vec![
                    Element::new("code")
                        .with_children(vec![MarkupNode::text(value)])
                        .at(position)
                        .into(),
                ])
            }
            DocKind::InlineMath { value } => Ok(vec![
                Element::new("code")
                    .with_property("class", class_list(&["language-math", "math-inline"]))
                    .with_children(vec![MarkupNode::text(value)])
                    .at(position)
                    .into(),
            ]),
            DocKind::Break => Ok(vec![
                Element::new("br").at(position).into(),
                MarkupNode::text("\n"),
            ]),
            DocKind::Link { url, title } => {
                let children = self.all(node)?;
                Ok(vec![link(&url, title.as_deref(), children).at(position).into()])
            }
            DocKind::Image { url, alt, title } => {
                Ok(vec![image(&url, &alt, title.as_deref()).at(position).into()])
            }
            DocKind::LinkReference { identifier, label } => {
                let children = self.all(node)?;
                match self.definitions.get(&identifier) {
                    Some(definition) => Ok(vec![
                        link(&definition.url, definition.title.as_deref(), children)
                            .at(position)
                            .into(),
                    ]),
                    None => Ok(revert_reference(children, label.as_deref())),
                }
            }
            DocKind::ImageReference {
                identifier,
                alt,
                label,
            } => match self.definitions.get(&identifier) {
                Some(definition) => Ok(vec![
                    image(&definition.url, &alt, definition.title.as_deref())
                        .at(position)
                        .into(),
                ]),
                None => Ok(vec![MarkupNode::text(format!(
                    "![{alt}][{}]",
                    label.as_deref().unwrap_or(&identifier)
                ))]),
            },
            DocKind::Table { align } => self.table(node, &align),
            DocKind::TableRow => self.parent("tr", node),
            DocKind::TableCell => self.parent("td", node),
            DocKind::Directive { name, .. } => {
                log::debug!("Converting directive `{}` to a div", name);
                self.parent("div", node)
            }
            DocKind::RawTextDirective
            | DocKind::RawLeafDirective
            | DocKind::RawContainerDirective => {
                Err(Md2svError::unhandled(Stage::Convert, node.kind.name()))
            }
        }
    }

    fn parent(&mut self, tag: &str, node: &mut DocNode) -> Result<Vec<MarkupNode>, Md2svError> {
        let children = self.all(node)?;
        Ok(vec![
            Element::new(tag)
                .with_children(children)
                .at(node.position)
                .into(),
        ])
    }

    fn list(
        &mut self,
        node: &mut DocNode,
        ordered: bool,
        start: Option<u32>,
        spread: bool,
    ) -> Result<Vec<MarkupNode>, Md2svError> {
        let loose = spread || node.children.iter().any(list_item_loose);
        let saved = self.list_loose.replace(loose);
        let results = self.all(node);
        self.list_loose = saved;
        let results = results?;

        let mut element = Element::new(if ordered { "ol" } else { "ul" }).at(node.position);
        if let Some(start) = start
            && start != 1
        {
            element.set_property("start", start.to_string());
        }
        if results.iter().any(is_task_item) {
            element.set_property("class", class_list(&["contains-task-list"]));
        }
        element.children = wrap(results, true);
        Ok(vec![element.into()])
    }

    fn list_item(
        &mut self,
        node: &mut DocNode,
        spread: bool,
        checked: Option<bool>,
    ) -> Result<Vec<MarkupNode>, Md2svError> {
        let loose = self.list_loose.unwrap_or(spread);
        let mut results = self.all(node)?;
        let mut element = Element::new("li").at(node.position);

        if let Some(checked) = checked {
            if !results.first().is_some_and(is_paragraph) {
                results.insert(0, Element::new("p").into());
            }
            if let Some(MarkupNode::Element(paragraph)) = results.first_mut() {
                if !paragraph.children.is_empty() {
                    paragraph.children.insert(0, MarkupNode::text(" "));
                }
                let input = Element::new("input")
                    .with_property("type", "checkbox")
                    .with_property("checked", checked)
                    .with_property("disabled", true);
                paragraph.children.insert(0, input.into());
            }
            element.set_property("class", class_list(&["task-list-item"]));
        }

        let tail_is_paragraph = results.last().is_some_and(is_paragraph);
        let has_results = !results.is_empty();
        for (index, child) in results.into_iter().enumerate() {
            let child_is_paragraph = is_paragraph(&child);
            // Line endings go before nodes, except a tight first paragraph.
            if loose || index != 0 || !child_is_paragraph {
                element.children.push(MarkupNode::text("\n"));
            }
            match child {
                MarkupNode::Element(paragraph) if child_is_paragraph && !loose => {
                    element.children.extend(paragraph.children);
                }
                other => element.children.push(other),
            }
        }
        if has_results && (loose || !tail_is_paragraph) {
            element.children.push(MarkupNode::text("\n"));
        }

        Ok(vec![element.into()])
    }

    fn table(&mut self, node: &mut DocNode, align: &[Align]) -> Result<Vec<MarkupNode>, Md2svError> {
        let mut rows = Vec::with_capacity(node.children.len());
        for (index, row) in node.children.iter_mut().enumerate() {
            rows.push(self.table_row(row, index == 0, align)?);
        }

        let mut rows = rows.into_iter();
        let mut content = Vec::new();
        if let Some(head) = rows.next() {
            content.push(
                Element::new("thead")
                    .with_children(wrap(vec![head], true))
                    .into(),
            );
        }
        let body: Vec<MarkupNode> = rows.collect();
        if !body.is_empty() {
            content.push(Element::new("tbody").with_children(wrap(body, true)).into());
        }

        Ok(vec![
            Element::new("table")
                .with_children(wrap(content, true))
                .at(node.position)
                .into(),
        ])
    }

    fn table_row(
        &mut self,
        row: &mut DocNode,
        header: bool,
        align: &[Align],
    ) -> Result<MarkupNode, Md2svError> {
        let tag = if header { "th" } else { "td" };
        let length = if align.is_empty() {
            row.children.len()
        } else {
            align.len()
        };

        let mut cells = Vec::with_capacity(length);
        for index in 0..length {
            let mut cell = Element::new(tag);
            if let Some(value) = align.get(index).and_then(align_value) {
                cell.set_property("align", value);
            }
            if let Some(source) = row.children.get_mut(index) {
                cell.children = self.all(source)?;
                cell.position = source.position;
            }
            cells.push(cell.into());
        }

        Ok(Element::new("tr")
            .with_children(wrap(cells, true))
            .at(row.position)
            .into())
    }
}

/// Joins nodes with `"\n"` text nodes; loose also adds one at each end.
pub fn wrap(nodes: Vec<MarkupNode>, loose: bool) -> Vec<MarkupNode> {
    let mut result = Vec::with_capacity(nodes.len() * 2 + 1);
    if loose {
        result.push(MarkupNode::text("\n"));
    }
    let has_nodes = !nodes.is_empty();
    for (index, node) in nodes.into_iter().enumerate() {
        if index > 0 {
            result.push(MarkupNode::text("\n"));
        }
        result.push(node);
    }
    if loose && has_nodes {
        result.push(MarkupNode::text("\n"));
    }
    result
}

/// Removes spaces and tabs around line endings, keeping the line endings.
fn trim_lines(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut first = true;

    while let Some(index) = rest.find(['\r', '\n']) {
        let line = &rest[..index];
        let line = if first {
            line
        } else {
            line.trim_start_matches([' ', '\t'])
        };
        out.push_str(line.trim_end_matches([' ', '\t']));

        let eol = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
        out.push_str(&rest[index..index + eol]);
        rest = &rest[index + eol..];
        first = false;
    }

    out.push_str(if first {
        rest
    } else {
        rest.trim_start_matches([' ', '\t'])
    });
    out
}

fn trim_start_after_break(node: &mut MarkupNode) {
    let text = match node {
        MarkupNode::Text { value, .. } => Some(value),
        MarkupNode::Element(element) => match element.children.first_mut() {
            Some(MarkupNode::Text { value, .. }) => Some(value),
            _ => None,
        },
        _ => None,
    };
    if let Some(value) = text {
        let trimmed = value.trim_start_matches([' ', '\t']);
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
        }
    }
}

fn list_item_loose(node: &DocNode) -> bool {
    match node.kind {
        DocKind::ListItem { spread, .. } => spread,
        _ => node.children.len() > 1,
    }
}

fn is_paragraph(node: &MarkupNode) -> bool {
    node.as_element().is_some_and(|element| element.is("p"))
}

fn is_task_item(node: &MarkupNode) -> bool {
    node.as_element().is_some_and(|element| {
        element.is("li")
            && matches!(
                element.property("class"),
                Some(PropertyValue::List(classes)) if classes.iter().any(|c| c == "task-list-item")
            )
    })
}

fn class_list(classes: &[&str]) -> PropertyValue {
    PropertyValue::List(classes.iter().map(|c| c.to_string()).collect())
}

fn align_value(align: &Align) -> Option<&'static str> {
    match align {
        Align::Left => Some("left"),
        Align::Right => Some("right"),
        Align::Center => Some("center"),
        Align::None => None,
    }
}

fn link(url: &str, title: Option<&str>, children: Vec<MarkupNode>) -> Element {
    let mut element = Element::new("a").with_property("href", normalize_uri(url));
    if let Some(title) = title {
        element.set_property("title", title);
    }
    element.with_children(children)
}

fn image(url: &str, alt: &str, title: Option<&str>) -> Element {
    let mut element = Element::new("img")
        .with_property("src", normalize_uri(url))
        .with_property("alt", alt);
    if let Some(title) = title {
        element.set_property("title", title);
    }
    element
}

fn revert_reference(children: Vec<MarkupNode>, label: Option<&str>) -> Vec<MarkupNode> {
    let mut result = Vec::with_capacity(children.len() + 2);
    result.push(MarkupNode::text("["));
    result.extend(children);
    result.push(MarkupNode::text(match label {
        Some(label) => format!("][{label}]"),
        None => "]".to_string(),
    }));
    result
}

/// Characters kept as-is in URLs: alphanumerics and the safe punctuation.
const URI_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes characters that may not appear in a URL, leaving valid
/// `%XX` escapes alone.
fn normalize_uri(url: &str) -> String {
    let mut segments = url.split('%');
    let mut out = String::with_capacity(url.len());
    out.extend(utf8_percent_encode(segments.next().unwrap_or_default(), URI_SET));
    for segment in segments {
        let escaped = segment
            .as_bytes()
            .get(..2)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        out.push_str(if escaped { "%" } else { "%25" });
        out.extend(utf8_percent_encode(segment, URI_SET));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use md2sv_core::{ParseOptions, build_tree};

    fn convert(source: &str, options: ParseOptions) -> MarkupNode {
        let document = Document::parse(source).unwrap();
        let mut tree = build_tree(&document, &options).unwrap();
        Converter::default().convert(&mut tree, &document).unwrap()
    }

    fn tags(nodes: &[MarkupNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                MarkupNode::Element(element) => element.tag_name.clone(),
                MarkupNode::Text { value, .. } => format!("{value:?}"),
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[test]
    fn root_children_are_newline_separated() {
        let root = convert("# a\n\nb\n", ParseOptions::default());
        assert_eq!(tags(root.children()), vec!["h1", "\"\\n\"", "p"]);
    }

    #[test]
    fn tight_list_unwraps_paragraphs() {
        let root = convert("- a\n- b\n", ParseOptions::default());
        let list = root.children()[0].as_element().unwrap();
        assert_eq!(tags(&list.children), vec!["\"\\n\"", "li", "\"\\n\"", "li", "\"\\n\""]);
        assert_eq!(tags(list.children[1].children()), vec!["\"a\""]);
    }

    #[test]
    fn loose_list_keeps_paragraphs() {
        let root = convert("- a\n\n- b\n", ParseOptions::default());
        let list = root.children()[0].as_element().unwrap();
        assert_eq!(tags(list.children[1].children()), vec!["\"\\n\"", "p", "\"\\n\""]);
    }

    #[test]
    fn ordered_list_start_and_tasks() {
        let options = ParseOptions {
            gfm: true,
            ..ParseOptions::default()
        };
        let root = convert("3. [x] done\n", options);
        let list = root.children()[0].as_element().unwrap();
        assert_eq!(list.property("start"), Some(&"3".into()));
        assert_eq!(
            list.property("class"),
            Some(&PropertyValue::List(vec!["contains-task-list".into()]))
        );
        let item = list.children[1].as_element().unwrap();
        let input = item.children[0].as_element().unwrap();
        assert!(input.is("input"));
        assert_eq!(input.property("checked"), Some(&PropertyValue::Bool(true)));
        assert_eq!(item.children[1].text_value(), Some(" "));
    }

    #[test]
    fn code_blocks_get_language_class_and_newline() {
        let root = convert("```js meta\nlet x;\n```\n", ParseOptions::default());
        let pre = root.children()[0].as_element().unwrap();
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(
            code.property("class"),
            Some(&PropertyValue::List(vec!["language-js".into()]))
        );
        assert_eq!(code.children[0].text_value(), Some("let x;\n"));
    }

    #[test]
    fn html_becomes_raw() {
        let root = convert("<div>x</div>\n", ParseOptions::default());
        assert_eq!(root.children()[0], MarkupNode::raw("<div>x</div>"));
    }

    #[test]
    fn references_resolve_through_definitions() {
        let root = convert("[a][r]\n\n[r]: /url \"T\"\n", ParseOptions::default());
        let paragraph = root.children()[0].as_element().unwrap();
        let link = paragraph.children[0].as_element().unwrap();
        assert_eq!(link.property("href"), Some(&"/url".into()));
        assert_eq!(link.property("title"), Some(&"T".into()));
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn text_lines_are_trimmed_and_breaks_emit_newlines() {
        assert_eq!(trim_lines("a  \n  b"), "a\nb");
        assert_eq!(trim_lines("  a "), "  a ");
        let root = convert("a\\\nb", ParseOptions::default());
        let paragraph = root.children()[0].as_element().unwrap();
        assert_eq!(tags(&paragraph.children), vec!["\"a\"", "br", "\"\\n\"", "\"b\""]);
    }

    #[test]
    fn tables_follow_alignment() {
        let options = ParseOptions {
            gfm: true,
            ..ParseOptions::default()
        };
        let root = convert("| a | b |\n| :- | - |\n| 1 |\n", options);
        let table = root.children()[0].as_element().unwrap();
        assert_eq!(tags(&table.children), vec!["\"\\n\"", "thead", "\"\\n\"", "tbody", "\"\\n\""]);
        let tbody = table.children[3].as_element().unwrap();
        let row = tbody.children[1].as_element().unwrap();
        // Missing cells are filled in up to the column count.
        assert_eq!(tags(&row.children), vec!["\"\\n\"", "td", "\"\\n\"", "td", "\"\\n\""]);
        let first = row.children[1].as_element().unwrap();
        assert_eq!(first.property("align"), Some(&"left".into()));
    }

    #[test]
    fn other_directives_become_divs() {
        let root = convert("::note[hi]\n", ParseOptions::default());
        let div = root.children()[0].as_element().unwrap();
        assert!(div.is("div"));
        assert_eq!(div.children[0].text_value(), Some("hi"));
    }

    #[test]
    fn raw_kinds_without_handler_fail() {
        let document = Document::parse(":raw[x]").unwrap();
        let mut tree = DocNode::root(vec![DocNode::new(DocKind::RawTextDirective)]);
        let err = Converter::default()
            .convert(&mut tree, &document)
            .unwrap_err();
        assert!(matches!(
            err,
            Md2svError::UnhandledNode {
                stage: Stage::Convert,
                kind: "rawTextDirective"
            }
        ));
    }

    #[test]
    fn handlers_override_builtin_conversion() {
        let mut converter = Converter::default();
        converter.handlers_mut().insert(
            "thematicBreak",
            |_: &mut DocNode, _: &mut State<'_>| -> Result<Vec<MarkupNode>, Md2svError> {
                Ok(vec![MarkupNode::text("***")])
            },
        );
        let document = Document::parse("***").unwrap();
        let mut tree = build_tree(&document, &ParseOptions::default()).unwrap();
        let root = converter.convert(&mut tree, &document).unwrap();
        assert_eq!(root.children()[0].text_value(), Some("***"));
    }

    #[test]
    fn uris_are_percent_encoded() {
        assert_eq!(normalize_uri("/a b"), "/a%20b");
        assert_eq!(normalize_uri("/%20ok"), "/%20ok");
        assert_eq!(normalize_uri("/\u{e9}"), "/%C3%A9");
        assert_eq!(normalize_uri("100%"), "100%25");
        assert_eq!(normalize_uri("/%zz?q=[1]"), "/%25zz?q=%5B1%5D");
    }
}
