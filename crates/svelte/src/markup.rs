//! Markup tree: the HTML-shaped tree the document tree is converted into.

use md2sv_core::Position;

/// Value of an element property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain string value, written as `name="value"`.
    String(String),
    /// Boolean attribute, written as `name` when true and omitted when false.
    Bool(bool),
    /// Space-separated tokens such as `class`.
    List(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// An element with tag name, properties, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name as written. Matching is ASCII case-insensitive.
    pub tag_name: String,
    /// Properties in source order.
    pub properties: Vec<(String, PropertyValue)>,
    /// Ordered children.
    pub children: Vec<MarkupNode>,
    /// Where the element came from, when it came from Markdown.
    pub position: Option<Position>,
    /// Written as `<tag />`. Only honoured for non-void elements.
    pub self_closing: bool,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Vec::new(),
            children: Vec::new(),
            position: None,
            self_closing: false,
        }
    }

    /// Sets the children.
    pub fn with_children(mut self, children: Vec<MarkupNode>) -> Self {
        self.children = children;
        self
    }

    /// Adds or replaces a property.
    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Sets the position.
    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Adds or replaces a property, keeping its original place.
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Whether the tag name equals `tag`, ignoring ASCII case.
    pub fn is(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether the element never has content (`<br>`, `<img>`, ...).
    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag_name)
    }
}

/// Literal source text carried from a raw directive to the output.
///
/// Its value can only be produced and consumed inside this crate, so no
/// transform between conversion and finalization can alter it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    value: String,
}

impl Passthrough {
    pub(crate) fn new(value: String) -> Self {
        Self { value }
    }

    pub(crate) fn into_value(self) -> String {
        self.value
    }
}

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// Tree root.
    Root {
        /// Top-level nodes.
        children: Vec<MarkupNode>,
    },
    /// Element.
    Element(Element),
    /// Text, escaped on output.
    Text {
        /// Text content.
        value: String,
        /// Where the text came from.
        position: Option<Position>,
    },
    /// `<!--value-->`
    Comment {
        /// Comment content.
        value: String,
    },
    /// `<!doctype html>`
    Doctype,
    /// Literal markup. Before expansion these are HTML fragments from the
    /// source; after finalization, raw directive text. Written verbatim.
    Raw {
        /// Markup text.
        value: String,
    },
    /// Raw directive text between conversion and finalization.
    Passthrough(Passthrough),
}

impl MarkupNode {
    /// Creates a root.
    pub fn root(children: Vec<MarkupNode>) -> Self {
        MarkupNode::Root { children }
    }

    /// Creates a text node without position.
    pub fn text(value: impl Into<String>) -> Self {
        MarkupNode::Text {
            value: value.into(),
            position: None,
        }
    }

    /// Creates a raw node.
    pub fn raw(value: impl Into<String>) -> Self {
        MarkupNode::Raw {
            value: value.into(),
        }
    }

    /// Stable kind name, hast style.
    pub fn kind(&self) -> &'static str {
        match self {
            MarkupNode::Root { .. } => "root",
            MarkupNode::Element(_) => "element",
            MarkupNode::Text { .. } => "text",
            MarkupNode::Comment { .. } => "comment",
            MarkupNode::Doctype => "doctype",
            MarkupNode::Raw { .. } => "raw",
            MarkupNode::Passthrough(_) => "passthrough",
        }
    }

    /// Children of roots and elements.
    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Root { children } => children,
            MarkupNode::Element(element) => &element.children,
            _ => &[],
        }
    }

    /// Mutable children of roots and elements.
    pub fn children_mut(&mut self) -> Option<&mut Vec<MarkupNode>> {
        match self {
            MarkupNode::Root { children } => Some(children),
            MarkupNode::Element(element) => Some(&mut element.children),
            _ => None,
        }
    }

    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text value of text nodes.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            MarkupNode::Text { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Mutable pre-order traversal. Children are visited after `visit`
    /// returns, so a visitor may replace a node before its subtree is seen.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut MarkupNode)) {
        visit(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }
}

impl From<Element> for MarkupNode {
    fn from(element: Element) -> Self {
        MarkupNode::Element(element)
    }
}

/// Elements without content or end tag.
pub fn is_void_element(tag_name: &str) -> bool {
    const VOID: [&str; 14] = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    VOID.iter().any(|tag| tag.eq_ignore_ascii_case(tag_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_property_replaces_in_place() {
        let mut element = Element::new("a")
            .with_property("href", "/x")
            .with_property("title", "t");
        element.set_property("href", "/y");
        assert_eq!(element.properties[0], ("href".into(), "/y".into()));
        assert_eq!(element.properties.len(), 2);
    }

    #[test]
    fn tag_matching_ignores_case() {
        let element = Element::new("SCRIPT");
        assert!(element.is("script"));
        assert!(is_void_element("BR"));
        assert!(!is_void_element("MyComponent"));
    }

    #[test]
    fn walk_mut_sees_replacements_first() {
        let mut tree = MarkupNode::root(vec![
            Element::new("p")
                .with_children(vec![MarkupNode::text("a")])
                .into(),
        ]);
        let mut kinds = Vec::new();
        tree.walk_mut(&mut |node| {
            kinds.push(node.kind());
            if let MarkupNode::Element(element) = node
                && element.is("p")
            {
                element.children.clear();
            }
        });
        assert_eq!(kinds, vec!["root", "element"]);
    }
}
