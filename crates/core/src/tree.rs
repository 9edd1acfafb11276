//! Document tree: the Markdown-structure tree the builder produces.
//!
//! Nodes mirror mdast closely, with three additions: directive nodes and the
//! three raw directive kinds a directive named `raw` is retagged into.

/// One place in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// Byte offset into the original source (0-indexed).
    pub offset: usize,
}

impl Point {
    /// Creates a point.
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// Span of a node in the original source text. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// First character of the node.
    pub start: Point,
    /// Just past the last character of the node.
    pub end: Point,
}

impl Position {
    /// Creates a position from two points.
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Which syntax a directive was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveShape {
    /// `:name[label]` inside running text.
    Inline,
    /// `::name[label]` alone on a line.
    Leaf,
    /// `:::name` ... `:::` fenced block.
    Container,
}

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// No explicit alignment.
    None,
    /// `:--`
    Left,
    /// `--:`
    Right,
    /// `:-:`
    Center,
}

/// Node kinds of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DocKind {
    /// Document root.
    Root,
    /// Paragraph.
    Paragraph,
    /// ATX or setext heading.
    Heading {
        /// Rank, 1 to 6.
        depth: u8,
    },
    /// `***`
    ThematicBreak,
    /// `> quote`
    Blockquote,
    /// Ordered or bullet list.
    List {
        /// Ordered (`1.`) rather than bullet.
        ordered: bool,
        /// Start number of an ordered list.
        start: Option<u32>,
        /// Blank lines between items.
        spread: bool,
    },
    /// One list item.
    ListItem {
        /// Blank lines between direct children.
        spread: bool,
        /// GFM task state.
        checked: Option<bool>,
    },
    /// Fenced or indented code block.
    Code {
        /// Code text, without the fences.
        value: String,
        /// Info string language.
        lang: Option<String>,
        /// Rest of the info string.
        meta: Option<String>,
    },
    /// `$$` math block.
    Math {
        /// Math text.
        value: String,
    },
    /// Literal HTML, kept as written.
    Html {
        /// HTML text.
        value: String,
    },
    /// Link reference definition.
    Definition {
        /// Normalized label.
        identifier: String,
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Plain text.
    Text {
        /// Text after markdown unescaping.
        value: String,
    },
    /// `*emphasis*`
    Emphasis,
    /// `**strong**`
    Strong,
    /// `~~delete~~`
    Delete,
    /// `` `code` ``
    InlineCode {
        /// Code text.
        value: String,
    },
    /// `$math$`
    InlineMath {
        /// Math text.
        value: String,
    },
    /// Hard line break.
    Break,
    /// `[text](url)`
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
    },
    /// `![alt](url)`
    Image {
        /// Destination.
        url: String,
        /// Alternative text.
        alt: String,
        /// Optional title.
        title: Option<String>,
    },
    /// `[text][label]`
    LinkReference {
        /// Normalized label.
        identifier: String,
        /// Label as written, used when the reference cannot be resolved.
        label: Option<String>,
    },
    /// `![alt][label]`
    ImageReference {
        /// Normalized label.
        identifier: String,
        /// Alternative text.
        alt: String,
        /// Label as written.
        label: Option<String>,
    },
    /// GFM table.
    Table {
        /// Alignment per column.
        align: Vec<Align>,
    },
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// A directive of any name.
    Directive {
        /// Directive identifier.
        name: String,
        /// Syntax the directive was written with.
        shape: DirectiveShape,
    },
    /// `:raw[...]`, retagged by the raw reclassifier.
    RawTextDirective,
    /// `::raw[...]`, retagged by the raw reclassifier.
    RawLeafDirective,
    /// `:::raw` container, retagged by the raw reclassifier.
    RawContainerDirective,
}

impl DocKind {
    /// Stable kind name, mdast style.
    pub fn name(&self) -> &'static str {
        match self {
            DocKind::Root => "root",
            DocKind::Paragraph => "paragraph",
            DocKind::Heading { .. } => "heading",
            DocKind::ThematicBreak => "thematicBreak",
            DocKind::Blockquote => "blockquote",
            DocKind::List { .. } => "list",
            DocKind::ListItem { .. } => "listItem",
            DocKind::Code { .. } => "code",
            DocKind::Math { .. } => "math",
            DocKind::Html { .. } => "html",
            DocKind::Definition { .. } => "definition",
            DocKind::Text { .. } => "text",
            DocKind::Emphasis => "emphasis",
            DocKind::Strong => "strong",
            DocKind::Delete => "delete",
            DocKind::InlineCode { .. } => "inlineCode",
            DocKind::InlineMath { .. } => "inlineMath",
            DocKind::Break => "break",
            DocKind::Link { .. } => "link",
            DocKind::Image { .. } => "image",
            DocKind::LinkReference { .. } => "linkReference",
            DocKind::ImageReference { .. } => "imageReference",
            DocKind::Table { .. } => "table",
            DocKind::TableRow => "tableRow",
            DocKind::TableCell => "tableCell",
            DocKind::Directive { shape, .. } => match shape {
                DirectiveShape::Inline => "textDirective",
                DirectiveShape::Leaf => "leafDirective",
                DirectiveShape::Container => "containerDirective",
            },
            DocKind::RawTextDirective => "rawTextDirective",
            DocKind::RawLeafDirective => "rawLeafDirective",
            DocKind::RawContainerDirective => "rawContainerDirective",
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DocNode {
    /// What the node is.
    pub kind: DocKind,
    /// Ordered children, owned by this node.
    pub children: Vec<DocNode>,
    /// Where the node sits in the original source.
    pub position: Option<Position>,
}

impl DocNode {
    /// Creates a childless node without position.
    pub fn new(kind: DocKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            position: None,
        }
    }

    /// Creates a node with children.
    pub fn with_children(kind: DocKind, children: Vec<DocNode>) -> Self {
        Self {
            kind,
            children,
            position: None,
        }
    }

    /// Creates a root node.
    pub fn root(children: Vec<DocNode>) -> Self {
        Self::with_children(DocKind::Root, children)
    }

    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(DocKind::Text {
            value: value.into(),
        })
    }

    /// Sets the position.
    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Returns the literal value of value-carrying kinds.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            DocKind::Text { value }
            | DocKind::Html { value }
            | DocKind::Code { value, .. }
            | DocKind::Math { value }
            | DocKind::InlineCode { value }
            | DocKind::InlineMath { value } => Some(value),
            _ => None,
        }
    }

    /// Directive name, for directive nodes that have not been reclassified.
    pub fn directive_name(&self) -> Option<&str> {
        match &self.kind {
            DocKind::Directive { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Visits this node and all descendants, parents before children.
    pub fn walk(&self, visit: &mut impl FnMut(&DocNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Mutable pre-order traversal. Children are visited after `visit`
    /// returns, so a visitor may retag a node before its subtree is seen.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut DocNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}
