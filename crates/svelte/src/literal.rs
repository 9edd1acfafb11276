//! Literal-markup expansion.
//!
//! Raw nodes from Markdown hold HTML fragments, often unbalanced: an inline
//! `<i>` and its `</i>` arrive as separate siblings with text between them.
//! Each sibling list is tokenized and reassembled so that open tags adopt the
//! following siblings until their end tag. Passthrough nodes are carried
//! along untouched.
//!
//! The assembler balances tags but does not apply HTML's implied-end-tag
//! rules. Tag name case is kept and self-closing non-void tags stay
//! self-closing, so Svelte components come out as written.

use crate::markup::{Element, MarkupNode, PropertyValue};

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed",
];

/// Elements whose raw text content still decodes character references.
const ESCAPABLE_RAW_TEXT_ELEMENTS: [&str; 2] = ["textarea", "title"];

/// One lexical unit of an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="value">` or `<name />`
    StartTag {
        /// Tag name as written.
        name: String,
        /// Attributes in source order.
        attributes: Vec<(String, PropertyValue)>,
        /// Ends in `/>`.
        self_closing: bool,
    },
    /// `</name>`
    EndTag {
        /// Tag name as written.
        name: String,
    },
    /// Text with character references decoded.
    Text(String),
    /// `<!--...-->` or a bogus comment.
    Comment(String),
    /// `<!doctype ...>`
    Doctype,
}

/// Splits an HTML fragment into tokens.
pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut tokens, rest);
            break;
        };
        push_text(&mut tokens, &rest[..lt]);
        let markup = &rest[lt..];

        match read_markup(markup) {
            Some((token, consumed)) => {
                let raw_text = match &token {
                    Token::StartTag {
                        name, self_closing, ..
                    } if !self_closing => RAW_TEXT_ELEMENTS
                        .iter()
                        .find(|tag| tag.eq_ignore_ascii_case(name))
                        .copied(),
                    _ => None,
                };
                tokens.push(token);
                rest = &markup[consumed..];

                if let Some(tag) = raw_text {
                    let end = find_end_tag(rest, tag).unwrap_or(rest.len());
                    let content = &rest[..end];
                    if !content.is_empty() {
                        let text = if ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&tag) {
                            html_escape::decode_html_entities(content).into_owned()
                        } else {
                            content.to_string()
                        };
                        tokens.push(Token::Text(text));
                    }
                    rest = &rest[end..];
                }
            }
            None => {
                push_text(&mut tokens, "<");
                rest = &markup[1..];
            }
        }
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(text);
    match tokens.last_mut() {
        Some(Token::Text(previous)) => previous.push_str(&decoded),
        _ => tokens.push(Token::Text(decoded.into_owned())),
    }
}

/// Reads the construct starting at `<`, returning the token and the number
/// of bytes consumed. `None` means the `<` is plain text.
fn read_markup(input: &str) -> Option<(Token, usize)> {
    let after = &input[1..];

    if let Some(body) = after.strip_prefix("!--") {
        let (value, consumed) = match body.find("-->") {
            Some(end) => (&body[..end], 4 + end + 3),
            None => (body, input.len()),
        };
        return Some((Token::Comment(value.to_string()), consumed));
    }

    if after.starts_with('!') || after.starts_with('?') {
        let end = after.find('>').map(|i| i + 2).unwrap_or(input.len());
        let inner = input[2..end].trim_end_matches('>');
        if inner
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype"))
        {
            return Some((Token::Doctype, end));
        }
        return Some((Token::Comment(inner.to_string()), end));
    }

    if let Some(body) = after.strip_prefix('/') {
        if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let name_len = body
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(body.len());
        let end = body.find('>')?;
        return Some((
            Token::EndTag {
                name: body[..name_len].to_string(),
            },
            2 + end + 1,
        ));
    }

    if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    read_start_tag(input)
}

fn read_start_tag(input: &str) -> Option<(Token, usize)> {
    let bytes = input.as_bytes();
    let mut i = 1;
    while i < bytes.len() && !is_tag_delimiter(bytes[i]) {
        i += 1;
    }
    let name = input[1..i].to_string();
    let mut attributes: Vec<(String, PropertyValue)> = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => {
                return Some((
                    Token::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    i + 1,
                ));
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some((
                    Token::StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    },
                    i + 2,
                ));
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && !is_tag_delimiter(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        // A lone `=` still names an attribute.
        if i == name_start {
            i += 1;
        }
        let attribute = input[name_start..i].to_string();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            push_attribute(&mut attributes, attribute, PropertyValue::Bool(true));
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = match *bytes.get(j)? {
            quote @ (b'"' | b'\'') => {
                let start = j + 1;
                let len = input[start..].find(quote as char)?;
                i = start + len + 1;
                &input[start..start + len]
            }
            _ => {
                let start = j;
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
                i = j;
                &input[start..j]
            }
        };
        let value = html_escape::decode_html_entities(value).into_owned();
        push_attribute(&mut attributes, attribute, PropertyValue::String(value));
    }
}

fn is_tag_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

/// Duplicate attributes keep the first value.
fn push_attribute(attributes: &mut Vec<(String, PropertyValue)>, name: String, value: PropertyValue) {
    if !attributes.iter().any(|(existing, _)| *existing == name) {
        attributes.push((name, value));
    }
}

/// Byte offset of `</tag` (ASCII case-insensitive) in `input`.
fn find_end_tag(input: &str, tag: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut from = 0;
    while let Some(found) = input[from..].find("</") {
        let start = from + found;
        let name_end = start + 2 + tag.len();
        if bytes.len() >= name_end
            && bytes[start + 2..name_end].eq_ignore_ascii_case(tag.as_bytes())
            && bytes
                .get(name_end)
                .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
        {
            return Some(start);
        }
        from = start + 2;
    }
    None
}

/// Builds a forest from tokens and ready nodes, balancing tags.
#[derive(Default)]
struct Assembler {
    out: Vec<MarkupNode>,
    stack: Vec<Element>,
}

impl Assembler {
    fn push(&mut self, node: MarkupNode) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(node),
            None => self.out.push(node),
        }
    }

    fn token(&mut self, token: Token) {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut element = Element::new(name);
                element.properties = attributes;
                element.self_closing = self_closing;
                if self_closing || element.is_void() {
                    self.push(element.into());
                } else {
                    self.stack.push(element);
                }
            }
            Token::EndTag { name } => self.close(&name),
            Token::Text(value) => match self.last_text() {
                Some(previous) => previous.push_str(&value),
                None => self.push(MarkupNode::text(value)),
            },
            Token::Comment(value) => self.push(MarkupNode::Comment { value }),
            Token::Doctype => self.push(MarkupNode::Doctype),
        }
    }

    fn last_text(&mut self) -> Option<&mut String> {
        let siblings = match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.out,
        };
        match siblings.last_mut() {
            Some(MarkupNode::Text { value, .. }) => Some(value),
            _ => None,
        }
    }

    fn close(&mut self, name: &str) {
        let Some(index) = self.stack.iter().rposition(|open| open.is(name)) else {
            log::debug!("Ignoring end tag without open element: </{}>", name);
            return;
        };
        while self.stack.len() > index {
            if let Some(element) = self.stack.pop() {
                self.push(element.into());
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while let Some(element) = self.stack.pop() {
            self.push(element.into());
        }
        self.out
    }
}

/// Expands raw HTML fragments throughout the tree.
pub fn expand(root: &mut MarkupNode) {
    if let Some(children) = root.children_mut() {
        expand_children(children);
    }
}

fn expand_children(children: &mut Vec<MarkupNode>) {
    if !children.iter().any(needs_assembly) {
        for child in children.iter_mut() {
            expand(child);
        }
        return;
    }

    let mut assembler = Assembler::default();
    for child in std::mem::take(children) {
        match child {
            MarkupNode::Raw { value } => {
                for token in tokenize(&value) {
                    assembler.token(token);
                }
            }
            mut other => {
                expand(&mut other);
                assembler.push(other);
            }
        }
    }
    *children = assembler.finish();
}

fn needs_assembly(node: &MarkupNode) -> bool {
    matches!(node, MarkupNode::Raw { .. })
}

/// Parses a standalone HTML fragment into markup nodes.
pub fn parse_fragment(html: &str) -> Vec<MarkupNode> {
    let mut assembler = Assembler::default();
    for token in tokenize(html) {
        assembler.token(token);
    }
    assembler.finish()
}
