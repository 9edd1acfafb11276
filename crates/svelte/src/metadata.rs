//! Metadata injection into the module script.

use crate::markup::{Element, MarkupNode, PropertyValue};
use md2sv_core::Md2svError;
use serde_json::{Map, Value};

/// Words that cannot be bound with `export const { ... }`.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Builds the module script statements for `metadata`.
///
/// The mapping is exported whole as `metadata`; keys that are valid
/// identifiers are also exported as individual bindings.
pub fn metadata_fragment(metadata: &Map<String, Value>) -> Result<String, Md2svError> {
    let json = serde_json::to_string(metadata)?.replace("</", "<\\/");
    let mut fragment = format!("export const metadata = {};\n", json);

    let bindings: Vec<&str> = metadata
        .keys()
        .map(String::as_str)
        .filter(|key| {
            let bindable = is_bindable(key);
            if !bindable {
                log::warn!("Metadata key {:?} is not a valid identifier, not exported", key);
            }
            bindable
        })
        .collect();
    if !bindings.is_empty() {
        fragment.push_str(&format!(
            "export const {{ {} }} = metadata;\n",
            bindings.join(", ")
        ));
    }

    Ok(fragment)
}

fn is_bindable(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&key)
}

/// Adds the metadata exports to the root's `<script context="module">`,
/// creating the script as the first root child when there is none.
///
/// An empty mapping leaves the tree untouched.
pub fn inject_metadata(
    root: &mut MarkupNode,
    metadata: &Map<String, Value>,
) -> Result<(), Md2svError> {
    if metadata.is_empty() {
        return Ok(());
    }
    let code = format!("\n{}", metadata_fragment(metadata)?);

    let Some(children) = root.children_mut() else {
        return Ok(());
    };

    let script = children.iter_mut().find_map(|node| match node {
        MarkupNode::Element(element) if is_module_script_element(element) => Some(element),
        _ => None,
    });

    match script {
        Some(script) => {
            let text = script.children.iter_mut().find_map(|child| match child {
                MarkupNode::Text { value, .. } => Some(value),
                _ => None,
            });
            match text {
                Some(value) => value.push_str(&code),
                None => script.children.push(MarkupNode::text(code)),
            }
        }
        None => {
            let script = Element::new("script")
                .with_property("context", "module")
                .with_children(vec![MarkupNode::text(code)]);
            children.insert(0, script.into());
        }
    }

    Ok(())
}

fn is_module_script_element(element: &Element) -> bool {
    element.is("script")
        && matches!(
            element.property("context"),
            Some(PropertyValue::String(context)) if context == "module"
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn script_text(root: &MarkupNode) -> &str {
        root.children()[0].children()[0].text_value().unwrap()
    }

    #[test]
    fn fragment_keeps_insertion_order() {
        let metadata = mapping(json!({ "title": "Hi", "abc": 1 }));
        assert_eq!(
            metadata_fragment(&metadata).unwrap(),
            "export const metadata = {\"title\":\"Hi\",\"abc\":1};\nexport const { title, abc } = metadata;\n"
        );
    }

    #[test]
    fn unbindable_keys_are_only_in_the_object() {
        let metadata = mapping(json!({ "my-key": 1, "class": 2, "ok": 3 }));
        let fragment = metadata_fragment(&metadata).unwrap();
        assert!(fragment.ends_with("export const { ok } = metadata;\n"));

        let metadata = mapping(json!({ "1st": true }));
        assert_eq!(
            metadata_fragment(&metadata).unwrap(),
            "export const metadata = {\"1st\":true};\n"
        );
    }

    #[test]
    fn closing_script_tag_in_values_is_broken_up() {
        let metadata = mapping(json!({ "x": "</script>" }));
        assert!(metadata_fragment(&metadata).unwrap().contains(r#""<\/script>""#));
    }

    #[test]
    fn empty_mapping_is_a_no_op() {
        let mut root = MarkupNode::root(vec![MarkupNode::text("x")]);
        let before = root.clone();
        inject_metadata(&mut root, &Map::new()).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn creates_the_module_script_first() {
        let mut root = MarkupNode::root(vec![Element::new("p").into()]);
        inject_metadata(&mut root, &mapping(json!({ "abc": "def" }))).unwrap();
        assert_eq!(root.children().len(), 2);
        assert!(
            root.children()[0]
                .as_element()
                .is_some_and(is_module_script_element)
        );
        assert_eq!(
            script_text(&root),
            "\nexport const metadata = {\"abc\":\"def\"};\nexport const { abc } = metadata;\n"
        );
    }

    #[test]
    fn appends_to_an_existing_module_script() {
        let mut root = MarkupNode::root(vec![
            Element::new("script").into(),
            Element::new("script")
                .with_property("context", "module")
                .with_children(vec![MarkupNode::text("\nconst x = 42;\n")])
                .into(),
        ]);
        inject_metadata(&mut root, &mapping(json!({ "a": 1 }))).unwrap();
        assert_eq!(root.children().len(), 2);
        let module = &root.children()[1];
        assert_eq!(
            module.children()[0].text_value(),
            Some("\nconst x = 42;\n\nexport const metadata = {\"a\":1};\nexport const { a } = metadata;\n")
        );
        assert!(root.children()[0].children().is_empty());
    }

    #[test]
    fn fills_an_empty_module_script() {
        let mut root = MarkupNode::root(vec![
            Element::new("script")
                .with_property("context", "module")
                .into(),
        ]);
        inject_metadata(&mut root, &mapping(json!({ "a": 1 }))).unwrap();
        assert!(script_text(&root).starts_with("\nexport const metadata"));
    }
}
