//! Leading YAML metadata block.
//!
//! A document may open with a block fenced by `---` lines. Its YAML is read
//! into an ordered JSON object; everything after the closing fence is the
//! Markdown body.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

const BOM: char = '\u{feff}';
const FENCE: &str = "---";

/// Metadata mapping and where the Markdown body starts.
#[derive(Debug, Default)]
pub struct FrontmatterExtraction {
    /// Metadata, keys in source order. Empty without a block.
    pub value: Map<String, JsonValue>,
    /// Byte offset of the body in the original text.
    pub body_start: usize,
}

/// Reasons a metadata block cannot be read.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// The block is not valid YAML.
    #[error("Invalid frontmatter YAML: {0}")]
    Parse(String),
    /// The YAML is valid but is not a key/value mapping.
    #[error("Frontmatter must be a key/value mapping")]
    InvalidRootType,
}

/// Splits the metadata block off `input`.
///
/// The opening fence must be the very first line (a BOM may precede it).
/// Without one the whole text is body and the mapping is empty. A `---`
/// with no closing fence is left alone as a thematic break.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    let offset = if input.starts_with(BOM) {
        BOM.len_utf8()
    } else {
        0
    };
    let mut lines = input[offset..].split_inclusive('\n');

    let Some(opener) = lines.next() else {
        return Ok(FrontmatterExtraction::default());
    };
    let yaml_start = offset + opener.len();
    if !is_fence(opener) || yaml_start == input.len() {
        return Ok(FrontmatterExtraction::default());
    }

    let mut cursor = yaml_start;
    for line in lines {
        if is_fence(line) {
            let value = read_mapping(&input[yaml_start..cursor])?;
            return Ok(FrontmatterExtraction {
                value,
                body_start: cursor + line.len(),
            });
        }
        cursor += line.len();
    }
    Ok(FrontmatterExtraction::default())
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == FENCE
}

fn read_mapping(yaml: &str) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::Parse(e.to_string()))?;
    match serde_json::to_value(parsed).map_err(|e| FrontmatterError::Parse(e.to_string()))? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Map::new()),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> (Map<String, JsonValue>, &str) {
        let extraction = extract_frontmatter(input).unwrap();
        (extraction.value, &input[extraction.body_start..])
    }

    #[test]
    fn text_without_a_block_is_all_body() {
        let (metadata, body) = split("# Title\nBody");
        assert!(metadata.is_empty());
        assert_eq!(body, "# Title\nBody");
    }

    #[test]
    fn reads_nested_yaml() {
        let (metadata, body) = split("---\ntitle: Example\ntags:\n  - rust\n  - svelte\n---\n# Content");
        assert_eq!(metadata["title"], "Example");
        assert_eq!(metadata["tags"], serde_json::json!(["rust", "svelte"]));
        assert_eq!(body, "# Content");
    }

    #[test]
    fn keys_stay_in_source_order() {
        let (metadata, body) = split("---\nzeta: 1\nalpha: 2\nmid: 3\n---\n");
        let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(body, "");
    }

    #[test]
    fn empty_and_null_blocks_give_an_empty_mapping() {
        assert_eq!(split("---\n---\n# Body"), (Map::new(), "# Body"));
        assert_eq!(split("---\n~\n---\nx"), (Map::new(), "x"));
    }

    #[test]
    fn bom_and_crlf_are_accepted() {
        let (metadata, body) = split("\u{feff}---\r\nfoo: bar\r\n---\r\nBody");
        assert_eq!(metadata["foo"], "bar");
        assert_eq!(body, "Body");
    }

    #[test]
    fn block_must_open_the_document() {
        let input = "\n---\nfoo: bar\n---\nBody";
        assert_eq!(split(input), (Map::new(), input));
        assert_eq!(split("---"), (Map::new(), "---"));
    }

    #[test]
    fn unclosed_fence_is_body() {
        let input = "---\ntitle: test\n";
        assert_eq!(split(input), (Map::new(), input));
    }

    #[test]
    fn rejects_bad_blocks() {
        assert!(matches!(
            extract_frontmatter("---\ninvalid: [unterminated\n---\n"),
            Err(FrontmatterError::Parse(_))
        ));
        assert!(matches!(
            extract_frontmatter("---\n- a\n- b\n---\n"),
            Err(FrontmatterError::InvalidRootType)
        ));
    }
}
