//! Rich-text block model
//!
//! Bodies arrive as an ordered list of typed blocks. Each dispatch axis
//! (block kind, block style, list kind, mark) is a closed enum so the
//! renderer matches exhaustively; anything the store sends that is not in
//! the table is kept as an explicit `Unknown`/`Invalid` value rather than
//! silently disappearing during deserialization.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::model::{null_as_default, ImageRef};

/// A top-level rich-text block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Paragraph, heading, quote or list item
    Text(TextBlock),
    /// Embedded image
    Image(ImageRef),
    /// Fenced code
    Code(CodeBlock),
    /// A `_type` the renderer has no rule for
    Unknown { kind: String },
    /// A known `_type` whose payload did not match its shape
    Invalid { kind: String, error: String },
}

impl Block {
    /// Build a block from a raw JSON node, never failing
    pub fn from_value(value: Value) -> Self {
        let kind = value
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parsed = match kind.as_str() {
            "block" => serde_json::from_value(value).map(Block::Text),
            "image" => serde_json::from_value(value).map(Block::Image),
            "code" => serde_json::from_value(value).map(Block::Code),
            _ => return Block::Unknown { kind },
        };

        parsed.unwrap_or_else(|e| Block::Invalid {
            kind,
            error: e.to_string(),
        })
    }

    /// The `_type` tag this block was stored under
    pub fn kind(&self) -> &str {
        match self {
            Block::Text(_) => "block",
            Block::Image(_) => "image",
            Block::Code(_) => "code",
            Block::Unknown { kind } | Block::Invalid { kind, .. } => kind,
        }
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Block::from_value)
    }
}

/// A block of styled inline text
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub style: BlockStyle,
    #[serde(default)]
    pub list_item: Option<ListKind>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Inline>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    /// Concatenated text of all spans
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Inline::Span(span) => Some(span.text.as_str()),
                Inline::Other { .. } => None,
            })
            .collect()
    }

    /// Nesting depth for list items, starting at 1
    pub fn list_level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }
}

/// Paragraph-level style of a text block
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BlockStyle {
    #[default]
    Normal,
    Heading(u8),
    Blockquote,
    Other(String),
}

impl From<String> for BlockStyle {
    fn from(style: String) -> Self {
        match style.as_str() {
            "normal" | "" => BlockStyle::Normal,
            "blockquote" => BlockStyle::Blockquote,
            "h1" => BlockStyle::Heading(1),
            "h2" => BlockStyle::Heading(2),
            "h3" => BlockStyle::Heading(3),
            "h4" => BlockStyle::Heading(4),
            "h5" => BlockStyle::Heading(5),
            "h6" => BlockStyle::Heading(6),
            _ => BlockStyle::Other(style),
        }
    }
}

/// List flavour of a list-item block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ListKind {
    Bullet,
    Number,
    Other(String),
}

impl From<String> for ListKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "bullet" => ListKind::Bullet,
            "number" => ListKind::Number,
            _ => ListKind::Other(kind),
        }
    }
}

/// An inline child of a text block
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Span(Span),
    /// Inline object without a rendering rule
    Other { kind: String },
}

impl<'de> Deserialize<'de> for Inline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or("span")
            .to_string();
        if kind != "span" {
            return Ok(Inline::Other { kind });
        }
        serde_json::from_value(value)
            .map(Inline::Span)
            .map_err(serde::de::Error::custom)
    }
}

/// A run of text sharing the same marks
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Decorator names or keys into the block's `markDefs`
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

/// Annotation definition referenced by span marks
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// A resolved inline mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Strong,
    Em,
    Code,
    Underline,
    StrikeThrough,
    Link { href: String },
}

impl Mark {
    /// Resolve a span mark against the block's annotation table
    pub fn resolve(name: &str, defs: &[MarkDef]) -> Option<Mark> {
        match name {
            "strong" => Some(Mark::Strong),
            "em" => Some(Mark::Em),
            "code" => Some(Mark::Code),
            "underline" => Some(Mark::Underline),
            "strike-through" => Some(Mark::StrikeThrough),
            key => {
                let def = defs.iter().find(|d| d.key == key)?;
                match def.kind.as_str() {
                    "link" => def.href.clone().map(|href| Mark::Link { href }),
                    _ => None,
                }
            }
        }
    }
}

/// A fenced code block
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub code: Option<String>,
    /// Usually a string; some editors store `{ "value": "rust" }` instead
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl CodeBlock {
    /// The code body, if there is anything to show
    pub fn source(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Language tag, defaulting to `text`
    pub fn language(&self) -> &str {
        let tag = match &self.language {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Object(map)) => map
                .get("value")
                .or_else(|| map.get("name"))
                .and_then(Value::as_str),
            _ => None,
        };
        tag.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("text")
    }

    /// Filename heading, if set
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|f| !f.trim().is_empty())
    }
}

/// Plain text of a whole body, one line per text block
pub fn plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Text(text) => Some(text.plain_text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blocks(value: Value) -> Vec<Block> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_text_block() {
        let body = blocks(json!([{
            "_type": "block",
            "_key": "a1",
            "style": "h2",
            "children": [
                {"_type": "span", "text": "Hello ", "marks": []},
                {"_type": "span", "text": "world", "marks": ["strong", "lnk"]}
            ],
            "markDefs": [{"_key": "lnk", "_type": "link", "href": "https://example.com"}]
        }]));

        let Block::Text(text) = &body[0] else {
            panic!("expected text block");
        };
        assert_eq!(text.style, BlockStyle::Heading(2));
        assert_eq!(text.plain_text(), "Hello world");
        assert_eq!(
            Mark::resolve("lnk", &text.mark_defs),
            Some(Mark::Link {
                href: "https://example.com".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_and_invalid_blocks() {
        let body = blocks(json!([
            {"_type": "youtube", "url": "https://youtu.be/x"},
            {"_type": "block", "children": "not a list"},
            {"_type": "code", "code": "fn main() {}"}
        ]));
        assert_eq!(
            body[0],
            Block::Unknown {
                kind: "youtube".to_string()
            }
        );
        assert!(matches!(&body[1], Block::Invalid { kind, .. } if kind == "block"));
        assert_eq!(body[2].kind(), "code");
    }

    #[test]
    fn test_null_fields_normalize() {
        let body = blocks(json!([{
            "_type": "block",
            "style": null,
            "children": [{"_type": "span", "text": null, "marks": null}],
            "markDefs": null
        }]));
        let Block::Text(text) = &body[0] else {
            panic!("expected text block");
        };
        assert_eq!(text.style, BlockStyle::Normal);
        assert!(text.mark_defs.is_empty());
        assert_eq!(text.children.len(), 1);
    }

    #[test]
    fn test_code_language_fallbacks() {
        let plain: CodeBlock = serde_json::from_value(json!({"code": "x"})).unwrap();
        assert_eq!(plain.language(), "text");

        let nested: CodeBlock =
            serde_json::from_value(json!({"code": "x", "language": {"value": "rust"}})).unwrap();
        assert_eq!(nested.language(), "rust");

        let odd: CodeBlock =
            serde_json::from_value(json!({"code": "x", "language": 42})).unwrap();
        assert_eq!(odd.language(), "text");

        let blank: CodeBlock = serde_json::from_value(json!({"code": "   "})).unwrap();
        assert!(blank.source().is_none());
    }

    #[test]
    fn test_unresolved_marks() {
        assert_eq!(Mark::resolve("missing", &[]), None);
        let defs = vec![MarkDef {
            key: "c1".to_string(),
            kind: "comment".to_string(),
            href: None,
        }];
        assert_eq!(Mark::resolve("c1", &defs), None);
        assert_eq!(Mark::resolve("strike-through", &defs), Some(Mark::StrikeThrough));
    }

    #[test]
    fn test_plain_text_skips_objects() {
        let body = blocks(json!([
            {"_type": "block", "children": [{"_type": "span", "text": "one two"}]},
            {"_type": "image", "asset": {"_ref": "image-abc-10x10-png"}},
            {"_type": "block", "children": [{"_type": "span", "text": "three"}]}
        ]));
        assert_eq!(plain_text(&body), "one two three");
    }
}
