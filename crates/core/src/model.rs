//! Document model for structured rich-text content.
//!
//! Documents arrive from the content store as a flat JSON array of typed
//! nodes. Paragraphs, headings, quotes and list items are all `_type: "block"`;
//! list membership is carried by `listItem` and `level` rather than by nesting.

use crate::asset::AssetRef;
use crate::error::{AssetError, NodePath, RenderDiagnostics, RenderError, RenderWarning};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Block-level presentation tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockStyle {
    /// Plain paragraph.
    #[default]
    Normal,
    /// Level 1 heading.
    H1,
    /// Level 2 heading.
    H2,
    /// Level 3 heading.
    H3,
    /// Level 4 heading.
    H4,
    /// Level 5 heading.
    H5,
    /// Level 6 heading.
    H6,
    /// Block quotation.
    Blockquote,
    /// Any style this crate does not know.
    Other(String),
}

impl BlockStyle {
    /// Parses a style tag, accepting the long spellings `heading-N` and `quote`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "normal" => Self::Normal,
            "h1" | "heading-1" => Self::H1,
            "h2" | "heading-2" => Self::H2,
            "h3" | "heading-3" => Self::H3,
            "h4" | "heading-4" => Self::H4,
            "h5" | "heading-5" => Self::H5,
            "h6" | "heading-6" => Self::H6,
            "blockquote" | "quote" => Self::Blockquote,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "normal",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Blockquote => "blockquote",
            Self::Other(tag) => tag,
        }
    }

    /// Returns the heading depth (1-6) for heading styles.
    pub fn heading_depth(&self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }
}

impl From<String> for BlockStyle {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<&str> for BlockStyle {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl From<BlockStyle> for String {
    fn from(style: BlockStyle) -> Self {
        style.as_str().to_string()
    }
}

impl std::fmt::Display for BlockStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List container type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListKind {
    /// Unordered list.
    Bullet,
    /// Ordered list.
    Number,
    /// Any list type this crate does not know.
    Other(String),
}

impl ListKind {
    /// Parses a list tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bullet" => Self::Bullet,
            "number" => Self::Number,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bullet => "bullet",
            Self::Number => "number",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ListKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<&str> for ListKind {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl From<ListKind> for String {
    fn from(kind: ListKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An annotation definition, referenced from span marks by `_key`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkDef {
    /// Key that spans use to reference this annotation.
    #[serde(rename = "_key")]
    pub key: String,
    /// Annotation type (e.g. "link").
    #[serde(rename = "_type")]
    pub kind: String,
    /// Remaining payload fields (e.g. `href`).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MarkDef {
    /// Returns a string field from the payload.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns the link target, if this annotation carries one.
    pub fn href(&self) -> Option<&str> {
        self.field_str("href")
    }
}

/// An inline run of text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Span {
    /// Stable identifier.
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// Text content; a span without text is malformed.
    #[serde(default)]
    pub text: Option<String>,
    /// Decorator names and annotation keys.
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

impl Span {
    /// Creates a span with the given text and marks.
    pub fn new(text: impl Into<String>, marks: &[&str]) -> Self {
        Self {
            key: None,
            text: Some(text.into()),
            marks: marks.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// A typed node that is not a text block (custom blocks and inline objects).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectNode {
    /// The node's `_type`.
    #[serde(rename = "_type")]
    pub kind: String,
    /// Stable identifier.
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ObjectNode {
    /// Creates an object node with no fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: None,
            fields: Map::new(),
        }
    }

    /// Reads the payload as an image; used for images inside a block's children.
    pub fn to_image(&self) -> Result<Image, RenderError> {
        let mut image: Image = serde_json::from_value(Value::Object(self.fields.clone()))?;
        image.key = self.key.clone();
        Ok(image)
    }
}

/// Inline child of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A text run.
    Span(Span),
    /// An inline object such as a line break or an inline image.
    Object(ObjectNode),
}

impl<'de> Deserialize<'de> for Inline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value.get("_type").and_then(Value::as_str);
        match kind {
            None | Some("span") => serde_json::from_value(value)
                .map(Inline::Span)
                .map_err(D::Error::custom),
            Some(_) => serde_json::from_value(value)
                .map(Inline::Object)
                .map_err(D::Error::custom),
        }
    }
}

/// A paragraph, heading, quote or list item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable identifier.
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// Presentation style.
    #[serde(default, deserialize_with = "null_as_default")]
    pub style: BlockStyle,
    /// List type; present only on list items.
    #[serde(default)]
    pub list_item: Option<ListKind>,
    /// List nesting depth, starting at 1.
    #[serde(default)]
    pub level: Option<u32>,
    /// Annotation side table.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<MarkDef>,
    /// Inline children.
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Inline>,
}

impl Block {
    /// Creates a block with the given style and spans.
    pub fn new(style: impl Into<BlockStyle>, children: Vec<Span>) -> Self {
        Self {
            style: style.into(),
            children: children.into_iter().map(Inline::Span).collect(),
            ..Default::default()
        }
    }

    /// Creates a list item block.
    pub fn list_item(kind: impl Into<ListKind>, level: u32, children: Vec<Span>) -> Self {
        Self {
            list_item: Some(kind.into()),
            level: Some(level),
            ..Self::new(BlockStyle::Normal, children)
        }
    }

    /// Adds an annotation definition.
    pub fn with_mark_def(mut self, def: MarkDef) -> Self {
        self.mark_defs.push(def);
        self
    }

    /// List depth, with missing or zero levels treated as 1.
    pub fn list_level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }

    /// Concatenated text of all spans.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Inline::Span(span) => span.text.as_deref(),
                Inline::Object(_) => None,
            })
            .collect()
    }
}

/// Where an image's bytes live.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetSource {
    /// Reference to a stored asset document.
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    /// Direct URL, used by already-expanded assets.
    #[serde(default)]
    pub url: Option<String>,
}

/// A block-level media reference.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Image {
    /// Stable identifier.
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// Asset reference; an image without one is malformed.
    #[serde(default)]
    pub asset: Option<AssetSource>,
    /// Alternative text.
    #[serde(default)]
    pub alt: Option<String>,
    /// Caption shown below the image.
    #[serde(default)]
    pub caption: Option<String>,
}

impl Image {
    /// Creates an image pointing at a stored asset.
    pub fn from_reference(reference: impl Into<String>) -> Self {
        Self {
            asset: Some(AssetSource {
                reference: Some(reference.into()),
                url: None,
            }),
            ..Default::default()
        }
    }

    /// Parses the asset reference.
    pub fn asset_ref(&self) -> Result<AssetRef, AssetError> {
        let source = self.asset.as_ref().ok_or(AssetError::MissingSource)?;
        if let Some(reference) = source.reference.as_deref() {
            return AssetRef::parse_reference(reference);
        }
        match source.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(AssetRef::Url(url.to_string())),
            _ => Err(AssetError::MissingSource),
        }
    }
}

/// A top-level document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text block or list item.
    Block(Block),
    /// Media reference.
    Image(Image),
    /// Any other typed object.
    Object(ObjectNode),
}

impl Node {
    /// Decodes a node from its JSON form, dispatching on `_type`.
    pub fn from_value(value: Value) -> Result<Self, RenderError> {
        let kind = match value.get("_type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(RenderError::invalid_document("`_type` is not a string")),
            None => return Err(RenderError::invalid_document("node has no `_type`")),
        };
        let node = match kind.as_str() {
            "block" => Node::Block(serde_json::from_value(value)?),
            "image" => Node::Image(serde_json::from_value(value)?),
            _ => Node::Object(serde_json::from_value(value)?),
        };
        Ok(node)
    }

    /// The node's `_key`.
    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Block(block) => block.key.as_deref(),
            Node::Image(image) => image.key.as_deref(),
            Node::Object(object) => object.key.as_deref(),
        }
    }

    /// The node's `_type`.
    pub fn kind(&self) -> &str {
        match self {
            Node::Block(_) => "block",
            Node::Image(_) => "image",
            Node::Object(object) => &object.kind,
        }
    }

    /// Returns the block and its list type if this node is a list item.
    pub fn as_list_item(&self) -> Option<(&Block, &ListKind)> {
        match self {
            Node::Block(block) => block.list_item.as_ref().map(|kind| (block, kind)),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::from_value(value).map_err(D::Error::custom)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

impl From<Image> for Node {
    fn from(image: Image) -> Self {
        Node::Image(image)
    }
}

impl From<ObjectNode> for Node {
    fn from(object: ObjectNode) -> Self {
        Node::Object(object)
    }
}

/// A decoded document plus the warnings raised while decoding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Nodes in document order.
    pub nodes: Vec<Node>,
    /// Entries that could not be decoded, located by their source index.
    pub diagnostics: RenderDiagnostics,
}

impl Document {
    /// Creates a document from already-built nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            diagnostics: RenderDiagnostics::new(),
        }
    }

    /// Decodes a document from JSON text.
    ///
    /// A JSON `null` yields `Ok(None)`: an absent field is not an error.
    ///
    /// ```
    /// use folio_core::Document;
    ///
    /// let doc = Document::from_json(r#"[{"_type":"block","children":[{"text":"hi"}]}]"#)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(doc.nodes.len(), 1);
    /// assert!(Document::from_json("null").unwrap().is_none());
    /// ```
    pub fn from_json(input: &str) -> Result<Option<Self>, RenderError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    /// Decodes a document from a JSON value.
    ///
    /// Entries that fail to decode are dropped and recorded as skipped; a
    /// single object is treated as a one-node document.
    pub fn from_value(value: Value) -> Result<Option<Self>, RenderError> {
        let items = match value {
            Value::Null => return Ok(None),
            Value::Array(items) => items,
            Value::Object(_) => vec![value],
            other => {
                return Err(RenderError::invalid_document(format!(
                    "expected an array of nodes, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut document = Document::default();
        for (index, item) in items.into_iter().enumerate() {
            let key = item.get("_key").and_then(Value::as_str).map(str::to_string);
            match Node::from_value(item) {
                Ok(node) => document.nodes.push(node),
                Err(err) => document.diagnostics.add(RenderWarning::SkippedNode {
                    location: NodePath::block(index, key.as_deref()),
                    reason: err.to_string(),
                }),
            }
        }
        Ok(Some(document))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_block_with_marks() {
        let value = json!({
            "_type": "block",
            "_key": "b1",
            "style": "h2",
            "markDefs": [{"_key": "l1", "_type": "link", "href": "https://x"}],
            "children": [
                {"_type": "span", "text": "Hello ", "marks": []},
                {"_type": "span", "text": "world", "marks": ["strong", "l1"]}
            ]
        });

        let Node::Block(block) = Node::from_value(value).unwrap() else {
            panic!("Expected block");
        };
        assert_eq!(block.key.as_deref(), Some("b1"));
        assert_eq!(block.style, BlockStyle::H2);
        assert_eq!(block.mark_defs[0].href(), Some("https://x"));
        assert_eq!(block.plain_text(), "Hello world");
    }

    #[test]
    fn test_style_aliases_and_unknown() {
        assert_eq!(BlockStyle::from_tag("heading-2"), BlockStyle::H2);
        assert_eq!(BlockStyle::from_tag("quote"), BlockStyle::Blockquote);
        assert_eq!(
            BlockStyle::from_tag("callout"),
            BlockStyle::Other("callout".to_string())
        );
        assert_eq!(BlockStyle::H3.heading_depth(), Some(3));
        assert_eq!(BlockStyle::Normal.heading_depth(), None);
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let value = json!({"_type": "block", "style": null, "markDefs": null, "children": null});
        let Node::Block(block) = Node::from_value(value).unwrap() else {
            panic!("Expected block");
        };
        assert_eq!(block.style, BlockStyle::Normal);
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_inline_object_child() {
        let value = json!({
            "_type": "block",
            "children": [{"text": "a"}, {"_type": "break"}, {"text": "b"}]
        });
        let Node::Block(block) = Node::from_value(value).unwrap() else {
            panic!("Expected block");
        };
        assert!(matches!(&block.children[1], Inline::Object(o) if o.kind == "break"));
        assert_eq!(block.plain_text(), "ab");
    }

    #[test]
    fn test_list_level_clamped() {
        let mut item = Block::list_item("bullet", 0, vec![Span::new("a", &[])]);
        assert_eq!(item.list_level(), 1);
        item.level = None;
        assert_eq!(item.list_level(), 1);
        item.level = Some(3);
        assert_eq!(item.list_level(), 3);
    }

    #[test]
    fn test_image_asset_ref() {
        let image = Image::from_reference("image-abc123-800x600-png");
        assert!(image.asset_ref().is_ok());

        let missing = Image::default();
        assert_eq!(missing.asset_ref(), Err(AssetError::MissingSource));
    }

    #[test]
    fn test_inline_image_object_reads_as_image() {
        let value = json!({
            "_type": "block",
            "children": [
                {"_type": "image", "_key": "i1", "asset": {"url": "https://x/a.png"}, "alt": "A"},
                {"_type": "image", "asset": "not an object"}
            ]
        });
        let Node::Block(block) = Node::from_value(value).unwrap() else {
            panic!("Expected block");
        };
        let Inline::Object(object) = &block.children[0] else {
            panic!("Expected inline object");
        };
        let image = object.to_image().unwrap();
        assert_eq!(image.key.as_deref(), Some("i1"));
        assert_eq!(image.alt.as_deref(), Some("A"));
        assert_eq!(
            image.asset_ref(),
            Ok(AssetRef::Url("https://x/a.png".to_string()))
        );

        let Inline::Object(broken) = &block.children[1] else {
            panic!("Expected inline object");
        };
        assert!(broken.to_image().is_err());
    }

    #[test]
    fn test_document_null_is_absent() {
        assert!(Document::from_json("null").unwrap().is_none());
    }

    #[test]
    fn test_document_skips_untyped_entries() {
        let doc = Document::from_json(
            r#"[{"_type":"block","children":[]},{"_key":"x","text":"no type"},42]"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.diagnostics.skipped().count(), 2);
        assert_eq!(doc.diagnostics.warnings[0].location().block, 1);
        assert_eq!(
            doc.diagnostics.warnings[0].location().key.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_document_rejects_scalars() {
        let err = Document::from_json(r#""text""#).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDocument(_)));
    }

    #[test]
    fn test_unknown_type_is_object() {
        let node = Node::from_value(json!({"_type": "codeBlock", "code": "x"})).unwrap();
        assert_eq!(node.kind(), "codeBlock");
        assert!(matches!(node, Node::Object(_)));
    }
}
