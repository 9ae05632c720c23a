// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: the rich-document tree handed over by the editing
// surface, the style marks attached to its text, and signature overlays.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// -- Document tree ------------------------------------------------------------

/// Kind of a [`DocumentNode`].
///
/// The set is closed: every tag the editing surface emits has a variant, and
/// anything else lands in [`NodeKind::Other`] so that serialisers can fall back
/// to flattening its children instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    Text,
    Image,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    Table,
    TableRow,
    TableCell,
    /// Header cells are serialised exactly like ordinary cells.
    TableHeader,
    HorizontalRule,
    HardBreak,
    /// Any tag not listed above.
    Other(String),
}

impl NodeKind {
    /// Tag name as used by the editing surface's JSON.
    pub fn tag(&self) -> &str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Image => "image",
            Self::BulletList => "bulletList",
            Self::OrderedList => "orderedList",
            Self::ListItem => "listItem",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "codeBlock",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::TableHeader => "tableHeader",
            Self::HorizontalRule => "horizontalRule",
            Self::HardBreak => "hardBreak",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this kind is a list container.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::BulletList | Self::OrderedList)
    }

    /// Whether nodes of this kind never carry children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Image | Self::HardBreak | Self::HorizontalRule
        )
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "doc" => Self::Doc,
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "text" => Self::Text,
            "image" => Self::Image,
            "bulletList" => Self::BulletList,
            "orderedList" => Self::OrderedList,
            "listItem" => Self::ListItem,
            "blockquote" => Self::Blockquote,
            "codeBlock" => Self::CodeBlock,
            "table" => Self::Table,
            "tableRow" => Self::TableRow,
            "tableCell" => Self::TableCell,
            "tableHeader" => Self::TableHeader,
            "horizontalRule" => Self::HorizontalRule,
            "hardBreak" => Self::HardBreak,
            _ => Self::Other(tag),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(tag) => tag,
            known => known.tag().to_owned(),
        }
    }
}

/// One node of the rich-document tree.
///
/// `text` is only meaningful on [`NodeKind::Text`] leaves and `content` is
/// empty on leaf kinds. Attributes are kept as raw JSON because their schema
/// belongs to the editing surface; typed accessors below read the few keys the
/// serialisers care about and treat anything unexpected as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocumentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl DocumentNode {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
            attrs: Map::new(),
        }
    }

    /// Create a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    /// Parse a tree from the editing surface's JSON representation.
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| crate::error::FolioError::InvalidTree(err.to_string()))
    }

    // -- Builders -------------------------------------------------------------

    pub fn with_content(mut self, content: Vec<DocumentNode>) -> Self {
        self.content = content;
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    // -- Attribute access -----------------------------------------------------

    /// Raw attribute value; JSON `null` reads as absent.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key).filter(|value| !value.is_null())
    }

    /// String attribute.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Numeric attribute. Numeric strings such as `"320"` are accepted
    /// because resizable images store their size that way.
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        match self.attr(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().trim_end_matches("px").parse().ok(),
            _ => None,
        }
    }

    /// Concatenated text of every text leaf below (and including) this node,
    /// in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.kind == NodeKind::Text {
            if let Some(text) = &self.text {
                out.push_str(text);
            }
            return;
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

// -- Marks --------------------------------------------------------------------

/// Kind of a style [`Mark`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    /// Inline code span, rendered in a monospace font.
    InlineCode,
    /// Text colour carried in the `color` attribute.
    TextColor,
    /// Background highlight, optional `color` attribute.
    Highlight,
    /// Hyperlink with an `href` attribute.
    Hyperlink,
    Other(String),
}

impl MarkKind {
    pub fn tag(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strike => "strike",
            Self::InlineCode => "code",
            Self::TextColor => "textStyle",
            Self::Highlight => "highlight",
            Self::Hyperlink => "link",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for MarkKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "bold" | "strong" => Self::Bold,
            "italic" | "em" => Self::Italic,
            "underline" => Self::Underline,
            "strike" | "strikethrough" => Self::Strike,
            "code" => Self::InlineCode,
            "textStyle" => Self::TextColor,
            "highlight" => Self::Highlight,
            "link" => Self::Hyperlink,
            _ => Self::Other(tag),
        }
    }
}

impl From<MarkKind> for String {
    fn from(kind: MarkKind) -> Self {
        match kind {
            MarkKind::Other(tag) => tag,
            known => known.tag().to_owned(),
        }
    }
}

/// A style annotation attached to a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl Mark {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            attrs: Map::new(),
        }
    }

    pub fn bold() -> Self {
        Self::new(MarkKind::Bold)
    }

    pub fn italic() -> Self {
        Self::new(MarkKind::Italic)
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new(MarkKind::Hyperlink).with_attr("href", href.into())
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self::new(MarkKind::TextColor).with_attr("color", color.into())
    }

    pub fn highlight(color: Option<&str>) -> Self {
        let mark = Self::new(MarkKind::Highlight);
        match color {
            Some(color) => mark.with_attr("color", color),
            None => mark,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// String attribute; empty strings read as absent.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

// -- Signature overlays -------------------------------------------------------

/// A raster image placed by the user on one page of a paged document.
///
/// Coordinates are percentages of the page: `x`/`y` measured from the top-left
/// corner, `width` as a share of the page width. Height is never stored; it
/// follows from the image's aspect ratio when the overlay is composited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureOverlay {
    #[serde(default)]
    pub id: String,
    /// 1-indexed page number. Out-of-range values are skipped, not rejected.
    pub page: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// `data:image/<png|jpeg|jpg>;base64,...`
    #[serde(rename = "dataUrl")]
    pub data_url: String,
}

/// Position and size of a page's media box, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBounds {
    /// Lower-left corner of the box.
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBounds {
    /// US Letter, 8.5 × 11 in.
    pub const LETTER: Self = Self::sized(612.0, 792.0);

    /// A page box anchored at the origin.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width,
            height,
        }
    }
}
