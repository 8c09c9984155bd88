pub mod document;
mod repr;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::html;

pub use document::{Document, DocumentError, Side, Slot};

/// Identifier of a block within one document.
/// Assigned monotonically by the owning `Document` and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Horizontal alignment of a block inside its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    /// Case-insensitive parse of an `align` attribute or `text-align` value.
    pub fn parse(value: &str) -> Option<Align> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Align::Left),
            "center" | "middle" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            _ => None,
        }
    }
}

/// Layout attributes shared by every block kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layout {
    /// Cell padding in pixels.
    pub padding: u32,
    pub align: Align,
    /// Font size in pixels.
    pub font_size: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            padding: 10,
            align: Align::Left,
            font_size: 16,
        }
    }
}

/// Rich-text paragraph. `content` is inline HTML and is emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    pub content: String,
    pub color: String,
    pub bold: bool,
}

impl Default for TextBlock {
    fn default() -> Self {
        TextBlock {
            content: "This is a text block".to_string(),
            color: "#333333".to_string(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageBlock {
    pub src: String,
    pub alt: String,
    /// Explicit width in pixels; `None` lets the image scale to the cell.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_radius: u32,
}

impl Default for ImageBlock {
    fn default() -> Self {
        ImageBlock {
            src: "https://via.placeholder.com/300x100".to_string(),
            alt: String::new(),
            width: None,
            height: None,
            border_radius: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonBlock {
    pub label: String,
    pub href: String,
    /// Background colour of the button.
    pub background: String,
    /// Label colour.
    pub color: String,
}

impl Default for ButtonBlock {
    fn default() -> Self {
        ButtonBlock {
            label: "Click Me".to_string(),
            href: "#".to_string(),
            background: "#007bff".to_string(),
            color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListBlock {
    /// Items are inline HTML, emitted verbatim inside `<li>`.
    pub items: Vec<String>,
    pub ordered: bool,
}

impl Default for ListBlock {
    fn default() -> Self {
        ListBlock {
            items: vec![
                "Item One".to_string(),
                "Item Two".to_string(),
                "Item Three".to_string(),
            ],
            ordered: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkBlock {
    pub href: String,
    pub text: String,
    pub color: String,
    pub underline: bool,
}

impl Default for LinkBlock {
    fn default() -> Self {
        LinkBlock {
            href: "#".to_string(),
            text: "Link".to_string(),
            color: "#007bff".to_string(),
            underline: true,
        }
    }
}

/// The two columns of a container. Children live in the document arena.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns {
    pub left: Vec<BlockId>,
    pub right: Vec<BlockId>,
}

impl Columns {
    pub fn side(&self, side: Side) -> &[BlockId] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Vec<BlockId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Kind-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(TextBlock),
    Image(ImageBlock),
    Button(ButtonBlock),
    List(ListBlock),
    Link(LinkBlock),
    Columns(Columns),
    /// A block whose kind was not recognized when loading a document.
    Unknown,
}

impl Content {
    /// Palette defaults for a freshly dropped block.
    pub fn default_for(kind: BlockKind) -> Content {
        match kind {
            BlockKind::Text => Content::Text(TextBlock::default()),
            BlockKind::Image => Content::Image(ImageBlock::default()),
            BlockKind::Button => Content::Button(ButtonBlock::default()),
            BlockKind::List => Content::List(ListBlock::default()),
            BlockKind::Link => Content::Link(LinkBlock::default()),
            BlockKind::Columns => Content::Columns(Columns::default()),
            BlockKind::Unknown => Content::Unknown,
        }
    }

    pub fn text(content: impl Into<String>) -> Content {
        Content::Text(TextBlock {
            content: content.into(),
            ..TextBlock::default()
        })
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Content::Text(_) => BlockKind::Text,
            Content::Image(_) => BlockKind::Image,
            Content::Button(_) => BlockKind::Button,
            Content::List(_) => BlockKind::List,
            Content::Link(_) => BlockKind::Link,
            Content::Columns(_) => BlockKind::Columns,
            Content::Unknown => BlockKind::Unknown,
        }
    }

    /// Equality with rich text compared after HTML normalization, so
    /// `&quot;` and `"` in text, or `<br>` and `<br />`, are the same content.
    pub fn equivalent(&self, other: &Content) -> bool {
        match (self, other) {
            (Content::Text(a), Content::Text(b)) => {
                a.color == b.color
                    && a.bold == b.bold
                    && html::normalize(&a.content) == html::normalize(&b.content)
            }
            (Content::List(a), Content::List(b)) => {
                a.ordered == b.ordered
                    && a.items.len() == b.items.len()
                    && a.items
                        .iter()
                        .zip(&b.items)
                        .all(|(x, y)| html::normalize(x) == html::normalize(y))
            }
            (a, b) => a == b,
        }
    }
}

/// The closed set of block kinds, plus `Unknown` for unrecognized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Text,
    Image,
    Button,
    List,
    Link,
    Columns,
    Unknown,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::List => "list",
            BlockKind::Link => "link",
            BlockKind::Columns => "columns",
            BlockKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            "button" => Ok(BlockKind::Button),
            "list" => Ok(BlockKind::List),
            "link" | "anchor" => Ok(BlockKind::Link),
            "columns" | "two-column" => Ok(BlockKind::Columns),
            other => Err(format!("unknown block kind: {}", other)),
        }
    }
}

/// One visual element of an email template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub layout: Layout,
    pub content: Content,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.content, Content::Columns(_))
    }
}
