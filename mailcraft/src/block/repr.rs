//! Nested JSON form of a `Document`.
//!
//! On disk a container lists its children inline; in memory they live in
//! the arena. Ids are optional on input.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::block::document::{Document, DocumentError, Side, Slot};
use crate::block::{
    BlockId, ButtonBlock, Columns, Content, ImageBlock, Layout, LinkBlock, ListBlock, TextBlock,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DocumentRepr {
    #[serde(default)]
    blocks: Vec<BlockRepr>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u32>,
    #[serde(default)]
    layout: Layout,
    #[serde(flatten)]
    content: ContentRepr,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ContentRepr {
    Text(TextBlock),
    Image(ImageBlock),
    Button(ButtonBlock),
    List(ListBlock),
    Link(LinkBlock),
    Columns {
        #[serde(default)]
        left: Vec<BlockRepr>,
        #[serde(default)]
        right: Vec<BlockRepr>,
    },
    #[serde(other)]
    Unknown,
}

impl TryFrom<DocumentRepr> for Document {
    type Error = DocumentError;

    fn try_from(repr: DocumentRepr) -> Result<Self, Self::Error> {
        let mut doc = Document::new();
        let largest = repr.blocks.iter().map(largest_id).max().unwrap_or(0);
        // Blocks without an id are numbered after every explicit one.
        doc.reserve_through(largest);

        for (index, block) in repr.blocks.into_iter().enumerate() {
            add_block(&mut doc, Slot::Root, index, block)?;
        }
        Ok(doc)
    }
}

fn largest_id(block: &BlockRepr) -> u32 {
    let own = block.id.unwrap_or(0);
    match &block.content {
        ContentRepr::Columns { left, right } => left
            .iter()
            .chain(right.iter())
            .map(largest_id)
            .fold(own, u32::max),
        _ => own,
    }
}

fn add_block(doc: &mut Document, slot: Slot, index: usize, block: BlockRepr) -> Result<(), DocumentError> {
    let id = block.id.map(BlockId).unwrap_or_else(|| doc.next_id());
    let (content, children) = match block.content {
        ContentRepr::Text(text) => (Content::Text(text), None),
        ContentRepr::Image(image) => (Content::Image(image), None),
        ContentRepr::Button(button) => (Content::Button(button), None),
        ContentRepr::List(list) => (Content::List(list), None),
        ContentRepr::Link(link) => (Content::Link(link), None),
        ContentRepr::Columns { left, right } => (Content::Columns(Columns::default()), Some((left, right))),
        ContentRepr::Unknown => (Content::Unknown, None),
    };
    doc.insert_with_id(slot, index, id, block.layout, content)?;

    if let Some((left, right)) = children {
        for (side, blocks) in [(Side::Left, left), (Side::Right, right)] {
            let column = Slot::Column { container: id, side };
            for (index, child) in blocks.into_iter().enumerate() {
                add_block(doc, column, index, child)?;
            }
        }
    }
    Ok(())
}

fn block_repr(doc: &Document, id: BlockId) -> Option<BlockRepr> {
    let block = doc.get(id)?;
    let content = match &block.content {
        Content::Text(text) => ContentRepr::Text(text.clone()),
        Content::Image(image) => ContentRepr::Image(image.clone()),
        Content::Button(button) => ContentRepr::Button(button.clone()),
        Content::List(list) => ContentRepr::List(list.clone()),
        Content::Link(link) => ContentRepr::Link(link.clone()),
        Content::Columns(columns) => ContentRepr::Columns {
            left: columns.left.iter().filter_map(|c| block_repr(doc, *c)).collect(),
            right: columns.right.iter().filter_map(|c| block_repr(doc, *c)).collect(),
        },
        Content::Unknown => ContentRepr::Unknown,
    };
    Some(BlockRepr {
        id: Some(id.0),
        layout: block.layout.clone(),
        content,
    })
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = DocumentRepr {
            blocks: self.roots().iter().filter_map(|id| block_repr(self, *id)).collect(),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = DocumentRepr::deserialize(deserializer)?;
        Document::try_from(repr).map_err(serde::de::Error::custom)
    }
}
