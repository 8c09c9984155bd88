use std::collections::BTreeMap;

use thiserror::Error;

use crate::block::{Block, BlockId, Columns, Content, Layout};

/// Errors raised by structural edits of a `Document`.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("block {0} is not a two-column container")]
    NotAContainer(BlockId),

    #[error("two-column containers cannot be placed inside a column")]
    NestedContainer,

    #[error("duplicate block id: {0}")]
    DuplicateId(BlockId),

    #[error("a container must be inserted empty; add children through its column slots")]
    DanglingChild,

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which column of a two-column container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// An ordered sequence that can hold blocks: the top level, or one column
/// of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Root,
    Column { container: BlockId, side: Side },
}

/// An email template: an arena of blocks plus the ordered top-level sequence.
///
/// Containers reference their children by id, so every block is owned by the
/// arena and the whole document clones as one flat map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: BTreeMap<BlockId, Block>,
    roots: Vec<BlockId>,
    next_id: u32,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            blocks: BTreeMap::new(),
            roots: Vec::new(),
            next_id: 1,
        }
    }

    /// Total number of blocks, including column children.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    /// The id the next inserted block will receive.
    pub fn next_id(&self) -> BlockId {
        BlockId(self.next_id)
    }

    pub(crate) fn reserve_through(&mut self, id: u32) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    /// Ordered ids held by `slot`.
    pub fn children(&self, slot: Slot) -> Result<&[BlockId], DocumentError> {
        match slot {
            Slot::Root => Ok(&self.roots),
            Slot::Column { container, side } => match self.blocks.get(&container) {
                Some(Block {
                    content: Content::Columns(columns),
                    ..
                }) => Ok(columns.side(side)),
                Some(_) => Err(DocumentError::NotAContainer(container)),
                None => Err(DocumentError::UnknownBlock(container)),
            },
        }
    }

    /// Append a block with default layout to the top level.
    pub fn push(&mut self, content: Content) -> Result<BlockId, DocumentError> {
        let index = self.roots.len();
        self.insert(Slot::Root, index, Layout::default(), content)
    }

    /// Insert a new block into `slot` at `index` (clamped to the slot length).
    pub fn insert(
        &mut self,
        slot: Slot,
        index: usize,
        layout: Layout,
        content: Content,
    ) -> Result<BlockId, DocumentError> {
        let id = BlockId(self.next_id);
        self.insert_with_id(slot, index, id, layout, content)?;
        Ok(id)
    }

    /// Insert a block under a caller-chosen id. Later allocations continue
    /// past the largest id seen.
    pub(crate) fn insert_with_id(
        &mut self,
        slot: Slot,
        index: usize,
        id: BlockId,
        layout: Layout,
        content: Content,
    ) -> Result<(), DocumentError> {
        if self.blocks.contains_key(&id) {
            return Err(DocumentError::DuplicateId(id));
        }
        if let Content::Columns(columns) = &content {
            if !columns.left.is_empty() || !columns.right.is_empty() {
                return Err(DocumentError::DanglingChild);
            }
            if matches!(slot, Slot::Column { .. }) {
                return Err(DocumentError::NestedContainer);
            }
        }

        let seq = self.slot_mut(slot)?;
        let index = index.min(seq.len());
        seq.insert(index, id);

        self.blocks.insert(id, Block { id, layout, content });
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        Ok(())
    }

    /// Delete a block. Deleting a container deletes its children as well.
    pub fn remove(&mut self, id: BlockId) -> Result<Block, DocumentError> {
        let (slot, index) = self.locate(id).ok_or(DocumentError::UnknownBlock(id))?;
        self.slot_mut(slot)?.remove(index);

        let block = self
            .blocks
            .remove(&id)
            .ok_or(DocumentError::UnknownBlock(id))?;
        if let Content::Columns(columns) = &block.content {
            for child in columns.left.iter().chain(columns.right.iter()) {
                self.blocks.remove(child);
            }
        }
        Ok(block)
    }

    /// Move an existing block to `index` within `slot`. The index is
    /// interpreted after the block has been taken out of its current slot.
    pub fn move_block(&mut self, id: BlockId, slot: Slot, index: usize) -> Result<(), DocumentError> {
        let block = self.blocks.get(&id).ok_or(DocumentError::UnknownBlock(id))?;
        if let Slot::Column { container, .. } = slot {
            if block.is_container() || container == id {
                return Err(DocumentError::NestedContainer);
            }
            // Validate the target before detaching anything.
            self.children(slot)?;
        }

        let (from, from_index) = self.locate(id).ok_or(DocumentError::UnknownBlock(id))?;
        self.slot_mut(from)?.remove(from_index);

        let seq = self.slot_mut(slot)?;
        let index = index.min(seq.len());
        seq.insert(index, id);
        Ok(())
    }

    /// Find the slot holding `id` and its position there.
    pub fn locate(&self, id: BlockId) -> Option<(Slot, usize)> {
        if let Some(index) = self.roots.iter().position(|b| *b == id) {
            return Some((Slot::Root, index));
        }
        for root in &self.roots {
            if let Some(Block {
                content: Content::Columns(columns),
                ..
            }) = self.blocks.get(root)
            {
                for side in [Side::Left, Side::Right] {
                    if let Some(index) = columns.side(side).iter().position(|b| *b == id) {
                        return Some((
                            Slot::Column {
                                container: *root,
                                side,
                            },
                            index,
                        ));
                    }
                }
            }
        }
        None
    }

    /// All blocks in document order (depth-first, left column before right).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        let mut out = Vec::with_capacity(self.blocks.len());
        for id in &self.roots {
            let Some(block) = self.blocks.get(id) else {
                continue;
            };
            out.push(block);
            if let Content::Columns(columns) = &block.content {
                out.extend(
                    columns
                        .left
                        .iter()
                        .chain(columns.right.iter())
                        .filter_map(|child| self.blocks.get(child)),
                );
            }
        }
        out.into_iter()
    }

    /// Structural equality that ignores identifier values.
    pub fn equivalent(&self, other: &Document) -> bool {
        sequences_equivalent(self, &self.roots, other, &other.roots)
    }

    /// Serialize to the nested JSON form.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the nested JSON form, validating ids and nesting.
    pub fn from_json(source: &str) -> Result<Document, DocumentError> {
        let repr: super::repr::DocumentRepr = serde_json::from_str(source)?;
        Document::try_from(repr)
    }

    fn slot_mut(&mut self, slot: Slot) -> Result<&mut Vec<BlockId>, DocumentError> {
        match slot {
            Slot::Root => Ok(&mut self.roots),
            Slot::Column { container, side } => match self.blocks.get_mut(&container) {
                Some(Block {
                    content: Content::Columns(columns),
                    ..
                }) => Ok(columns.side_mut(side)),
                Some(_) => Err(DocumentError::NotAContainer(container)),
                None => Err(DocumentError::UnknownBlock(container)),
            },
        }
    }
}

fn sequences_equivalent(a: &Document, a_ids: &[BlockId], b: &Document, b_ids: &[BlockId]) -> bool {
    a_ids.len() == b_ids.len()
        && a_ids.iter().zip(b_ids).all(|(x, y)| match (a.get(*x), b.get(*y)) {
            (Some(x), Some(y)) => {
                x.layout == y.layout
                    && match (&x.content, &y.content) {
                        (Content::Columns(Columns { left: xl, right: xr }), Content::Columns(Columns { left: yl, right: yr })) => {
                            sequences_equivalent(a, xl, b, yl) && sequences_equivalent(a, xr, b, yr)
                        }
                        (x, y) => x.equivalent(y),
                    }
            }
            _ => false,
        })
}
