use log::debug;
use mailcraft::import::ImportWarning;
use mailcraft::{
    Block, BlockId, BlockKind, Content, Document, ExportOptions, ImportOptions, Layout, Slot,
    import_html, render_email,
};

use crate::error::EditorError;
use crate::history::History;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Vertical extent of one rendered block, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Rect { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

/// Where a drop would land, relative to the block at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub index: usize,
    pub position: Position,
}

impl DropTarget {
    /// Index in the slot at which the dropped block is inserted.
    pub fn insert_index(&self) -> usize {
        match self.position {
            Position::Before => self.index,
            Position::After => self.index + 1,
        }
    }
}

/// Nearest insertion point for a pointer at `pointer_y`.
///
/// Scans the rendered blocks top to bottom: above a block's midpoint means
/// before it, within its lower half means after it. `None` means the pointer
/// is past every block and the drop appends.
pub fn hit_test(pointer_y: f64, rects: &[Rect]) -> Option<DropTarget> {
    rects.iter().enumerate().find_map(|(index, rect)| {
        if pointer_y < rect.midpoint() {
            Some(DropTarget {
                index,
                position: Position::Before,
            })
        } else if pointer_y <= rect.bottom() {
            Some(DropTarget {
                index,
                position: Position::After,
            })
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// A new block of this kind, from the palette.
    Palette(BlockKind),
    /// A block already on the canvas.
    Existing(BlockId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub source: DragSource,
    /// The sequence the pointer is over.
    pub slot: Slot,
    pub target: Option<DropTarget>,
}

/// The outcome of a drop, kept until the UI acknowledges it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub id: BlockId,
    pub slot: Slot,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CanvasState {
    #[default]
    Idle,
    Dragging(Drag),
    Committed(Commit),
}

impl CanvasState {
    pub fn name(&self) -> &'static str {
        match self {
            CanvasState::Idle => "idle",
            CanvasState::Dragging(_) => "dragging",
            CanvasState::Committed(_) => "committed",
        }
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// The editor's in-memory document together with drag state, selection and
/// undo history.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    document: Document,
    state: CanvasState,
    selected: Option<BlockId>,
    history: History,
    export: ExportOptions,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas::default()
    }

    pub fn with_document(document: Document) -> Self {
        Canvas {
            document,
            ..Canvas::default()
        }
    }

    pub fn with_export_options(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    // --- drag and drop -----------------------------------------------------

    /// `idle → dragging`.
    pub fn drag_start(&mut self, source: DragSource, slot: Slot) -> Result<(), EditorError> {
        self.expect_idle("start a drag")?;
        self.document.children(slot)?;
        if let DragSource::Existing(id) = source {
            if self.document.get(id).is_none() {
                return Err(mailcraft::DocumentError::UnknownBlock(id).into());
            }
        }
        debug!("idle -> dragging {:?} over {:?}", source, slot);
        self.state = CanvasState::Dragging(Drag {
            source,
            slot,
            target: None,
        });
        Ok(())
    }

    /// `dragging → dragging`: retarget the drag. `slot` is the sequence now
    /// under the pointer and `rects` the rendered extents of its blocks.
    pub fn pointer_move(
        &mut self,
        slot: Slot,
        pointer_y: f64,
        rects: &[Rect],
    ) -> Result<Option<DropTarget>, EditorError> {
        self.document.children(slot)?;
        let state = self.state.name();
        let CanvasState::Dragging(drag) = &mut self.state else {
            return Err(EditorError::InvalidState {
                action: "move the pointer",
                state,
            });
        };
        drag.slot = slot;
        drag.target = hit_test(pointer_y, rects);
        Ok(drag.target)
    }

    /// `dragging → committed`: insert or move the dragged block at the
    /// current target. On failure the drag ends and the document is
    /// unchanged.
    pub fn drop(&mut self) -> Result<Commit, EditorError> {
        let drag = match std::mem::take(&mut self.state) {
            CanvasState::Dragging(drag) => drag,
            other => {
                let state = other.name();
                self.state = other;
                return Err(EditorError::InvalidState {
                    action: "drop",
                    state,
                });
            }
        };

        let before = self.document.clone();
        let commit = match self.apply_drop(&drag) {
            Ok(commit) => commit,
            Err(err) => {
                debug!("dragging -> idle: drop failed: {}", err);
                self.document = before;
                return Err(err);
            }
        };

        self.history.record(before);
        self.selected = Some(commit.id);
        debug!(
            "dragging -> committed: {} at {:?}[{}]",
            commit.id, commit.slot, commit.index
        );
        self.state = CanvasState::Committed(commit);
        Ok(commit)
    }

    fn apply_drop(&mut self, drag: &Drag) -> Result<Commit, EditorError> {
        let len = self.document.children(drag.slot)?.len();
        let index = drag
            .target
            .map(|t| t.insert_index())
            .unwrap_or(len)
            .min(len);

        match drag.source {
            DragSource::Palette(kind) => {
                let id = self.document.insert(
                    drag.slot,
                    index,
                    Layout::default(),
                    Content::default_for(kind),
                )?;
                Ok(Commit {
                    id,
                    slot: drag.slot,
                    index,
                })
            }
            DragSource::Existing(id) => {
                // Indices were computed with the block still in place.
                let index = match self.document.locate(id) {
                    Some((from, from_index)) if from == drag.slot && from_index < index => {
                        index - 1
                    }
                    _ => index,
                };
                self.document.move_block(id, drag.slot, index)?;
                Ok(Commit {
                    id,
                    slot: drag.slot,
                    index,
                })
            }
        }
    }

    /// `dragging → idle` without changing anything.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, CanvasState::Dragging(_)) {
            debug!("dragging -> idle: cancelled");
            self.state = CanvasState::Idle;
            true
        } else {
            false
        }
    }

    /// `committed → idle`, once the drop has been rendered.
    pub fn acknowledge(&mut self) -> Result<Commit, EditorError> {
        let CanvasState::Committed(commit) = self.state else {
            return Err(EditorError::InvalidState {
                action: "acknowledge a drop",
                state: self.state.name(),
            });
        };
        debug!("committed -> idle");
        self.state = CanvasState::Idle;
        Ok(commit)
    }

    // --- selection and editing ---------------------------------------------

    pub fn select(&mut self, id: BlockId) -> Result<(), EditorError> {
        if self.document.get(id).is_none() {
            return Err(mailcraft::DocumentError::UnknownBlock(id).into());
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Edit a block's attributes in place. The edit may change layout and
    /// kind-specific fields, but not the id, the kind, or a container's
    /// children.
    pub fn edit(&mut self, id: BlockId, f: impl FnOnce(&mut Block)) -> Result<(), EditorError> {
        self.expect_idle("edit a block")?;
        let original = self
            .document
            .get(id)
            .ok_or(mailcraft::DocumentError::UnknownBlock(id))?;

        let mut edited = original.clone();
        f(&mut edited);
        let same_shape = edited.id == original.id
            && edited.kind() == original.kind()
            && match (&edited.content, &original.content) {
                (Content::Columns(a), Content::Columns(b)) => a == b,
                _ => true,
            };
        if !same_shape {
            return Err(EditorError::InvalidEdit(id));
        }
        if edited == *original {
            return Ok(());
        }

        let before = self.document.clone();
        if let Some(block) = self.document.get_mut(id) {
            *block = edited;
        }
        self.history.record(before);
        debug!("edited block {}", id);
        Ok(())
    }

    /// Delete a block (and a container's children).
    pub fn delete(&mut self, id: BlockId) -> Result<Block, EditorError> {
        self.expect_idle("delete a block")?;
        let before = self.document.clone();
        let removed = self.document.remove(id)?;
        self.history.record(before);
        self.prune_selection();
        debug!("deleted block {}", id);
        Ok(removed)
    }

    // --- history -----------------------------------------------------------

    /// Restore the previous document. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.expect_idle("undo")?;
        let current = self.document.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.document = previous;
                self.prune_selection();
                debug!("undo");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.expect_idle("redo")?;
        let current = self.document.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.document = next;
                self.prune_selection();
                debug!("redo");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- import / export ---------------------------------------------------

    /// Replace the document with one imported from exported HTML. A
    /// template that is not recognized leaves the canvas untouched.
    pub fn import_html(
        &mut self,
        html: &str,
        options: &ImportOptions,
    ) -> Result<Vec<ImportWarning>, EditorError> {
        self.expect_idle("import")?;
        let imported = import_html(html, options)?;
        let before = std::mem::replace(&mut self.document, imported.document);
        self.history.record(before);
        self.selected = None;
        debug!(
            "imported {} block(s), {} warning(s)",
            self.document.len(),
            imported.warnings.len()
        );
        Ok(imported.warnings)
    }

    /// The full email document for the current blocks.
    pub fn export_html(&self) -> String {
        render_email(&self.document, &self.export)
    }

    fn expect_idle(&self, action: &'static str) -> Result<(), EditorError> {
        match self.state {
            CanvasState::Idle => Ok(()),
            _ => Err(EditorError::InvalidState {
                action,
                state: self.state.name(),
            }),
        }
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.document.get(id).is_none() {
                self.selected = None;
            }
        }
    }
}
