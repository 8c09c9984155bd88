pub mod canvas;
pub mod error;
pub mod history;

pub use canvas::{Canvas, CanvasState, Commit, Drag, DragSource, DropTarget, Position, Rect, hit_test};
pub use error::EditorError;
pub use history::{DEFAULT_HISTORY_LIMIT, History};
