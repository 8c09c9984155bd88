pub mod block;
pub mod draft;
pub mod html;
pub mod import;
pub mod options;
pub mod personalize;
pub mod render;

pub use block::{Align, Block, BlockId, BlockKind, Content, Document, DocumentError, Layout, Side, Slot};
pub use import::{ImportError, ImportWarning, Imported, import_html};
pub use options::{ExportOptions, ImportOptions};
pub use render::{render_email, render_rows};
