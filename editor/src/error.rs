use mailcraft::{BlockId, DocumentError, ImportError};
use thiserror::Error;

/// Errors raised by canvas operations. A failed operation leaves the
/// document, selection and history as they were.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("cannot {action} while the canvas is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("edit of block {0} changed its identity, kind or children")]
    InvalidEdit(BlockId),
}
