use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// Import failure. Callers keep whatever document they had.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("not a recognized template: {reason}")]
    NotATemplate { reason: String },
}

impl ImportError {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_notes(vec![
                "templates are recognized by the main content table the exporter writes".to_string(),
            ])
    }
}

/// A row the importer skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWarning {
    pub message: String,
    /// Byte range of the skipped `<tr>`.
    pub span: Range<usize>,
}

impl ImportWarning {
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::warning()
            .with_message(&self.message)
            .with_labels(vec![Label::primary(file_id, self.span.clone())])
    }
}
