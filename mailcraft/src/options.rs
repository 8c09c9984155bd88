use serde::{Deserialize, Serialize};

/// Width of the main content table when nothing else is configured.
/// The importer locates a template by this marker.
pub const DEFAULT_CONTENT_WIDTH: u32 = 600;

/// Settings for the full-document exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Document `<title>`.
    pub title: String,
    /// Width of the main content table, in pixels.
    pub content_width: u32,
    /// Page background colour around the content table.
    pub background: String,
    /// Maximum number of characters in the hidden preheader.
    pub preheader_length: usize,
    /// Plain text shown in the footer row.
    pub footer: String,
    /// Base URL of the open-tracking pixel.
    pub tracking_url: String,
    /// Base URL of the unsubscribe link; no link is rendered when unset.
    pub unsubscribe_url: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            title: "Newsletter".to_string(),
            content_width: DEFAULT_CONTENT_WIDTH,
            background: "#f4f4f4".to_string(),
            preheader_length: 100,
            footer: "You are receiving this email because you subscribed to our mailing list."
                .to_string(),
            tracking_url: "http://localhost:4000/track-open".to_string(),
            unsubscribe_url: None,
        }
    }
}

/// Settings for the HTML importer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Width marker of the main content table.
    pub content_width: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            content_width: DEFAULT_CONTENT_WIDTH,
        }
    }
}

impl From<&ExportOptions> for ImportOptions {
    fn from(export: &ExportOptions) -> Self {
        ImportOptions {
            content_width: export.content_width,
        }
    }
}
