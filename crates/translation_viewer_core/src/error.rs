//! crates/translation_viewer_core/src/error.rs
//!
//! Failures the viewer reports to its caller. None of them are fatal: each is
//! converted into a state update by the session.

/// The viewer's error taxonomy. Cancellation is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    /// The picked file is neither PDF nor HTML.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The document adapter could not parse the source.
    #[error("Document could not be loaded: {0}")]
    DocumentLoad(String),

    /// Translation was requested with empty or whitespace-only text.
    #[error("There is no text to translate")]
    Validation,

    /// The translation provider failed for a reason other than cancellation.
    #[error("{0}")]
    Provider(String),
}

impl ViewerError {
    /// The short status line shown to the user for this failure.
    pub fn advisory(&self) -> &'static str {
        match self {
            ViewerError::UnsupportedFormat(_) => "Unsupported format. Choose a PDF or HTML file.",
            ViewerError::DocumentLoad(_) => "The document could not be loaded.",
            ViewerError::Validation => "No translatable text was found on this page.",
            ViewerError::Provider(_) => "Translation failed.",
        }
    }
}
