//! crates/translation_viewer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the viewer.
//! These types are independent of any transport or serialization format.

use bytes::Bytes;

use crate::error::ViewerError;

/// Which kind of document a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pdf,
    Html,
}

impl SourceKind {
    /// The wire name used in translation requests (`"pdf"` / `"html"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Html => "html",
        }
    }
}

/// A loaded document. Immutable once constructed; the name is never empty.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Pdf { bytes: Bytes, name: String },
    Html { markup: String, name: String },
}

impl DocumentSource {
    /// Builds a source from a picked file, dispatching on the file extension.
    ///
    /// `.pdf` is kept as raw bytes; `.html` / `.htm` is decoded as UTF-8
    /// (invalid sequences are replaced). Anything else is rejected.
    pub fn from_file(name: &str, data: Bytes) -> Result<Self, ViewerError> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentSource::Pdf {
                bytes: data,
                name: name.to_string(),
            })
        } else if lower.ends_with(".html") || lower.ends_with(".htm") {
            Ok(DocumentSource::Html {
                markup: String::from_utf8_lossy(&data).into_owned(),
                name: name.to_string(),
            })
        } else {
            Err(ViewerError::UnsupportedFormat(name.to_string()))
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DocumentSource::Pdf { .. } => SourceKind::Pdf,
            DocumentSource::Html { .. } => SourceKind::Html,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DocumentSource::Pdf { name, .. } | DocumentSource::Html { name, .. } => name,
        }
    }
}

/// Current page and page count. A `page_count` of 0 means "not yet known".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current_page: u32,
    pub page_count: u32,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_count: 0,
        }
    }
}

/// An immutable request handed to a translation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_kind: SourceKind,
    pub source_name: String,
    /// Present only for PDF sources.
    pub page_number: Option<u32>,
    pub target_language: String,
}

impl TranslationRequest {
    /// Scopes a request to the text of one page of `source`.
    pub fn for_page(
        source: &DocumentSource,
        page: u32,
        text: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        let page_number = match source {
            DocumentSource::Pdf { .. } => Some(page),
            DocumentSource::Html { .. } => None,
        };
        Self {
            text: text.into(),
            source_kind: source.kind(),
            source_name: source.name().to_string(),
            page_number,
            target_language: target_language.into(),
        }
    }
}

/// Lifecycle of the translation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
    CancelledSilently,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_extension_selects_variant() {
        let pdf = DocumentSource::from_file("Report.PDF", Bytes::from_static(b"%PDF")).unwrap();
        assert_eq!(pdf.kind(), SourceKind::Pdf);
        assert_eq!(pdf.name(), "Report.PDF");

        let html = DocumentSource::from_file("page.htm", Bytes::from_static(b"<p>Hi</p>")).unwrap();
        match html {
            DocumentSource::Html { markup, name } => {
                assert_eq!(markup, "<p>Hi</p>");
                assert_eq!(name, "page.htm");
            }
            other => panic!("expected html source, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = DocumentSource::from_file("notes.txt", Bytes::new()).unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat(name) if name == "notes.txt"));
        assert!(DocumentSource::from_file("", Bytes::new()).is_err());
    }

    #[test]
    fn page_number_is_only_set_for_pdf() {
        let pdf = DocumentSource::Pdf {
            bytes: Bytes::new(),
            name: "a.pdf".into(),
        };
        let html = DocumentSource::Html {
            markup: String::new(),
            name: "a.html".into(),
        };
        assert_eq!(TranslationRequest::for_page(&pdf, 2, "x", "ja").page_number, Some(2));
        let request = TranslationRequest::for_page(&html, 2, "x", "ja");
        assert_eq!(request.page_number, None);
        assert_eq!(request.source_kind.as_str(), "html");
    }
}
