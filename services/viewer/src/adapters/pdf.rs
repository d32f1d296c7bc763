//! services/viewer/src/adapters/pdf.rs
//!
//! PDF text extraction backed by the `pdf-extract` crate. The whole document is
//! parsed once on open; page lookups afterwards are cheap.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use translation_viewer_core::ports::{PdfDocument, PortError, PortResult};

use super::collapse_whitespace;

/// A parsed PDF holding the normalized plain text of each page.
#[derive(Debug, Clone)]
pub struct ExtractedPdf {
    pages: Vec<String>,
}

impl ExtractedPdf {
    /// Parses `bytes` on the blocking pool. Malformed input becomes
    /// `PortError::DocumentLoad`; a parser task that panics becomes
    /// `PortError::Unexpected`.
    pub async fn parse(bytes: Bytes) -> PortResult<Self> {
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| PortError::Unexpected(format!("PDF parser aborted: {}", e)))?
        .map_err(|e| PortError::DocumentLoad(e.to_string()))?;

        debug!(pages = pages.len(), "PDF text extracted.");
        Ok(Self::from_pages(pages.iter().map(String::as_str)))
    }

    pub fn from_pages<'a>(pages: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            pages: pages.into_iter().map(collapse_whitespace).collect(),
        }
    }
}

#[async_trait]
impl PdfDocument for ExtractedPdf {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    async fn page_text(&self, page: u32, cancel: &CancellationToken) -> PortResult<String> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .cloned()
            .ok_or(PortError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pages_are_one_based_and_normalized() {
        let pdf = ExtractedPdf::from_pages(["  First\n\n page ", "Second\tpage"]);
        let token = CancellationToken::new();

        assert_eq!(pdf.page_count(), 2);
        assert_eq!(pdf.page_text(1, &token).await.unwrap(), "First page");
        assert_eq!(pdf.page_text(2, &token).await.unwrap(), "Second page");
        assert_eq!(
            pdf.page_text(3, &token).await,
            Err(PortError::PageOutOfRange { page: 3, page_count: 2 })
        );
        assert!(pdf.page_text(0, &token).await.is_err());
    }

    #[tokio::test]
    async fn cancelled_lookup_returns_no_text() {
        let pdf = ExtractedPdf::from_pages(["text"]);
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(pdf.page_text(1, &token).await, Err(PortError::Cancelled));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_load() {
        let result = ExtractedPdf::parse(Bytes::from_static(b"definitely not a pdf")).await;
        assert!(matches!(result, Err(PortError::DocumentLoad(_))));
    }
}
