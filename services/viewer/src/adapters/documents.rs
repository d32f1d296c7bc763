//! services/viewer/src/adapters/documents.rs
//!
//! The local document adapter: PDFs through `pdf-extract`, HTML through `html5ever`.
//! It implements the `DocumentAdapter` port from the `core` crate.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use translation_viewer_core::ports::{DocumentAdapter, PdfDocument, PortError, PortResult};

use super::{html, pdf::ExtractedPdf};

#[derive(Debug, Clone, Default)]
pub struct LocalDocumentAdapter;

impl LocalDocumentAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentAdapter for LocalDocumentAdapter {
    async fn open_pdf(
        &self,
        bytes: Bytes,
        cancel: &CancellationToken,
    ) -> PortResult<Arc<dyn PdfDocument>> {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        let document = ExtractedPdf::parse(bytes).await?;
        Ok(Arc::new(document))
    }

    fn extract_html_text(&self, markup: &str) -> String {
        html::extract_body_text(markup)
    }
}
