//! crates/translation_viewer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the viewer's external collaborators.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of a specific PDF engine, HTML parser or translation backend.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::domain::TranslationRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Malformed document: {0}")]
    DocumentLoad(String),
    #[error("Page {page} is outside 1..={page_count}")]
    PageOutOfRange { page: u32, page_count: u32 },
    /// The operation observed its cancellation token. Never shown to users.
    #[error("Operation was cancelled")]
    Cancelled,
    /// The provider's own message, passed through untouched.
    #[error("{0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PortError::Cancelled)
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// An opened PDF. Pages are 1-based.
#[async_trait]
pub trait PdfDocument: Send + Sync {
    fn page_count(&self) -> u32;

    /// Returns the plain text of `page`. Must return `PortError::Cancelled`
    /// rather than text once `cancel` has fired.
    async fn page_text(&self, page: u32, cancel: &CancellationToken) -> PortResult<String>;
}

#[async_trait]
pub trait DocumentAdapter: Send + Sync {
    /// Parses a PDF byte buffer. Malformed input yields `PortError::DocumentLoad`.
    async fn open_pdf(
        &self,
        bytes: Bytes,
        cancel: &CancellationToken,
    ) -> PortResult<Arc<dyn PdfDocument>>;

    /// Best-effort plain text of an HTML document's body. Total: never fails.
    fn extract_html_text(&self, markup: &str) -> String;
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translates `request.text`. Must stop promptly once `cancel` fires and
    /// must not resolve successfully after that.
    async fn translate(
        &self,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> PortResult<String>;
}
