//! services/viewer/src/adapters/mock_translation.rs
//!
//! A stand-in translation backend. It waits for a fixed latency and then echoes
//! the request back wrapped in a recognisable marker.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use translation_viewer_core::domain::TranslationRequest;
use translation_viewer_core::ports::{PortError, PortResult, TranslationProvider};

pub const MOCK_NOTICE: &str =
    "(This is a mock result. Replace it with a real translation provider.)";

/// An adapter that implements `TranslationProvider` without any backend.
#[derive(Debug, Clone)]
pub struct MockTranslationAdapter {
    latency: Duration,
}

impl MockTranslationAdapter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl TranslationProvider for MockTranslationAdapter {
    async fn translate(
        &self,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> PortResult<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PortError::Cancelled),
            _ = tokio::time::sleep(self.latency) => {}
        }

        let mut lines = vec![
            format!("[Mock translation: {}]", request.target_language.to_uppercase()),
            format!("File: {}", request.source_name),
        ];
        if let Some(page) = request.page_number {
            lines.push(format!("Page: {}", page));
        }
        lines.push(request.text.clone());
        lines.push(MOCK_NOTICE.to_string());
        Ok(lines.join("\n"))
    }
}
