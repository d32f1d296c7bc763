//! crates/translation_viewer_core/src/session.rs
//!
//! `ViewerSession` ties one navigation controller, one translation pipeline and
//! the extracted-text slot together and enforces the reset rules between them:
//! whenever the source or the page changes, the extracted text and the
//! translation are cleared before anything new can be observed.

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{DocumentSource, SourceKind, TranslationRequest, TranslationStatus};
use crate::error::ViewerError;
use crate::jobs::{Completion, Job};
use crate::navigation::{NavigationController, PageMove};
use crate::pipeline::TranslationPipeline;
use crate::ports::{PdfDocument, PortError, PortResult};

/// Status line shown when translation is requested before any file is loaded.
pub const NO_SOURCE_MESSAGE: &str = "Load a PDF or HTML file first.";

/// Everything the presentation layer may observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSnapshot {
    pub file_name: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub source_label: Option<String>,
    pub current_page: u32,
    pub page_count: u32,
    pub can_navigate: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub loading: bool,
    pub translation: String,
    pub translation_status: TranslationStatus,
    pub is_translating: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub can_translate: bool,
    pub can_clear: bool,
}

pub struct ViewerSession {
    target_language: String,
    source: Option<DocumentSource>,
    document: Option<Arc<dyn PdfDocument>>,
    navigation: NavigationController,
    pipeline: TranslationPipeline,
    extracted_text: String,
    // Bumped on every load; tags `OpenPdf` jobs.
    source_epoch: u64,
    opening: Option<CancellationToken>,
    // Bumped whenever the (source, page) pair changes; tags extraction jobs.
    extraction_epoch: u64,
    extracting: Option<CancellationToken>,
    status_message: Option<String>,
}

impl ViewerSession {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source: None,
            document: None,
            navigation: NavigationController::new(),
            pipeline: TranslationPipeline::new(),
            extracted_text: String::new(),
            source_epoch: 0,
            opening: None,
            extraction_epoch: 0,
            extracting: None,
            status_message: None,
        }
    }

    //=====================================================================================
    // Source lifecycle
    //=====================================================================================

    /// Loads a picked file. Unsupported extensions clear the previous source
    /// and leave an advisory status message.
    pub fn open_file(&mut self, name: &str, data: Bytes) -> Option<Job> {
        match DocumentSource::from_file(name, data) {
            Ok(source) => self.load_source(Some(source)),
            Err(e) => {
                warn!(file = %name, "Rejected file: {}", e);
                self.load_source(None);
                self.status_message = Some(e.advisory().to_string());
                None
            }
        }
    }

    /// Replaces the active source and resets everything derived from the old one.
    pub fn load_source(&mut self, source: Option<DocumentSource>) -> Option<Job> {
        self.pipeline.reset();
        self.invalidate_extraction();
        if let Some(token) = self.opening.take() {
            token.cancel();
        }
        self.source_epoch += 1;
        self.document = None;
        self.status_message = None;
        self.navigation.load(source.as_ref().map(DocumentSource::kind));
        self.source = source;

        let markup = match &self.source {
            None => return None,
            Some(DocumentSource::Pdf { bytes, name }) => {
                info!(file = %name, bytes = bytes.len(), "Opening PDF.");
                let token = CancellationToken::new();
                self.opening = Some(token.clone());
                return Some(Job::OpenPdf {
                    epoch: self.source_epoch,
                    token,
                    bytes: bytes.clone(),
                });
            }
            Some(DocumentSource::Html { markup, name }) => {
                info!(file = %name, "Loading HTML.");
                markup.clone()
            }
        };

        self.navigation.set_page_count(1);
        let (epoch, _token) = self.begin_extraction();
        Some(Job::ExtractHtml { epoch, markup })
    }

    /// Records the adapter-reported page count. If that pulls the current page
    /// back into range, the page's text is re-extracted.
    pub fn set_page_count(&mut self, count: u32) -> Option<Job> {
        if self.navigation.set_page_count(count) {
            self.extract_current_page()
        } else {
            None
        }
    }

    /// Overwrites the extracted text. Callers must only deliver text for the
    /// active page; `apply` does that check for job completions.
    pub fn set_extracted_text(&mut self, text: String) {
        self.extracted_text = text;
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    pub fn previous_page(&mut self) -> Option<Job> {
        let step = self.navigation.previous();
        self.after_navigation(step)
    }

    pub fn next_page(&mut self) -> Option<Job> {
        let step = self.navigation.next();
        self.after_navigation(step)
    }

    fn after_navigation(&mut self, step: PageMove) -> Option<Job> {
        match step {
            PageMove::Ignored => None,
            PageMove::Unchanged => {
                self.pipeline.reset();
                None
            }
            PageMove::Moved { from, to } => {
                debug!(from, to, "Page changed.");
                self.pipeline.reset();
                self.extract_current_page()
            }
        }
    }

    //=====================================================================================
    // Translation
    //=====================================================================================

    /// Starts translating the current page's text.
    pub fn translate(&mut self) -> Option<Job> {
        let Some(source) = &self.source else {
            self.status_message = Some(NO_SOURCE_MESSAGE.to_string());
            return None;
        };
        let request = TranslationRequest::for_page(
            source,
            self.navigation.current_page(),
            self.extracted_text.clone(),
            self.target_language.clone(),
        );

        match self.pipeline.begin(&request) {
            Ok(ticket) => {
                self.status_message = None;
                Some(Job::Translate { request, ticket })
            }
            Err(e) => {
                self.status_message = Some(e.advisory().to_string());
                None
            }
        }
    }

    pub fn cancel_translation(&mut self) {
        self.pipeline.cancel();
    }

    pub fn clear_translation(&mut self) {
        self.pipeline.reset();
    }

    //=====================================================================================
    // Completions
    //=====================================================================================

    /// Feeds a finished job back in. Stale completions are dropped. May return
    /// a follow-up job (opening a PDF is followed by extracting its page).
    pub fn apply(&mut self, completion: Completion) -> Option<Job> {
        match completion {
            Completion::Opened { epoch, outcome } => self.document_opened(epoch, outcome),
            Completion::Extracted { epoch, outcome } => {
                self.text_extracted(epoch, outcome);
                None
            }
            Completion::Translated(done) => {
                self.pipeline.complete(done);
                None
            }
        }
    }

    fn document_opened(
        &mut self,
        epoch: u64,
        outcome: PortResult<Arc<dyn PdfDocument>>,
    ) -> Option<Job> {
        if epoch != self.source_epoch || self.opening.is_none() {
            debug!(stale = epoch, current = self.source_epoch, "Discarding stale document open.");
            return None;
        }
        self.opening = None;

        match outcome {
            Ok(document) => {
                let count = document.page_count();
                info!(pages = count, "PDF opened.");
                self.document = Some(document);
                self.navigation.set_page_count(count);
                self.extract_current_page()
            }
            Err(PortError::Cancelled) => None,
            Err(e) => {
                warn!("Failed to open PDF: {}", e);
                let failure = ViewerError::DocumentLoad(e.to_string());
                self.load_source(None);
                self.status_message = Some(failure.advisory().to_string());
                None
            }
        }
    }

    fn text_extracted(&mut self, epoch: u64, outcome: PortResult<String>) {
        if epoch != self.extraction_epoch || self.extracting.is_none() {
            debug!(stale = epoch, current = self.extraction_epoch, "Discarding stale page text.");
            return;
        }
        self.extracting = None;

        match outcome {
            Ok(text) => self.set_extracted_text(text),
            Err(PortError::Cancelled) => {}
            Err(e) => {
                warn!(page = self.navigation.current_page(), "Failed to extract page text: {}", e);
                self.extracted_text.clear();
            }
        }
    }

    //=====================================================================================
    // Extraction bookkeeping
    //=====================================================================================

    fn invalidate_extraction(&mut self) {
        self.extraction_epoch += 1;
        if let Some(token) = self.extracting.take() {
            token.cancel();
        }
        self.extracted_text.clear();
    }

    fn begin_extraction(&mut self) -> (u64, CancellationToken) {
        self.invalidate_extraction();
        let token = CancellationToken::new();
        self.extracting = Some(token.clone());
        (self.extraction_epoch, token)
    }

    fn extract_current_page(&mut self) -> Option<Job> {
        let document = match &self.document {
            Some(document) if document.page_count() > 0 => Arc::clone(document),
            _ => {
                self.invalidate_extraction();
                return None;
            }
        };
        let page = self.navigation.current_page();
        let (epoch, token) = self.begin_extraction();
        Some(Job::ExtractPage {
            epoch,
            token,
            document,
            page,
        })
    }

    //=====================================================================================
    // Observation
    //=====================================================================================

    pub fn source(&self) -> Option<&DocumentSource> {
        self.source.as_ref()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn translation_status(&self) -> TranslationStatus {
        self.pipeline.status()
    }

    pub fn translation_generation(&self) -> u64 {
        self.pipeline.generation()
    }

    pub fn is_loading(&self) -> bool {
        self.opening.is_some() || self.extracting.is_some()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn source_label(&self) -> Option<String> {
        let nav = self.navigation.state();
        self.source.as_ref().map(|source| match source {
            DocumentSource::Pdf { .. } if nav.page_count > 0 => {
                format!("Page {} / {}", nav.current_page, nav.page_count)
            }
            DocumentSource::Pdf { .. } => format!("Page {}", nav.current_page),
            DocumentSource::Html { .. } => "HTML preview".to_string(),
        })
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let nav = self.navigation.state();
        let error_message = self.pipeline.error_message().map(str::to_string);
        let translation = self.pipeline.result_text().to_string();
        ViewerSnapshot {
            file_name: self.source.as_ref().map(|s| s.name().to_string()),
            source_kind: self.source.as_ref().map(DocumentSource::kind),
            source_label: self.source_label(),
            current_page: nav.current_page,
            page_count: nav.page_count,
            can_navigate: self.navigation.can_navigate(),
            can_go_previous: self.navigation.can_go_previous(),
            can_go_next: self.navigation.can_go_next(),
            loading: self.is_loading(),
            can_translate: self.source.is_some() && !self.extracted_text.trim().is_empty(),
            can_clear: !translation.is_empty() || error_message.is_some(),
            translation,
            translation_status: self.pipeline.status(),
            is_translating: self.pipeline.is_translating(),
            error_message,
            status_message: self.status_message.clone(),
        }
    }
}
