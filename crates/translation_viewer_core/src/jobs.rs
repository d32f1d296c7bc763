//! crates/translation_viewer_core/src/jobs.rs
//!
//! Suspension points of a viewer session.
//!
//! The session never awaits anything itself. It hands out [`Job`]s, and the
//! owner of the session runs them (usually on a spawned task) and feeds the
//! resulting [`Completion`] back. Every job carries the epoch or generation that
//! was current when it was issued, so the session can drop late completions.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::domain::TranslationRequest;
use crate::pipeline::{self, TranslationCompletion, TranslationTicket};
use crate::ports::{DocumentAdapter, PdfDocument, PortError, PortResult, TranslationProvider};

pub enum Job {
    OpenPdf {
        epoch: u64,
        token: CancellationToken,
        bytes: Bytes,
    },
    ExtractHtml {
        epoch: u64,
        markup: String,
    },
    ExtractPage {
        epoch: u64,
        token: CancellationToken,
        document: Arc<dyn PdfDocument>,
        page: u32,
    },
    Translate {
        request: TranslationRequest,
        ticket: TranslationTicket,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::OpenPdf { .. } => "open_pdf",
            Job::ExtractHtml { .. } => "extract_html",
            Job::ExtractPage { .. } => "extract_page",
            Job::Translate { .. } => "translate",
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::OpenPdf { epoch, bytes, .. } => f
                .debug_struct("OpenPdf")
                .field("epoch", epoch)
                .field("len", &bytes.len())
                .finish(),
            Job::ExtractHtml { epoch, markup } => f
                .debug_struct("ExtractHtml")
                .field("epoch", epoch)
                .field("len", &markup.len())
                .finish(),
            Job::ExtractPage { epoch, page, .. } => f
                .debug_struct("ExtractPage")
                .field("epoch", epoch)
                .field("page", page)
                .finish(),
            Job::Translate { request, ticket } => f
                .debug_struct("Translate")
                .field("generation", &ticket.generation())
                .field("page", &request.page_number)
                .finish(),
        }
    }
}

pub enum Completion {
    Opened {
        epoch: u64,
        outcome: PortResult<Arc<dyn PdfDocument>>,
    },
    Extracted {
        epoch: u64,
        outcome: PortResult<String>,
    },
    Translated(TranslationCompletion),
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Opened { epoch, outcome } => f
                .debug_struct("Opened")
                .field("epoch", epoch)
                .field("pages", &outcome.as_ref().map(|d| d.page_count()))
                .finish(),
            Completion::Extracted { epoch, outcome } => f
                .debug_struct("Extracted")
                .field("epoch", epoch)
                .field("outcome", outcome)
                .finish(),
            Completion::Translated(c) => f.debug_tuple("Translated").field(c).finish(),
        }
    }
}

/// Runs one job to completion against the given collaborators.
pub async fn run(
    job: Job,
    documents: &dyn DocumentAdapter,
    translator: &dyn TranslationProvider,
) -> Completion {
    match job {
        Job::OpenPdf {
            epoch,
            token,
            bytes,
        } => {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(PortError::Cancelled),
                opened = documents.open_pdf(bytes, &token) => opened,
            };
            Completion::Opened { epoch, outcome }
        }
        Job::ExtractHtml { epoch, markup } => Completion::Extracted {
            epoch,
            outcome: Ok(documents.extract_html_text(&markup)),
        },
        Job::ExtractPage {
            epoch,
            token,
            document,
            page,
        } => {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(PortError::Cancelled),
                text = document.page_text(page, &token) => {
                    if token.is_cancelled() {
                        Err(PortError::Cancelled)
                    } else {
                        text
                    }
                }
            };
            Completion::Extracted { epoch, outcome }
        }
        Job::Translate { request, ticket } => {
            Completion::Translated(pipeline::execute(translator, request, ticket).await)
        }
    }
}
