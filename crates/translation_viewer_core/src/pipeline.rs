//! crates/translation_viewer_core/src/pipeline.rs
//!
//! The cancellable translation request pipeline.
//!
//! The pipeline is a synchronous state machine. Starting a request hands back a
//! [`TranslationTicket`] carrying the generation it belongs to and the token that
//! cancels it; whoever awaits the provider later feeds the outcome back through
//! [`TranslationPipeline::complete`]. Only an outcome whose generation is still
//! current may touch observable state.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::{TranslationRequest, TranslationStatus};
use crate::error::ViewerError;
use crate::ports::{PortError, PortResult, TranslationProvider};

/// Binds one provider call to the generation that started it.
#[derive(Debug, Clone)]
pub struct TranslationTicket {
    generation: u64,
    token: CancellationToken,
}

impl TranslationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A settled provider call, tagged with the generation it was started under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationCompletion {
    pub generation: u64,
    pub outcome: PortResult<String>,
}

#[derive(Debug, Default)]
pub struct TranslationPipeline {
    generation: u64,
    status: TranslationStatus,
    result_text: String,
    error_message: Option<String>,
    in_flight: Option<CancellationToken>,
}

impl TranslationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation for `request`.
    ///
    /// Blank text is rejected before anything changes: the generation is not
    /// bumped and a running request keeps running. Otherwise the previous
    /// generation is cancelled first.
    pub fn begin(&mut self, request: &TranslationRequest) -> Result<TranslationTicket, ViewerError> {
        if request.text.trim().is_empty() {
            return Err(ViewerError::Validation);
        }

        self.cancel();
        self.generation += 1;
        self.status = TranslationStatus::InFlight;
        self.result_text.clear();
        self.error_message = None;

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        debug!(
            generation = self.generation,
            source = %request.source_name,
            page = ?request.page_number,
            "Translation started."
        );

        Ok(TranslationTicket {
            generation: self.generation,
            token,
        })
    }

    /// Applies a settled provider call. Returns false when the completion
    /// belonged to a superseded generation and was dropped.
    pub fn complete(&mut self, completion: TranslationCompletion) -> bool {
        if completion.generation != self.generation || self.status != TranslationStatus::InFlight {
            debug!(
                stale = completion.generation,
                current = self.generation,
                "Discarding superseded translation completion."
            );
            return false;
        }

        self.in_flight = None;
        match completion.outcome {
            Ok(text) => {
                self.status = TranslationStatus::Succeeded;
                self.result_text = text;
            }
            Err(e) if e.is_cancellation() => {
                self.status = TranslationStatus::CancelledSilently;
            }
            Err(e) => {
                self.status = TranslationStatus::Failed;
                let failure = ViewerError::Provider(e.to_string());
                let message = failure.to_string();
                self.error_message = Some(if message.trim().is_empty() {
                    failure.advisory().to_string()
                } else {
                    message
                });
            }
        }
        true
    }

    /// Cancels the in-flight generation, if any. A no-op otherwise.
    pub fn cancel(&mut self) {
        if self.status != TranslationStatus::InFlight {
            return;
        }
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.status = TranslationStatus::CancelledSilently;
        // Anything already settled for the old generation is now stale.
        self.generation += 1;
        debug!(generation = self.generation, "Translation cancelled.");
    }

    /// Cancels and forgets any result or error.
    pub fn reset(&mut self) {
        self.cancel();
        self.result_text.clear();
        self.error_message = None;
        self.status = TranslationStatus::Idle;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    pub fn is_translating(&self) -> bool {
        self.status == TranslationStatus::InFlight
    }

    /// Meaningful only when the status is `Succeeded`; empty otherwise.
    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Awaits the provider for one ticket.
///
/// Resolves with `PortError::Cancelled` as soon as the ticket's token fires, and
/// never reports success for a cancelled ticket even if the provider does.
pub async fn execute(
    provider: &dyn TranslationProvider,
    request: TranslationRequest,
    ticket: TranslationTicket,
) -> TranslationCompletion {
    let token = ticket.token;
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => Err(PortError::Cancelled),
        result = provider.translate(&request, &token) => {
            if token.is_cancelled() {
                Err(PortError::Cancelled)
            } else {
                result
            }
        }
    };
    TranslationCompletion {
        generation: ticket.generation,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            source_kind: SourceKind::Pdf,
            source_name: "a.pdf".to_string(),
            page_number: Some(1),
            target_language: "ja".to_string(),
        }
    }

    fn done(ticket: &TranslationTicket, outcome: PortResult<String>) -> TranslationCompletion {
        TranslationCompletion {
            generation: ticket.generation(),
            outcome,
        }
    }

    #[test]
    fn newer_generation_wins_over_late_older_result() {
        let mut pipeline = TranslationPipeline::new();
        let a = pipeline.begin(&request("A")).unwrap();
        let b = pipeline.begin(&request("B")).unwrap();
        assert!(a.token().is_cancelled());
        assert!(!b.token().is_cancelled());

        assert!(pipeline.complete(done(&b, Ok("translated B".into()))));
        assert!(!pipeline.complete(done(&a, Ok("translated A".into()))));

        assert_eq!(pipeline.status(), TranslationStatus::Succeeded);
        assert_eq!(pipeline.result_text(), "translated B");
    }

    #[test]
    fn late_error_from_older_generation_is_ignored() {
        let mut pipeline = TranslationPipeline::new();
        let a = pipeline.begin(&request("A")).unwrap();
        let _b = pipeline.begin(&request("B")).unwrap();

        assert!(!pipeline.complete(done(&a, Err(PortError::Provider("boom".into())))));
        assert_eq!(pipeline.status(), TranslationStatus::InFlight);
        assert_eq!(pipeline.error_message(), None);
    }

    #[test]
    fn provider_failure_is_surfaced() {
        let mut pipeline = TranslationPipeline::new();
        let ticket = pipeline.begin(&request("A")).unwrap();
        pipeline.complete(done(&ticket, Err(PortError::Provider("quota exceeded".into()))));

        assert_eq!(pipeline.status(), TranslationStatus::Failed);
        assert_eq!(pipeline.error_message(), Some("quota exceeded"));
        assert_eq!(pipeline.result_text(), "");
    }

    #[test]
    fn blank_provider_message_gets_a_default() {
        let mut pipeline = TranslationPipeline::new();
        let ticket = pipeline.begin(&request("A")).unwrap();
        pipeline.complete(done(&ticket, Err(PortError::Provider(" ".into()))));
        assert_eq!(pipeline.error_message(), Some("Translation failed."));
    }

    #[test]
    fn cancel_is_silent_and_supersedes() {
        let mut pipeline = TranslationPipeline::new();
        let ticket = pipeline.begin(&request("A")).unwrap();
        pipeline.cancel();

        assert!(ticket.token().is_cancelled());
        assert_eq!(pipeline.status(), TranslationStatus::CancelledSilently);
        assert!(pipeline.generation() > ticket.generation());

        // A result that had already settled is dropped.
        assert!(!pipeline.complete(done(&ticket, Ok("late".into()))));
        assert!(!pipeline.complete(done(&ticket, Err(PortError::Provider("late".into())))));
        assert_eq!(pipeline.status(), TranslationStatus::CancelledSilently);
        assert_eq!(pipeline.error_message(), None);
        assert_eq!(pipeline.result_text(), "");
    }

    #[test]
    fn cancellation_outcome_for_current_generation_is_silent() {
        let mut pipeline = TranslationPipeline::new();
        let ticket = pipeline.begin(&request("A")).unwrap();
        assert!(pipeline.complete(done(&ticket, Err(PortError::Cancelled))));
        assert_eq!(pipeline.status(), TranslationStatus::CancelledSilently);
        assert_eq!(pipeline.error_message(), None);
    }

    #[test]
    fn cancel_when_idle_is_a_no_op() {
        let mut pipeline = TranslationPipeline::new();
        pipeline.cancel();
        pipeline.cancel();
        assert_eq!(pipeline.status(), TranslationStatus::Idle);
        assert_eq!(pipeline.generation(), 0);
    }

    #[test]
    fn blank_text_never_starts_a_generation() {
        let mut pipeline = TranslationPipeline::new();
        let running = pipeline.begin(&request("A")).unwrap();
        let before = pipeline.generation();

        for blank in ["", "   ", "\n\t "] {
            assert_eq!(pipeline.begin(&request(blank)).unwrap_err(), ViewerError::Validation);
        }

        assert_eq!(pipeline.generation(), before);
        assert_eq!(pipeline.status(), TranslationStatus::InFlight);
        assert!(!running.token().is_cancelled());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut pipeline = TranslationPipeline::new();
        let ticket = pipeline.begin(&request("A")).unwrap();
        pipeline.complete(done(&ticket, Ok("done".into())));

        pipeline.reset();
        assert_eq!(pipeline.status(), TranslationStatus::Idle);
        assert_eq!(pipeline.result_text(), "");
        assert_eq!(pipeline.error_message(), None);

        let ticket = pipeline.begin(&request("B")).unwrap();
        pipeline.reset();
        assert!(ticket.token().is_cancelled());
        assert_eq!(pipeline.status(), TranslationStatus::Idle);
    }
}
