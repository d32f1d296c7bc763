//! services/viewer/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! viewer service.

use serde::{Deserialize, Serialize};
use translation_viewer_core::{SourceKind, TranslationStatus, ViewerSnapshot};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: File contents are sent as one raw Binary frame right after `OpenFile`.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announces a file; the next binary frame carries its bytes.
    OpenFile { name: String },

    /// Unloads the current document.
    CloseFile,

    PreviousPage,

    NextPage,

    /// Translates the text of the page currently shown.
    Translate,

    /// Stops an in-flight translation without reporting an error.
    CancelTranslation,

    /// Cancels and forgets the current translation or error.
    ClearTranslation,

    SetViewMode { mode: ViewMode },
}

/// Which panes the client shows. Purely presentational.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Both,
    Source,
    Translation,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the connection is ready to accept commands.
    SessionInitialized { connection_id: Uuid },

    /// The full observable viewer state. Sent once per state change.
    State(ViewerState),

    /// A malformed or out-of-order client message.
    Error { message: String },
}

/// The observable viewer state as the client sees it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    pub file_name: Option<String>,
    pub source_kind: Option<&'static str>,
    pub source_label: Option<String>,
    pub current_page: u32,
    pub page_count: u32,
    pub can_navigate: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub loading: bool,
    pub translation: String,
    /// The translation split on newlines, one entry per rendered paragraph.
    pub translation_paragraphs: Vec<String>,
    pub translation_status: &'static str,
    pub is_translating: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub can_translate: bool,
    pub can_clear: bool,
    pub view_mode: ViewMode,
}

impl ViewerState {
    pub fn from_snapshot(snapshot: ViewerSnapshot, view_mode: ViewMode) -> Self {
        let translation_paragraphs = if snapshot.translation.is_empty() {
            Vec::new()
        } else {
            snapshot.translation.split('\n').map(str::to_string).collect()
        };
        Self {
            file_name: snapshot.file_name,
            source_kind: snapshot.source_kind.map(|k: SourceKind| k.as_str()),
            source_label: snapshot.source_label,
            current_page: snapshot.current_page,
            page_count: snapshot.page_count,
            can_navigate: snapshot.can_navigate,
            can_go_previous: snapshot.can_go_previous,
            can_go_next: snapshot.can_go_next,
            loading: snapshot.loading,
            translation: snapshot.translation,
            translation_paragraphs,
            translation_status: status_name(snapshot.translation_status),
            is_translating: snapshot.is_translating,
            error_message: snapshot.error_message,
            status_message: snapshot.status_message,
            can_translate: snapshot.can_translate,
            can_clear: snapshot.can_clear,
            view_mode,
        }
    }
}

fn status_name(status: TranslationStatus) -> &'static str {
    match status {
        TranslationStatus::Idle => "idle",
        TranslationStatus::InFlight => "in_flight",
        TranslationStatus::Succeeded => "succeeded",
        TranslationStatus::Failed => "failed",
        TranslationStatus::CancelledSilently => "cancelled",
    }
}
