//! services/viewer/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns one `ViewerSession`. Client commands and finished jobs
//! are handled one at a time on the connection's task; jobs themselves run on
//! spawned tasks and report back through a channel.

use crate::{
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        state::{AppState, ConnectionState},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use bytes::Bytes;
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};
use translation_viewer_core::{jobs, Completion, Job};

type WsSender = SplitSink<WebSocket, Message>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    let max_message_size = app_state.config.max_upload_bytes;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let mut conn = ConnectionState::new(&app_state.config);
    let connection_id = conn.connection_id;
    info!(connection = %connection_id, "New WebSocket connection established.");

    let (mut sender, mut receiver) = socket.split();
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<Completion>();

    // --- 1. Initialization Phase ---
    let init_msg = ServerMessage::SessionInitialized { connection_id };
    if let Err(e) = send_message(&mut sender, &init_msg).await {
        error!("Failed to send session initialized message: {}", e);
        return;
    }

    if let Some(path) = app_state.config.placeholder_pdf.as_ref() {
        match tokio::fs::read(path).await {
            Ok(data) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "placeholder.pdf".to_string());
                let job = conn.session.open_file(&name, Bytes::from(data));
                dispatch(&app_state, &completion_tx, job);
            }
            Err(e) => warn!(path = %path.display(), "Failed to load placeholder PDF: {}", e),
        }
    }

    if publish(&mut sender, &mut conn).await.is_err() {
        return;
    }

    // --- 2. Main Message Loop ---
    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match handle_text_message(text.as_str(), &mut conn) {
                            Ok(job) => dispatch(&app_state, &completion_tx, job),
                            Err(message) => {
                                warn!(connection = %connection_id, "{}", message);
                                let err_msg = ServerMessage::Error { message };
                                if send_message(&mut sender, &err_msg).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        match conn.pending_file.take() {
                            Some(name) => {
                                let job = conn.session.open_file(&name, data);
                                dispatch(&app_state, &completion_tx, job);
                            }
                            None => {
                                warn!(connection = %connection_id, "Binary frame without a preceding open_file.");
                                let err_msg = ServerMessage::Error {
                                    message: "Send open_file before the file contents.".to_string(),
                                };
                                if send_message(&mut sender, &err_msg).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client sent close message.");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket receive failed: {}", e);
                        break;
                    }
                    None => {
                        info!("Client disconnected.");
                        break;
                    }
                }
            }
            Some(completion) = completion_rx.recv() => {
                debug!(connection = %connection_id, ?completion, "Job finished.");
                let job = conn.session.apply(completion);
                dispatch(&app_state, &completion_tx, job);
            }
        }

        if publish(&mut sender, &mut conn).await.is_err() {
            break;
        }
    }

    // --- 3. Cleanup ---
    // Dropping the source cancels every outstanding job's token.
    conn.session.load_source(None);
    info!(connection = %connection_id, "WebSocket connection closed.");
}

/// Applies one client command to the connection. Returns the job to run, or a
/// message describing why the command was rejected.
fn handle_text_message(text: &str, conn: &mut ConnectionState) -> Result<Option<Job>, String> {
    let client_msg = serde_json::from_str::<ClientMessage>(text)
        .map_err(|e| format!("Failed to deserialize client message: {}", e))?;

    let job = match client_msg {
        ClientMessage::OpenFile { name } => {
            info!(file = %name, "OpenFile message received. Awaiting contents.");
            conn.pending_file = Some(name);
            None
        }
        ClientMessage::CloseFile => conn.session.load_source(None),
        ClientMessage::PreviousPage => conn.session.previous_page(),
        ClientMessage::NextPage => conn.session.next_page(),
        ClientMessage::Translate => conn.session.translate(),
        ClientMessage::CancelTranslation => {
            conn.session.cancel_translation();
            None
        }
        ClientMessage::ClearTranslation => {
            conn.session.clear_translation();
            None
        }
        ClientMessage::SetViewMode { mode } => {
            conn.view_mode = mode;
            None
        }
    };
    Ok(job)
}

/// Runs `job` on its own task and routes the completion back to the connection.
fn dispatch(app_state: &Arc<AppState>, completions: &UnboundedSender<Completion>, job: Option<Job>) {
    let Some(job) = job else {
        return;
    };
    debug!(job = ?job, "Dispatching {} job.", job.kind());

    let documents = app_state.documents.clone();
    let translator = app_state.translator.clone();
    let completions = completions.clone();
    tokio::spawn(async move {
        let completion = jobs::run(job, documents.as_ref(), translator.as_ref()).await;
        if completions.send(completion).is_err() {
            debug!("Connection closed before the job finished.");
        }
    });
}

/// Sends the viewer state if it changed since the last publish.
async fn publish(sender: &mut WsSender, conn: &mut ConnectionState) -> Result<(), ApiError> {
    let Some(state) = conn.take_update() else {
        return Ok(());
    };
    send_message(sender, &ServerMessage::State(state))
        .await
        .inspect_err(|e| error!("Failed to publish viewer state: {}", e))
}

async fn send_message(sender: &mut WsSender, msg: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(msg).map_err(|e| ApiError::Internal(e.to_string()))?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalDocumentAdapter, MockTranslationAdapter};
    use crate::config::Config;
    use crate::settings::SettingsStore;
    use crate::web::protocol::{ViewMode, ViewerState};

    fn connection() -> ConnectionState {
        ConnectionState::new(&Config::from_lookup(|_| None).unwrap())
    }

    #[test]
    fn open_file_waits_for_contents() {
        let mut conn = connection();
        let job = handle_text_message(r#"{"type":"open_file","name":"a.pdf"}"#, &mut conn).unwrap();
        assert!(job.is_none());
        assert_eq!(conn.pending_file.as_deref(), Some("a.pdf"));
        assert!(conn.session.source().is_none());
    }

    #[test]
    fn translate_without_file_is_refused_with_status() {
        let mut conn = connection();
        let job = handle_text_message(r#"{"type":"translate"}"#, &mut conn).unwrap();
        assert!(job.is_none());
        assert!(conn.session.status_message().is_some());
    }

    #[test]
    fn view_mode_is_tracked_on_the_connection() {
        let mut conn = connection();
        handle_text_message(r#"{"type":"set_view_mode","mode":"source"}"#, &mut conn).unwrap();
        assert_eq!(conn.view_mode, ViewMode::Source);
    }

    #[test]
    fn malformed_messages_are_rejected() {
        let mut conn = connection();
        let err = handle_text_message("not json", &mut conn).unwrap_err();
        assert!(err.starts_with("Failed to deserialize client message"));
    }

    async fn app_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let config = Config::from_lookup(|_| None).unwrap();
        let settings = SettingsStore::load(dir.path().join("settings.json"), config.default_theme).await;
        Arc::new(AppState {
            documents: Arc::new(LocalDocumentAdapter::new()),
            translator: Arc::new(MockTranslationAdapter::new(config.mock_latency)),
            settings: Arc::new(settings),
            config: Arc::new(config),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn completions_flow_back_through_the_connection() {
        let dir = tempfile::tempdir().unwrap();
        let app_state = app_state(&dir).await;
        let mut conn = ConnectionState::new(&app_state.config);
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        conn.take_update();

        let job = conn
            .session
            .open_file("page.html", Bytes::from_static(b"<body><p>Hello</p></body>"));
        dispatch(&app_state, &tx, job);
        let loading = conn.take_update().expect("loading is visible");
        assert!(loading.loading);

        let completion = rx.recv().await.expect("extraction finishes");
        assert!(conn.session.apply(completion).is_none());
        assert_eq!(conn.session.extracted_text(), "Hello");
        let ready = conn.take_update().expect("text is visible");
        assert!(!ready.loading);
        assert!(ready.can_translate);

        let job = handle_text_message(r#"{"type":"translate"}"#, &mut conn).unwrap();
        dispatch(&app_state, &tx, job);
        assert!(conn.take_update().expect("translation starts").is_translating);

        let completion = rx.recv().await.expect("translation finishes");
        dispatch(&app_state, &tx, conn.session.apply(completion));
        let done = conn.take_update().expect("translation is visible");
        assert_eq!(done.translation_status, "succeeded");
        assert_eq!(done.translation_paragraphs[0], "[Mock translation: JA]");
        assert!(done.translation_paragraphs.iter().any(|line| line == "Hello"));
        assert!(conn.take_update().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_translation_completes_silently() {
        let dir = tempfile::tempdir().unwrap();
        let app_state = app_state(&dir).await;
        let mut conn = ConnectionState::new(&app_state.config);
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

        let job = conn
            .session
            .open_file("page.html", Bytes::from_static(b"<p>Hello</p>"));
        dispatch(&app_state, &tx, job);
        let completion = rx.recv().await.expect("extraction finishes");
        conn.session.apply(completion);

        let job = handle_text_message(r#"{"type":"translate"}"#, &mut conn).unwrap();
        dispatch(&app_state, &tx, job);
        handle_text_message(r#"{"type":"cancel_translation"}"#, &mut conn).unwrap();
        conn.take_update();

        let completion = rx.recv().await.expect("cancelled job still reports");
        conn.session.apply(completion);
        let state = ViewerState::from_snapshot(conn.session.snapshot(), conn.view_mode);
        assert_eq!(state.translation_status, "cancelled");
        assert_eq!(state.error_message, None);
        assert!(conn.take_update().is_none());
    }
}
