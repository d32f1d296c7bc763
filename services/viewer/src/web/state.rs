//! services/viewer/src/web/state.rs
//!
//! Defines the application's shared and connection-specific states.

use crate::config::Config;
use crate::settings::SettingsStore;
use crate::web::protocol::{ViewMode, ViewerState};
use std::sync::Arc;
use translation_viewer_core::ports::{DocumentAdapter, TranslationProvider};
use translation_viewer_core::ViewerSession;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<SettingsStore>,
    pub documents: Arc<dyn DocumentAdapter>,
    pub translator: Arc<dyn TranslationProvider>,
}

//=========================================================================================
// ConnectionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single, active WebSocket connection. Owned by the
/// connection's task, so it is never shared or locked.
pub struct ConnectionState {
    pub connection_id: Uuid,
    pub session: ViewerSession,
    pub view_mode: ViewMode,
    /// Name announced by `OpenFile`, waiting for its binary frame.
    pub pending_file: Option<String>,
    last_published: Option<ViewerState>,
}

impl ConnectionState {
    pub fn new(config: &Config) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            session: ViewerSession::new(config.target_language.clone()),
            view_mode: ViewMode::default(),
            pending_file: None,
            last_published: None,
        }
    }

    /// Returns the current state if it differs from what was last published,
    /// and records it as published.
    pub fn take_update(&mut self) -> Option<ViewerState> {
        let state = ViewerState::from_snapshot(self.session.snapshot(), self.view_mode);
        if self.last_published.as_ref() == Some(&state) {
            return None;
        }
        self.last_published = Some(state.clone());
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn test_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn identical_states_are_published_once() {
        let mut conn = ConnectionState::new(&test_config());
        assert!(conn.take_update().is_some());
        assert!(conn.take_update().is_none());

        conn.session.translate();
        let update = conn.take_update().expect("status message changed");
        assert!(update.status_message.is_some());
        assert!(conn.take_update().is_none());
    }

    #[test]
    fn view_mode_changes_are_published() {
        let mut conn = ConnectionState::new(&test_config());
        conn.take_update();
        conn.view_mode = ViewMode::Translation;
        assert_eq!(conn.take_update().map(|s| s.view_mode), Some(ViewMode::Translation));
    }

    #[test]
    fn opening_a_file_is_visible() {
        let mut conn = ConnectionState::new(&test_config());
        conn.take_update();
        conn.session.open_file("a.html", Bytes::from_static(b"<p>Hello</p>"));
        let update = conn.take_update().expect("source changed");
        assert_eq!(update.file_name.as_deref(), Some("a.html"));
        assert!(update.loading);
    }
}
