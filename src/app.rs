use std::{
    path::Path,
    rc::Rc,
    time::{Duration, Instant},
};

use chrono::Utc;
use log::{info, warn};

use crate::{
    assistant::{AssistantMode, Conversation},
    document::{
        DocumentId,
        io::{FileIoError, LocalFiles},
        markup::TagStripper,
    },
    pdf::{DocumentDecoder, RenderEvent},
    render::perf::{elapsed_ms, emit_startup_marker},
    session::{Session, SessionOptions},
    settings::{SettingsStore, is_newer_version, schema::Settings},
};

#[derive(Debug, Clone, Default)]
pub struct AssistantPanel {
    pub open: bool,
    pub mode: AssistantMode,
    pub conversation: Conversation,
}

pub struct App {
    settings: SettingsStore,
    session: Session,
    assistant: AssistantPanel,
    files: LocalFiles,
}

impl App {
    pub fn new(settings: SettingsStore) -> Self {
        Self::with_decoder(settings, crate::pdf::default_decoder())
    }

    pub fn with_decoder(settings: SettingsStore, decoder: Rc<dyn DocumentDecoder>) -> Self {
        crate::profile_scope!("app.new");
        let started = Instant::now();

        let session = Session::new(session_options(settings.settings(), decoder));
        let assistant = AssistantPanel {
            open: settings.settings().appearance.show_assistant_panel,
            mode: settings.settings().assistant.default_mode,
            conversation: Conversation::new(),
        };
        emit_startup_marker("app", elapsed_ms(started));

        Self {
            settings,
            session,
            assistant,
            files: LocalFiles::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn settings_store_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn assistant(&self) -> &AssistantPanel {
        &self.assistant
    }

    pub fn open(&mut self, path: &Path) -> Result<DocumentId, FileIoError> {
        self.session.open_path(&self.files, path)
    }

    pub fn save_active(&mut self) -> Result<(), FileIoError> {
        let result = self.session.save_active(&self.files);
        if let Err(err) = &result {
            warn!("save failed, document stays dirty: {err}");
        }
        result
    }

    pub fn toggle_assistant_panel(&mut self) {
        self.assistant.open = !self.assistant.open;
        let open = self.assistant.open;
        self.settings
            .update(|s| s.appearance.show_assistant_panel = open);
    }

    pub fn set_assistant_mode(&mut self, mode: AssistantMode) {
        if self.assistant.mode == mode {
            return;
        }
        self.assistant.mode = mode;
        self.settings.update(|s| s.assistant.default_mode = mode);
        info!("assistant mode set to {}", mode.label());
    }

    pub fn ask(&mut self, query: &str) -> Option<String> {
        let text = self.session.active_plain_text(&TagStripper);
        self.assistant
            .conversation
            .ask(query, &text, self.assistant.mode)
            .map(str::to_string)
    }

    pub fn response_delay(&self) -> Option<Duration> {
        self.settings()
            .assistant
            .simulate_latency
            .then(|| self.assistant.mode.response_delay())
    }

    // Records the check either way; returns true when `available` should be offered.
    pub fn note_available_version(&mut self, available: &str) -> bool {
        let newer = is_newer_version(available, &self.settings().updates.last_seen_version);
        let available = available.trim().to_string();
        self.settings.update(|s| {
            s.updates.last_check_utc = Some(Utc::now());
            if newer {
                s.updates.last_seen_version = available;
            }
        });
        if newer {
            info!("update available: {}", self.settings().updates.last_seen_version);
        }
        newer
    }

    pub fn tick(&mut self) -> Vec<RenderEvent> {
        if let Err(err) = self.settings.flush_if_due() {
            warn!("{err}");
        }
        self.session.poll_renders()
    }

    pub fn shutdown(&mut self) {
        if self.session.has_unsaved_changes() {
            warn!("exiting with unsaved documents");
        }
        if let Err(err) = self.settings.force_flush() {
            warn!("{err}");
        }
    }
}

fn session_options(settings: &Settings, decoder: Rc<dyn DocumentDecoder>) -> SessionOptions {
    SessionOptions {
        text_page_size: settings.viewer.text_page_size.max(1),
        zoom: settings.viewer.zoom_limits(),
        decoder,
    }
}
