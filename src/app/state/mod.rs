mod constants;
mod document;
mod playback;
mod ui;

use crate::config::{AppConfig, ThemeMode};
use crate::document::parse_markdown;
use crate::speech::{
    SelectionRules, SpeechEngine, SystemVoiceCatalog, VoiceCatalog, bucket_for, cached_or_select,
};
use crate::tokenizer::tokenize;
use iced::{Color, Task};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::messages::Message;

pub(crate) use constants::*;
pub(in crate::app) use document::DocumentState;
pub use playback::SessionKind;
pub(in crate::app) use playback::{PauseOrigin, PlaybackLifecycle, PlaybackSession, SharedDevice};
pub(in crate::app) use ui::{DefinitionState, DefinitionStatus, ScrollState, UploadState};

/// Build the speech engine from config: probe a synthesizer, then pick the
/// best English voice through the platform rule tables. `None` leaves the
/// app usable for reading without audio.
fn engine_from_config(config: &AppConfig) -> Option<SpeechEngine> {
    let catalog = match SystemVoiceCatalog::probe(&config.synth_command) {
        Ok(catalog) => catalog,
        Err(err) => {
            warn!("Speech disabled: {err}");
            return None;
        }
    };
    let rules = SelectionRules::for_bucket(bucket_for(catalog.backend()))
        .with_overrides(&config.preferred_voices);
    let voice = match cached_or_select(&catalog, &rules) {
        Ok(voice) => voice,
        Err(err) => {
            warn!("Voice selection failed, using synthesizer default: {err}");
            None
        }
    };
    Some(SpeechEngine::new(
        catalog.program.clone(),
        catalog.backend(),
        voice,
        config.speech_rate_wpm,
    ))
}

/// Core application state composed of sub-models.
pub struct App {
    pub(super) config: AppConfig,
    pub(super) document: DocumentState,
    pub(super) upload: UploadState,
    pub(super) definition: DefinitionState,
    pub(super) main: PlaybackSession,
    pub(super) modal: PlaybackSession,
    pub(super) device: SharedDevice,
    pub(super) engine: Option<SpeechEngine>,
    pub(super) scroll: ScrollState,
}

impl App {
    pub(super) fn bootstrap(
        mut config: AppConfig,
        initial_document: Option<PathBuf>,
    ) -> (App, Task<Message>) {
        clamp_config(&mut config);
        let engine = engine_from_config(&config);
        let mut app = App {
            document: DocumentState::empty(),
            upload: UploadState::new(),
            definition: DefinitionState::new(),
            main: PlaybackSession::new(SessionKind::Main),
            modal: PlaybackSession::new(SessionKind::Modal),
            device: SharedDevice::default(),
            engine,
            scroll: ScrollState::new(),
            config,
        };
        info!(
            backend = %app.config.backend_url,
            speech = app.engine.is_some(),
            "Initialized app state"
        );

        let init_task = match initial_document {
            Some(path) => {
                app.upload.path_input = path.display().to_string();
                Task::done(Message::UploadRequested)
            }
            None => Task::none(),
        };
        (app, init_task)
    }

    pub(super) fn session(&self, kind: SessionKind) -> &PlaybackSession {
        match kind {
            SessionKind::Main => &self.main,
            SessionKind::Modal => &self.modal,
        }
    }

    pub(super) fn session_mut(&mut self, kind: SessionKind) -> &mut PlaybackSession {
        match kind {
            SessionKind::Main => &mut self.main,
            SessionKind::Modal => &mut self.modal,
        }
    }

    /// Hand the device to `kind`. The preempted session loses its utterance:
    /// if it was speaking it falls back to idle; if it was paused its state
    /// stays (the resume policy restarts it from a word index later).
    pub(super) fn claim_device(
        &mut self,
        kind: SessionKind,
        playback: crate::speech::Playback,
    ) {
        if let Some(preempted) = self.device.acquire(kind, playback) {
            let session = self.session_mut(preempted);
            if session.is_speaking() {
                info!(?preempted, "Preempting active session");
                session.reset();
            }
        }
    }

    /// Stop everything touching the audio device; both sessions go idle.
    pub(super) fn stop_all_playback(&mut self) {
        if let Some(playback) = self.device.playback.take() {
            playback.stop();
        }
        self.device.owner = None;
        self.main.reset();
        self.modal.reset();
        self.definition.word_index = None;
    }

    /// Replace the document with freshly OCR'd markdown.
    pub(super) fn apply_markdown(&mut self, source_key: String, source_name: String, markdown: &str) {
        self.stop_all_playback();
        self.definition.close();
        self.document.blocks = parse_markdown(markdown);
        self.document.words = tokenize(&self.document.blocks);
        self.document.source_key = source_key;
        self.document.source_name = source_name;
        self.document.loaded = !self.document.words.is_empty();
        self.main.load_words(self.document.word_texts());
        info!(
            blocks = self.document.blocks.len(),
            words = self.document.words.len(),
            "Document ready"
        );
    }

    pub(super) fn cache_root(&self) -> PathBuf {
        PathBuf::from(&self.config.cache_dir)
    }

    /// Where synthesized audio for a session's content goes.
    pub(super) fn speech_dir(&self, kind: SessionKind) -> PathBuf {
        let key = match kind {
            SessionKind::Main if !self.document.source_key.is_empty() => {
                self.document.source_key.as_str()
            }
            SessionKind::Main => "untitled",
            SessionKind::Modal => "definitions",
        };
        crate::cache::speech_dir(&self.cache_root(), key)
    }

    pub(super) fn save_config(&self) {
        if let Err(err) = crate::config::save_config(Path::new("conf/config.toml"), &self.config) {
            warn!("Failed to persist config: {err}");
        }
    }

    pub(super) fn highlight_color(&self) -> Color {
        let base = if matches!(self.config.theme, ThemeMode::Night) {
            self.config.night_highlight
        } else {
            self.config.day_highlight
        };
        Color {
            r: base.r,
            g: base.g,
            b: base.b,
            a: base.a,
        }
    }
}

fn clamp_config(config: &mut AppConfig) {
    config.font_size = config.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    config.line_spacing = config.line_spacing.clamp(0.8, 2.5);
    config.window_width = config.window_width.clamp(320.0, 7680.0);
    config.window_height = config.window_height.clamp(240.0, 4320.0);
    config.window_pos_x = config.window_pos_x.filter(|v| v.is_finite());
    config.window_pos_y = config.window_pos_y.filter(|v| v.is_finite());
    config.max_file_mib = config.max_file_mib.clamp(1, 500);
    config.context_chars = config.context_chars.clamp(50, 4000);
    config.speech_rate_wpm = config
        .speech_rate_wpm
        .clamp(MIN_SPEECH_RATE_WPM, MAX_SPEECH_RATE_WPM);
    config.speech_volume = config.speech_volume.clamp(MIN_SPEECH_VOLUME, MAX_SPEECH_VOLUME);
    config.chunk_soft_chars = config.chunk_soft_chars.clamp(40, 2000);
    config.chunk_hard_chars = config.chunk_hard_chars.max(config.chunk_soft_chars);
    config.pause_between_chunks = config.pause_between_chunks.clamp(0.0, 2.0);
    config.synth_threads = config.synth_threads.clamp(1, 32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_keeps_config_in_range() {
        let mut config = AppConfig::default();
        config.font_size = 200;
        config.max_file_mib = 0;
        config.context_chars = 10;
        config.chunk_soft_chars = 1000;
        config.chunk_hard_chars = 100;
        clamp_config(&mut config);
        assert_eq!(config.font_size, MAX_FONT_SIZE);
        assert_eq!(config.max_file_mib, 1);
        assert_eq!(config.context_chars, 50);
        assert!(config.chunk_hard_chars >= config.chunk_soft_chars);
    }

    #[test]
    fn applying_markdown_loads_words_and_shows_controls() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.apply_markdown("scan.png".into(), "scan.png".into(), "Cats are great.");
        assert!(app.document.loaded);
        assert_eq!(app.main.words, vec!["Cats", "are", "great."]);
        assert_eq!(app.document.words[1].text, "are");
    }

    #[test]
    fn empty_markdown_keeps_controls_hidden() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.apply_markdown("blank.png".into(), "blank.png".into(), "   \n\n ");
        assert!(!app.document.loaded);
    }
}
