use crate::speech::UtteranceChunk;
use iced::keyboard::{Key, Modifiers};
use iced::widget::scrollable::RelativeOffset;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::state::SessionKind;

/// Messages emitted by the UI.
#[derive(Debug, Clone)]
pub enum Message {
    // Upload flow.
    PathInputChanged(String),
    UploadRequested,
    FileDropped(PathBuf),
    UploadFinished {
        request_id: u64,
        result: Result<String, String>,
    },

    // Playback, for either the main document or the definition modal.
    Play(SessionKind),
    Pause(SessionKind),
    Stop(SessionKind),
    WordClicked(usize),
    UtterancePrepared {
        session: SessionKind,
        request_id: u64,
        word_offset: usize,
        chunks: Vec<UtteranceChunk>,
        files: Vec<(PathBuf, Duration)>,
    },
    UtteranceFailed {
        session: SessionKind,
        request_id: u64,
        error: String,
    },
    Tick(Instant),

    // Definition modal.
    DefinitionFetched {
        request_id: u64,
        result: Result<String, String>,
    },
    ModalClosed,

    // Settings.
    ToggleTheme,
    ToggleSettings,
    FontSizeChanged(u32),
    SpeechRateChanged(u32),
    SpeechVolumeChanged(f32),
    AutoScrollChanged(bool),

    // Window and input plumbing.
    WindowResized {
        width: f32,
        height: f32,
    },
    WindowMoved {
        x: f32,
        y: f32,
    },
    Scrolled {
        offset: RelativeOffset,
        viewport_height: f32,
        content_height: f32,
    },
    KeyPressed {
        key: Key,
        modifiers: Modifiers,
    },
    PollSignals,
}
