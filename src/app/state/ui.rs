use iced::widget::scrollable::RelativeOffset;

/// Upload panel model: the path being typed, the in-flight request, and the
/// inline error channel.
pub struct UploadState {
    pub(in crate::app) path_input: String,
    pub(in crate::app) in_flight: bool,
    pub(in crate::app) error: Option<String>,
    pub(in crate::app) request_id: u64,
    /// Cache key and display name of the file the in-flight request is for.
    pub(in crate::app) pending_source: Option<(String, String)>,
}

impl UploadState {
    pub(in crate::app) fn new() -> Self {
        Self {
            path_input: String::new(),
            in_flight: false,
            error: None,
            request_id: 0,
            pending_source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionStatus {
    Loading,
    Ready(String),
    Failed,
}

/// Definition modal model. `word_index` doubles as the defined-word
/// reference: the main session resumes from it when the modal closes.
pub struct DefinitionState {
    pub(in crate::app) open: bool,
    pub(in crate::app) word: String,
    pub(in crate::app) word_index: Option<usize>,
    pub(in crate::app) status: DefinitionStatus,
    pub(in crate::app) request_id: u64,
}

impl DefinitionState {
    pub(in crate::app) fn new() -> Self {
        Self {
            open: false,
            word: String::new(),
            word_index: None,
            status: DefinitionStatus::Loading,
            request_id: 0,
        }
    }

    pub(in crate::app) fn close(&mut self) {
        self.open = false;
        self.word.clear();
        self.status = DefinitionStatus::Loading;
    }
}

/// Viewport bookkeeping for auto-scroll and geometry persistence.
pub struct ScrollState {
    pub(in crate::app) last_offset: RelativeOffset,
    pub(in crate::app) viewport_height: f32,
    pub(in crate::app) content_height: f32,
    pub(in crate::app) geometry_dirty: bool,
}

impl ScrollState {
    pub(in crate::app) fn new() -> Self {
        Self {
            last_offset: RelativeOffset::START,
            viewport_height: 0.0,
            content_height: 0.0,
            geometry_dirty: false,
        }
    }
}
