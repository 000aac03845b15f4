use super::state::SessionKind;
use std::path::PathBuf;

mod appearance;
mod core;
mod definition;
mod playback;
mod scroll;
mod upload;

/// Describes work that must be performed outside the pure reducer.
pub(super) enum Effect {
    SaveConfig,
    StartUtterance {
        session: SessionKind,
        word_offset: usize,
    },
    UploadFile {
        path: PathBuf,
        request_id: u64,
    },
    FetchDefinition {
        word: String,
        context: String,
        request_id: u64,
    },
    AutoScrollToCurrent,
    QuitSafely,
}
