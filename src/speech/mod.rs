//! Native speech stack: voice discovery, utterance chunking, synthesis, and
//! playback timing.

pub mod engine;
pub mod timing;
pub mod voice;

pub use engine::{Playback, SpeechEngine, is_transient_device_error};
pub use timing::{BoundarySchedule, UtteranceChunk, pack_chunks};
pub use voice::{
    SelectionRules, SynthBackend, SystemVoiceCatalog, Voice, VoiceCatalog, bucket_for,
    cached_or_select, pick_voice,
};
