use crate::cancellation::CancellationToken;
use crate::speech::{BoundarySchedule, Playback};
use crate::tokenizer::OffsetMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Which of the two playback surfaces a session drives. The sessions are
/// never shared; only the audio device underneath them is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Main,
    Modal,
}

/// Why a session is paused. Resuming behaves differently for each: a manual
/// pause continues in place, a definition pause restarts from the clicked
/// word when the modal closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOrigin {
    Manual,
    DefinitionLookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackLifecycle {
    Idle,
    Preparing { request_id: u64 },
    Speaking,
    Paused { origin: PauseOrigin },
}

/// One word-synchronized playback session.
///
/// `words` is the session's full word list; an utterance may cover only the
/// tail `words[word_offset..]`, in which case `offset_map` and `schedule` are
/// relative to that tail and boundary indices are shifted back up by
/// `word_offset` before highlighting.
pub struct PlaybackSession {
    pub(in crate::app) kind: SessionKind,
    pub(in crate::app) lifecycle: PlaybackLifecycle,
    pub(in crate::app) words: Vec<String>,
    pub(in crate::app) word_offset: usize,
    pub(in crate::app) offset_map: OffsetMap,
    pub(in crate::app) schedule: BoundarySchedule,
    pub(in crate::app) current_word: Option<usize>,
    pub(in crate::app) started_at: Option<Instant>,
    pub(in crate::app) elapsed: Duration,
    pub(in crate::app) request_id: u64,
    pub(in crate::app) retried: bool,
    pub(in crate::app) cancel: CancellationToken,
}

impl PlaybackSession {
    pub(in crate::app) fn new(kind: SessionKind) -> Self {
        Self {
            kind,
            lifecycle: PlaybackLifecycle::Idle,
            words: Vec::new(),
            word_offset: 0,
            offset_map: OffsetMap::default(),
            schedule: BoundarySchedule::default(),
            current_word: None,
            started_at: None,
            elapsed: Duration::ZERO,
            request_id: 0,
            retried: false,
            cancel: CancellationToken::new(),
        }
    }

    pub(in crate::app) fn is_speaking(&self) -> bool {
        matches!(self.lifecycle, PlaybackLifecycle::Speaking)
    }

    pub(in crate::app) fn is_paused(&self) -> bool {
        matches!(self.lifecycle, PlaybackLifecycle::Paused { .. })
    }

    pub(in crate::app) fn pause_origin(&self) -> Option<PauseOrigin> {
        match self.lifecycle {
            PlaybackLifecycle::Paused { origin } => Some(origin),
            _ => None,
        }
    }

    pub(in crate::app) fn load_words(&mut self, words: Vec<String>) {
        self.reset();
        self.words = words;
    }

    /// Begin a new utterance over `words[word_offset..]`. Cancels whatever
    /// synthesis the previous request may still be running and returns the
    /// fresh request id for staleness checks. An out-of-range offset leaves
    /// the session untouched and returns the current id.
    pub(in crate::app) fn begin_utterance(&mut self, word_offset: usize) -> u64 {
        if word_offset >= self.words.len() {
            warn!(
                kind = ?self.kind,
                word_offset,
                words = self.words.len(),
                "Refusing utterance past the end of the word list"
            );
            return self.request_id;
        }
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.request_id = self.request_id.wrapping_add(1);
        self.word_offset = word_offset;
        self.current_word = Some(self.word_offset);
        self.offset_map = OffsetMap::default();
        self.schedule = BoundarySchedule::default();
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.retried = false;
        self.lifecycle = PlaybackLifecycle::Preparing {
            request_id: self.request_id,
        };
        debug!(
            kind = ?self.kind,
            word_offset = self.word_offset,
            request_id = self.request_id,
            "New utterance request"
        );
        self.request_id
    }

    /// Whether a completed preparation still belongs to the live request.
    /// Stale completions are the "interrupted" error class and are swallowed.
    pub(in crate::app) fn accepts_request(&self, request_id: u64) -> bool {
        matches!(
            self.lifecycle,
            PlaybackLifecycle::Preparing { request_id: live } if live == request_id
        )
    }

    /// Attach the prepared utterance's timing data and start speaking.
    pub(in crate::app) fn attach_prepared(
        &mut self,
        map: OffsetMap,
        schedule: BoundarySchedule,
        now: Instant,
    ) {
        self.offset_map = map;
        self.schedule = schedule;
        self.current_word = Some(self.word_offset);
        self.elapsed = Duration::ZERO;
        self.started_at = Some(now);
        self.lifecycle = PlaybackLifecycle::Speaking;
    }

    pub(in crate::app) fn pause(&mut self, origin: PauseOrigin, now: Instant) {
        if !self.is_speaking() {
            return;
        }
        if let Some(started) = self.started_at.take() {
            self.elapsed += now.saturating_duration_since(started);
        }
        self.lifecycle = PlaybackLifecycle::Paused { origin };
    }

    pub(in crate::app) fn resume(&mut self, now: Instant) {
        if !self.is_paused() {
            return;
        }
        self.started_at = Some(now);
        self.lifecycle = PlaybackLifecycle::Speaking;
    }

    /// Playback time spent speaking, excluding paused stretches.
    pub(in crate::app) fn elapsed_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self.elapsed + now.saturating_duration_since(started),
            None => self.elapsed,
        }
    }

    /// Word index being spoken at `now`, in full-list coordinates.
    pub(in crate::app) fn word_at(&self, now: Instant) -> Option<usize> {
        let offset = self.schedule.offset_at(self.elapsed_at(now));
        self.offset_map
            .index_for_offset(offset)
            .map(|idx| idx + self.word_offset)
    }

    pub(in crate::app) fn finished_at(&self, now: Instant) -> bool {
        !self.schedule.is_empty() && self.schedule.finished(self.elapsed_at(now))
    }

    /// Natural end: back to idle with no highlighted word.
    pub(in crate::app) fn finish(&mut self) {
        self.cancel.cancel();
        self.lifecycle = PlaybackLifecycle::Idle;
        self.word_offset = 0;
        self.current_word = None;
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.offset_map = OffsetMap::default();
        self.schedule = BoundarySchedule::default();
    }

    /// Full stop from any state, keeping the loaded word list.
    pub(in crate::app) fn reset(&mut self) {
        self.finish();
        self.retried = false;
    }
}

/// The single audio device both sessions compete for. Acquiring it for one
/// session stops whatever the other was playing; the preempted session's
/// state is adjusted by the caller (see `App::claim_device`).
#[derive(Default)]
pub struct SharedDevice {
    pub(in crate::app) playback: Option<Playback>,
    pub(in crate::app) owner: Option<SessionKind>,
}

impl SharedDevice {
    /// Take the device for `owner`, stopping the previous utterance. Returns
    /// the preempted session kind when a different session held the device.
    pub(in crate::app) fn acquire(
        &mut self,
        owner: SessionKind,
        playback: Playback,
    ) -> Option<SessionKind> {
        let preempted = self.owner.take().filter(|prev| *prev != owner);
        if let Some(old) = self.playback.take() {
            old.stop();
        }
        self.playback = Some(playback);
        self.owner = Some(owner);
        preempted
    }

    pub(in crate::app) fn release(&mut self, owner: SessionKind) {
        if self.owner == Some(owner) {
            if let Some(playback) = self.playback.take() {
                playback.stop();
            }
            self.owner = None;
        }
    }

    pub(in crate::app) fn owned_by(&self, owner: SessionKind) -> Option<&Playback> {
        if self.owner == Some(owner) {
            self.playback.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::pack_chunks;

    fn words(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    /// Build a session speaking `list[word_offset..]` with one second per
    /// chunk, mirroring what the prepared-utterance handler does.
    fn speaking_session(list: &[&str], word_offset: usize, now: Instant) -> PlaybackSession {
        let mut session = PlaybackSession::new(SessionKind::Main);
        session.load_words(words(list));
        session.begin_utterance(word_offset);
        let tail: Vec<String> = session.words[session.word_offset..].to_vec();
        let map = OffsetMap::from_texts(&tail);
        let chunks = pack_chunks(&tail, 300, 400);
        let durations = vec![Duration::from_secs(1); chunks.len()];
        let schedule = BoundarySchedule::build(&map, &chunks, &durations, Duration::ZERO);
        session.attach_prepared(map, schedule, now);
        session
    }

    #[test]
    fn fresh_session_is_idle() {
        let session = PlaybackSession::new(SessionKind::Modal);
        assert_eq!(session.lifecycle, PlaybackLifecycle::Idle);
        assert_eq!(session.current_word, None);
    }

    #[test]
    fn resume_from_word_highlights_that_word_immediately() {
        let list = ["Cats", "are", "great."];
        for idx in 0..list.len() {
            let now = Instant::now();
            let session = speaking_session(&list, idx, now);
            assert_eq!(session.current_word, Some(idx));
            assert_eq!(session.word_at(now), Some(idx));
        }
    }

    #[test]
    fn three_word_document_walks_every_index_then_finishes() {
        let start = Instant::now();
        // One chunk of one second; boundaries fall at 0, 5/15 and 9/15 of it.
        let mut session = speaking_session(&["Cats", "are", "great."], 0, start);
        assert_eq!(session.word_at(start), Some(0));
        assert_eq!(session.word_at(start + Duration::from_millis(400)), Some(1));
        assert_eq!(session.word_at(start + Duration::from_millis(700)), Some(2));
        assert!(session.finished_at(start + Duration::from_millis(1001)));

        session.finish();
        assert_eq!(session.lifecycle, PlaybackLifecycle::Idle);
        assert_eq!(session.current_word, None);
        assert_eq!(session.word_offset, 0);
    }

    #[test]
    fn pause_freezes_elapsed_and_resume_continues() {
        let start = Instant::now();
        let mut session = speaking_session(&["one", "two"], 0, start);
        session.pause(PauseOrigin::Manual, start + Duration::from_millis(300));
        assert_eq!(session.pause_origin(), Some(PauseOrigin::Manual));
        // Paused time does not advance playback.
        assert_eq!(
            session.elapsed_at(start + Duration::from_secs(60)),
            Duration::from_millis(300)
        );

        let resumed_at = start + Duration::from_secs(60);
        session.resume(resumed_at);
        assert!(session.is_speaking());
        assert_eq!(
            session.elapsed_at(resumed_at + Duration::from_millis(100)),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn pause_is_a_no_op_unless_speaking() {
        let mut session = PlaybackSession::new(SessionKind::Main);
        session.pause(PauseOrigin::Manual, Instant::now());
        assert_eq!(session.lifecycle, PlaybackLifecycle::Idle);
    }

    #[test]
    fn stale_request_ids_are_rejected() {
        let mut session = PlaybackSession::new(SessionKind::Main);
        session.load_words(words(&["a", "b"]));
        let first = session.begin_utterance(0);
        let second = session.begin_utterance(1);
        assert_ne!(first, second);
        assert!(!session.accepts_request(first));
        assert!(session.accepts_request(second));
    }

    #[test]
    fn begin_utterance_cancels_the_previous_token() {
        let mut session = PlaybackSession::new(SessionKind::Main);
        session.load_words(words(&["a", "b"]));
        session.begin_utterance(0);
        let stale = session.cancel.clone();
        session.begin_utterance(0);
        assert!(stale.is_cancelled());
        assert!(!session.cancel.is_cancelled());
    }

    #[test]
    fn out_of_range_begin_leaves_the_session_untouched() {
        let mut session = PlaybackSession::new(SessionKind::Main);
        session.load_words(words(&["a", "b"]));
        let live = session.begin_utterance(0);
        let token = session.cancel.clone();

        assert_eq!(session.begin_utterance(2), live);
        assert!(session.accepts_request(live));
        assert!(!token.is_cancelled());

        let mut empty = PlaybackSession::new(SessionKind::Modal);
        assert_eq!(empty.begin_utterance(0), 0);
        assert_eq!(empty.lifecycle, PlaybackLifecycle::Idle);
    }

    #[test]
    fn acquiring_the_device_reports_the_preempted_owner() {
        let mut device = SharedDevice::default();
        assert_eq!(device.owner, None);
        // No real sinks in tests; ownership bookkeeping alone is enough to
        // prove that at most one session ever holds the device.
        device.owner = Some(SessionKind::Main);
        let preempted = device.owner.take().filter(|prev| *prev != SessionKind::Modal);
        assert_eq!(preempted, Some(SessionKind::Main));
    }

    #[test]
    fn releasing_someone_elses_device_changes_nothing() {
        let mut device = SharedDevice::default();
        device.owner = Some(SessionKind::Main);
        device.release(SessionKind::Modal);
        assert_eq!(device.owner, Some(SessionKind::Main));
        device.release(SessionKind::Main);
        assert_eq!(device.owner, None);
    }
}
