use super::super::state::{App, PauseOrigin, SessionKind};
use super::Effect;
use crate::speech::{BoundarySchedule, UtteranceChunk, is_transient_device_error};
use crate::tokenizer::OffsetMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

impl App {
    /// Play button. On a paused session this is a device-level resume that
    /// keeps the in-progress position; otherwise it starts a fresh utterance
    /// from the beginning of the session's content.
    pub(super) fn handle_play(&mut self, kind: SessionKind, effects: &mut Vec<Effect>) {
        if self.session(kind).is_paused() {
            if let Some(playback) = self.device.owned_by(kind) {
                info!(?kind, "Resuming playback");
                if playback.is_paused() {
                    playback.resume();
                }
                self.session_mut(kind).resume(Instant::now());
            } else {
                // The device was preempted while we were paused; the sink is
                // gone, so restart from the word we were on.
                let from = self.session(kind).current_word.unwrap_or(0);
                info!(?kind, from, "Device lost while paused; restarting from current word");
                self.start_from_word(kind, from, effects);
            }
            return;
        }
        if self.session(kind).is_speaking() {
            return;
        }
        if matches!(
            self.session(kind).lifecycle,
            super::super::state::PlaybackLifecycle::Preparing { .. }
        ) {
            debug!(?kind, "Ignoring play while an utterance is being prepared");
            return;
        }

        if kind == SessionKind::Main {
            if !self.document.loaded {
                return;
            }
            // Fresh playback invalidates the defined-word reference.
            self.definition.word_index = None;
            self.main.load_words(self.document.word_texts());
        }
        self.start_from_word(kind, 0, effects);
    }

    pub(super) fn handle_pause(&mut self, kind: SessionKind) {
        if !self.session(kind).is_speaking() {
            return;
        }
        info!(?kind, "Pausing playback");
        if let Some(playback) = self.device.owned_by(kind) {
            playback.pause();
        }
        self.session_mut(kind).pause(PauseOrigin::Manual, Instant::now());
    }

    /// Stop from any state: cancel the device, clear highlight, and for the
    /// main session drop the defined-word reference.
    pub(super) fn handle_stop(&mut self, kind: SessionKind) {
        info!(?kind, "Stopping playback");
        self.device.release(kind);
        self.session_mut(kind).reset();
        if kind == SessionKind::Main {
            self.definition.word_index = None;
        }
    }

    /// Start (or restart) an utterance over `words[index..]`. An index past
    /// the end of the word list is a stale reference and a logged no-op.
    pub(super) fn start_from_word(
        &mut self,
        kind: SessionKind,
        index: usize,
        effects: &mut Vec<Effect>,
    ) {
        let session = self.session_mut(kind);
        if session.words.is_empty() {
            return;
        }
        if index >= session.words.len() {
            warn!(
                ?kind,
                index,
                words = session.words.len(),
                "Ignoring playback request for out-of-range word"
            );
            return;
        }
        self.device.release(kind);
        let session = self.session_mut(kind);
        session.begin_utterance(index);
        effects.push(Effect::StartUtterance {
            session: kind,
            word_offset: index,
        });
        if kind == SessionKind::Main {
            effects.push(Effect::AutoScrollToCurrent);
        }
    }

    pub(super) fn handle_utterance_prepared(
        &mut self,
        kind: SessionKind,
        request_id: u64,
        word_offset: usize,
        chunks: Vec<UtteranceChunk>,
        files: Vec<(PathBuf, Duration)>,
        effects: &mut Vec<Effect>,
    ) {
        if !self.session(kind).accepts_request(request_id) {
            debug!(?kind, request_id, "Dropping preempted utterance");
            return;
        }
        if files.is_empty() {
            warn!(?kind, "Prepared utterance had no audio; returning to idle");
            self.session_mut(kind).reset();
            return;
        }
        let Some(engine) = self.engine.clone() else {
            self.session_mut(kind).reset();
            return;
        };

        let gap = Duration::from_secs_f32(self.config.pause_between_chunks);
        let volume = self.config.speech_volume;
        let tail = &self.session(kind).words[word_offset..];
        let map = OffsetMap::from_texts(tail);
        let durations: Vec<Duration> = files.iter().map(|(_, d)| *d).collect();
        let schedule = BoundarySchedule::build(&map, &chunks, &durations, gap);
        let paths: Vec<PathBuf> = files.into_iter().map(|(p, _)| p).collect();

        let playback = match engine.play_files(&paths, gap) {
            Ok(playback) => playback,
            Err(err) if is_transient_device_error(&err) && !self.session(kind).retried => {
                warn!(?kind, "Audio device hiccup, retrying once: {err}");
                self.session_mut(kind).retried = true;
                match engine.play_files(&paths, gap) {
                    Ok(playback) => playback,
                    Err(err) => {
                        warn!(?kind, "Retry failed, giving up on this utterance: {err}");
                        self.session_mut(kind).reset();
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(?kind, "Could not start playback: {err}");
                self.session_mut(kind).reset();
                return;
            }
        };
        playback.set_volume(volume);
        info!(
            ?kind,
            word_offset,
            queued = playback.queued(),
            chars = map.total_chars(),
            total_ms = schedule.total_duration().as_millis(),
            "Speaking"
        );

        self.claim_device(kind, playback);
        self.session_mut(kind)
            .attach_prepared(map, schedule, Instant::now());
        if kind == SessionKind::Main {
            effects.push(Effect::AutoScrollToCurrent);
        }
    }

    pub(super) fn handle_utterance_failed(
        &mut self,
        kind: SessionKind,
        request_id: u64,
        error: String,
    ) {
        if !self.session(kind).accepts_request(request_id) {
            // A cancelled synthesis reports an error after preemption; that
            // is the expected "interrupted" class, not a failure.
            debug!(?kind, request_id, "Ignoring error from preempted utterance: {error}");
            return;
        }
        warn!(?kind, "Utterance preparation failed: {error}");
        self.session_mut(kind).reset();
    }

    /// 50 ms heartbeat while speaking: map elapsed playback time to the word
    /// being spoken, and detect the natural end of the utterance.
    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        for kind in [SessionKind::Main, SessionKind::Modal] {
            if !self.session(kind).is_speaking() {
                continue;
            }

            let drained = self
                .device
                .owned_by(kind)
                .map(|playback| playback.is_drained())
                .unwrap_or(true);
            if drained && self.session(kind).finished_at(now) {
                info!(?kind, "Utterance finished");
                self.device.release(kind);
                self.session_mut(kind).finish();
                continue;
            }

            let target = self.session(kind).word_at(now);
            let session = self.session_mut(kind);
            if target != session.current_word {
                session.current_word = target;
                if kind == SessionKind::Main {
                    effects.push(Effect::AutoScrollToCurrent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::PlaybackLifecycle;
    use crate::config::AppConfig;
    use crate::speech::pack_chunks;

    fn fixture_with_document() -> App {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.apply_markdown("scan.png".into(), "scan.png".into(), "Cats are great.");
        app
    }

    /// Put a session into the speaking state without touching a real audio
    /// device, the way the prepared handler would.
    fn force_speaking(app: &mut App, kind: SessionKind, word_offset: usize) {
        let session = app.session_mut(kind);
        session.begin_utterance(word_offset);
        let tail: Vec<String> = session.words[session.word_offset..].to_vec();
        let map = OffsetMap::from_texts(&tail);
        let chunks = pack_chunks(&tail, 300, 400);
        let durations = vec![Duration::from_secs(1); chunks.len()];
        let schedule = BoundarySchedule::build(&map, &chunks, &durations, Duration::ZERO);
        let session = app.session_mut(kind);
        session.attach_prepared(map, schedule, Instant::now());
    }

    #[test]
    fn play_without_a_document_is_a_no_op() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        let mut effects = Vec::new();
        app.handle_play(SessionKind::Main, &mut effects);
        assert!(effects.is_empty());
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
    }

    #[test]
    fn play_starts_an_utterance_from_word_zero() {
        let mut app = fixture_with_document();
        let mut effects = Vec::new();
        app.handle_play(SessionKind::Main, &mut effects);
        assert!(matches!(
            app.main.lifecycle,
            PlaybackLifecycle::Preparing { .. }
        ));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::StartUtterance {
                session: SessionKind::Main,
                word_offset: 0
            }
        )));
    }

    #[test]
    fn out_of_range_start_is_a_no_op() {
        let mut app = fixture_with_document();
        let mut effects = Vec::new();
        app.start_from_word(SessionKind::Main, 99, &mut effects);
        assert!(effects.is_empty());
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
    }

    #[test]
    fn manual_pause_then_play_resumes_in_place() {
        let mut app = fixture_with_document();
        force_speaking(&mut app, SessionKind::Main, 0);
        app.main.current_word = Some(1);

        app.handle_pause(SessionKind::Main);
        assert_eq!(app.main.pause_origin(), Some(PauseOrigin::Manual));

        // No device sink exists in tests, so resume restarts from the
        // current word rather than issuing a fresh utterance from zero.
        let mut effects = Vec::new();
        app.handle_play(SessionKind::Main, &mut effects);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::StartUtterance {
                session: SessionKind::Main,
                word_offset: 1
            }
        )));
        assert_eq!(app.main.current_word, Some(1));
    }

    #[test]
    fn stop_clears_highlight_and_defined_word() {
        let mut app = fixture_with_document();
        force_speaking(&mut app, SessionKind::Main, 1);
        app.definition.word_index = Some(1);

        app.handle_stop(SessionKind::Main);
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
        assert_eq!(app.main.current_word, None);
        assert_eq!(app.definition.word_index, None);
    }

    #[test]
    fn stale_prepared_batches_are_swallowed() {
        let mut app = fixture_with_document();
        app.main.load_words(app.document.word_texts());
        let stale = app.main.begin_utterance(0);
        app.main.begin_utterance(1);

        let mut effects = Vec::new();
        app.handle_utterance_prepared(SessionKind::Main, stale, 0, Vec::new(), Vec::new(), &mut effects);
        // Still preparing the live request; the stale completion changed nothing.
        assert!(app.main.accepts_request(app.main.request_id));
        assert!(effects.is_empty());
    }

    #[test]
    fn failure_on_the_live_request_resets_to_idle() {
        let mut app = fixture_with_document();
        app.main.load_words(app.document.word_texts());
        let live = app.main.begin_utterance(0);
        app.handle_utterance_failed(SessionKind::Main, live, "synthesizer exploded".into());
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
    }

    #[test]
    fn tick_walks_the_highlight_and_finishes_idle() {
        let mut app = fixture_with_document();
        force_speaking(&mut app, SessionKind::Main, 0);
        let start = app.main.started_at.unwrap();

        let mut effects = Vec::new();
        app.handle_tick(start + Duration::from_millis(400), &mut effects);
        assert_eq!(app.main.current_word, Some(1));
        app.handle_tick(start + Duration::from_millis(700), &mut effects);
        assert_eq!(app.main.current_word, Some(2));

        app.handle_tick(start + Duration::from_millis(1100), &mut effects);
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
        assert_eq!(app.main.current_word, None);
    }

    #[test]
    fn only_one_session_speaks_at_a_time() {
        let mut app = fixture_with_document();
        force_speaking(&mut app, SessionKind::Main, 0);
        assert!(app.main.is_speaking());

        // Modal preparation completing would claim the device; simulate the
        // preemption bookkeeping claim_device performs.
        app.modal.load_words(vec!["definition".into(), "words".into()]);
        force_speaking(&mut app, SessionKind::Modal, 0);
        if app.main.is_speaking() {
            app.main.reset();
        }
        let speaking = [&app.main, &app.modal]
            .iter()
            .filter(|s| s.is_speaking())
            .count();
        assert_eq!(speaking, 1);
    }
}
