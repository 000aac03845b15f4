use super::super::state::{App, DefinitionStatus, PauseOrigin, SessionKind};
use super::Effect;
use crate::document::parse_markdown;
use crate::text_utils::{trim_word, truncate_chars};
use crate::tokenizer::tokenize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the main session does when the definition modal closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeAction {
    /// Restart the utterance at this word index.
    FromWord(usize),
    /// Un-pause the existing sink where it left off.
    DeviceResume,
    Stay,
}

/// The defined word wins over how the pause happened: looking a word up and
/// then closing the modal reads that word next, whether the pause was
/// automatic or the user paused by hand first. A manual pause with no lookup
/// pending resumes in place. Anything else stays put.
fn resume_action(
    reference: Option<usize>,
    word_count: usize,
    paused: Option<PauseOrigin>,
) -> ResumeAction {
    match (reference, paused) {
        (Some(index), Some(_)) if index < word_count => ResumeAction::FromWord(index),
        (Some(_), Some(_)) => ResumeAction::Stay,
        (None, Some(PauseOrigin::Manual)) => ResumeAction::DeviceResume,
        _ => ResumeAction::Stay,
    }
}

impl App {
    /// A word in the document was clicked: auto-pause main playback, record
    /// the word as the resume point, and ask the backend for a definition.
    pub(super) fn handle_word_clicked(&mut self, index: usize, effects: &mut Vec<Effect>) {
        if !self.document.loaded {
            return;
        }
        let Some(unit) = self.document.words.get(index) else {
            return;
        };
        let word = trim_word(&unit.text).to_string();
        if word.is_empty() {
            return;
        }

        if self.main.is_speaking() {
            if let Some(playback) = self.device.owned_by(SessionKind::Main) {
                playback.pause();
            }
            self.main
                .pause(PauseOrigin::DefinitionLookup, Instant::now());
        }
        self.definition.word_index = Some(index);

        let context = self
            .document
            .block_text_of_word(index)
            .map(|block| truncate_chars(block, self.config.context_chars).to_string())
            .unwrap_or_default();

        self.device.release(SessionKind::Modal);
        self.modal.reset();
        self.definition.open = true;
        self.definition.word = word.clone();
        self.definition.status = DefinitionStatus::Loading;
        self.definition.request_id = self.definition.request_id.wrapping_add(1);

        info!(index, word = %word, "Looking up definition");
        effects.push(Effect::FetchDefinition {
            word,
            context,
            request_id: self.definition.request_id,
        });
    }

    pub(super) fn handle_definition_fetched(
        &mut self,
        request_id: u64,
        result: Result<String, String>,
    ) {
        if !self.definition.open || request_id != self.definition.request_id {
            debug!(request_id, "Dropping definition for a closed or superseded lookup");
            return;
        }
        match result {
            Ok(text) => {
                let blocks = parse_markdown(&text);
                let words: Vec<String> = tokenize(&blocks)
                    .into_iter()
                    .map(|unit| unit.text)
                    .collect();
                self.modal.load_words(words);
                self.definition.status = DefinitionStatus::Ready(text);
            }
            Err(err) => {
                warn!("Definition lookup failed: {err}");
                self.modal.load_words(Vec::new());
                self.definition.status = DefinitionStatus::Failed;
            }
        }
    }

    /// Closing the modal tears down its playback, then applies the resume
    /// policy to the main session.
    pub(super) fn handle_modal_closed(&mut self, effects: &mut Vec<Effect>) {
        self.device.release(SessionKind::Modal);
        self.modal.reset();
        let reference = self.definition.word_index.take();
        self.definition.close();

        match resume_action(reference, self.main.words.len(), self.main.pause_origin()) {
            ResumeAction::FromWord(index) => {
                info!(index, "Resuming main playback from the defined word");
                self.start_from_word(SessionKind::Main, index, effects);
            }
            ResumeAction::DeviceResume => self.handle_play(SessionKind::Main, effects),
            ResumeAction::Stay => {
                if let Some(index) = reference {
                    if index >= self.main.words.len() && self.main.pause_origin().is_some() {
                        warn!(index, "Defined word is no longer in the document; staying paused");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{DefinitionStatus, PlaybackLifecycle};
    use crate::config::AppConfig;
    use crate::speech::{BoundarySchedule, pack_chunks};
    use crate::tokenizer::OffsetMap;
    use std::time::Duration;

    fn fixture() -> App {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.apply_markdown("scan.png".into(), "scan.png".into(), "Cats are great.");
        app
    }

    fn force_speaking(app: &mut App) {
        app.main.begin_utterance(0);
        let tail = app.main.words.clone();
        let map = OffsetMap::from_texts(&tail);
        let chunks = pack_chunks(&tail, 300, 400);
        let durations = vec![Duration::from_secs(1); chunks.len()];
        let schedule = BoundarySchedule::build(&map, &chunks, &durations, Duration::ZERO);
        app.main.attach_prepared(map, schedule, Instant::now());
    }

    #[test]
    fn defined_word_overrides_a_manual_pause() {
        assert_eq!(
            resume_action(Some(1), 3, Some(PauseOrigin::Manual)),
            ResumeAction::FromWord(1)
        );
        assert_eq!(
            resume_action(Some(2), 3, Some(PauseOrigin::DefinitionLookup)),
            ResumeAction::FromWord(2)
        );
    }

    #[test]
    fn stale_reference_stays_paused() {
        assert_eq!(
            resume_action(Some(9), 3, Some(PauseOrigin::DefinitionLookup)),
            ResumeAction::Stay
        );
    }

    #[test]
    fn manual_pause_without_lookup_resumes_in_place() {
        assert_eq!(
            resume_action(None, 3, Some(PauseOrigin::Manual)),
            ResumeAction::DeviceResume
        );
    }

    #[test]
    fn idle_main_stays_idle() {
        assert_eq!(resume_action(None, 3, None), ResumeAction::Stay);
        assert_eq!(resume_action(Some(1), 3, None), ResumeAction::Stay);
    }

    #[test]
    fn click_while_speaking_auto_pauses_and_fetches() {
        let mut app = fixture();
        force_speaking(&mut app);

        let mut effects = Vec::new();
        app.handle_word_clicked(2, &mut effects);

        assert_eq!(app.main.pause_origin(), Some(PauseOrigin::DefinitionLookup));
        assert_eq!(app.definition.word_index, Some(2));
        assert!(app.definition.open);
        // Display token is "great."; the lookup word is bare.
        assert_eq!(app.definition.word, "great");
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::FetchDefinition { word, .. } if word == "great"
        )));
    }

    #[test]
    fn punctuation_only_token_is_ignored() {
        let mut app = fixture();
        app.document.words[1].text = "--".into();
        let mut effects = Vec::new();
        app.handle_word_clicked(1, &mut effects);
        assert!(!app.definition.open);
        assert!(effects.is_empty());
    }

    #[test]
    fn unanswered_lookup_stays_in_its_loading_state() {
        let mut app = fixture();
        let mut effects = Vec::new();
        app.handle_word_clicked(0, &mut effects);
        assert!(app.definition.open);
        assert_eq!(app.definition.status, DefinitionStatus::Loading);

        // Only a fetched result or closing the modal moves it on; time alone
        // never surfaces the failure fallback.
        app.handle_tick(Instant::now() + Duration::from_secs(300), &mut effects);
        assert_eq!(app.definition.status, DefinitionStatus::Loading);
        assert!(app.definition.open);
    }

    #[test]
    fn stale_definition_response_is_dropped() {
        let mut app = fixture();
        let mut effects = Vec::new();
        app.handle_word_clicked(0, &mut effects);
        let old = app.definition.request_id;
        app.handle_word_clicked(1, &mut effects);

        app.handle_definition_fetched(old, Ok("not this one".into()));
        assert_eq!(app.definition.status, DefinitionStatus::Loading);
    }

    #[test]
    fn successful_definition_loads_modal_words() {
        let mut app = fixture();
        let mut effects = Vec::new();
        app.handle_word_clicked(0, &mut effects);

        app.handle_definition_fetched(
            app.definition.request_id,
            Ok("A **cat** is a small animal.".into()),
        );
        assert!(matches!(app.definition.status, DefinitionStatus::Ready(_)));
        assert_eq!(app.modal.words[1], "cat");
    }

    #[test]
    fn closing_the_modal_resumes_from_the_defined_word() {
        let mut app = fixture();
        force_speaking(&mut app);
        let mut effects = Vec::new();
        app.handle_word_clicked(1, &mut effects);

        effects.clear();
        app.handle_modal_closed(&mut effects);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::StartUtterance {
                session: SessionKind::Main,
                word_offset: 1
            }
        )));
        assert_eq!(app.definition.word_index, None);
        assert!(!app.definition.open);
    }

    #[test]
    fn closing_the_modal_with_idle_main_does_nothing() {
        let mut app = fixture();
        let mut effects = Vec::new();
        app.handle_word_clicked(1, &mut effects);

        effects.clear();
        app.handle_modal_closed(&mut effects);
        assert!(effects.is_empty());
        assert_eq!(app.main.lifecycle, PlaybackLifecycle::Idle);
    }
}
