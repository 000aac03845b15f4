use super::super::super::messages::Message;
use super::super::super::state::App;
use super::super::Effect;

impl App {
    pub(in crate::app::update) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::PathInputChanged(path) => self.handle_path_input_changed(path),
            Message::UploadRequested => self.handle_upload_requested(&mut effects),
            Message::FileDropped(path) => self.handle_file_dropped(path, &mut effects),
            Message::UploadFinished { request_id, result } => {
                self.handle_upload_finished(request_id, result)
            }

            Message::Play(session) => self.handle_play(session, &mut effects),
            Message::Pause(session) => self.handle_pause(session),
            Message::Stop(session) => self.handle_stop(session),
            Message::WordClicked(index) => self.handle_word_clicked(index, &mut effects),
            Message::UtterancePrepared {
                session,
                request_id,
                word_offset,
                chunks,
                files,
            } => self.handle_utterance_prepared(
                session,
                request_id,
                word_offset,
                chunks,
                files,
                &mut effects,
            ),
            Message::UtteranceFailed {
                session,
                request_id,
                error,
            } => self.handle_utterance_failed(session, request_id, error),
            Message::Tick(now) => self.handle_tick(now, &mut effects),

            Message::DefinitionFetched { request_id, result } => {
                self.handle_definition_fetched(request_id, result)
            }
            Message::ModalClosed => self.handle_modal_closed(&mut effects),

            Message::ToggleTheme => self.handle_toggle_theme(&mut effects),
            Message::ToggleSettings => self.handle_toggle_settings(&mut effects),
            Message::FontSizeChanged(size) => self.handle_font_size_changed(size, &mut effects),
            Message::SpeechRateChanged(rate) => self.handle_speech_rate_changed(rate, &mut effects),
            Message::SpeechVolumeChanged(volume) => {
                self.handle_speech_volume_changed(volume, &mut effects)
            }
            Message::AutoScrollChanged(enabled) => {
                self.handle_auto_scroll_changed(enabled, &mut effects)
            }

            Message::WindowResized { width, height } => self.handle_window_resized(width, height),
            Message::WindowMoved { x, y } => self.handle_window_moved(x, y),
            Message::Scrolled {
                offset,
                viewport_height,
                content_height,
            } => self.handle_scrolled(offset, viewport_height, content_height),
            Message::KeyPressed { key, modifiers } => {
                if let Some(shortcut) = self.shortcut_message_for_key(key, modifiers) {
                    effects.extend(self.reduce(shortcut));
                }
            }
            Message::PollSignals => self.handle_poll_signals(&mut effects),
        }

        effects
    }

    fn handle_poll_signals(&mut self, effects: &mut Vec<Effect>) {
        if crate::take_sigint_requested() {
            effects.push(Effect::QuitSafely);
        }
        if self.scroll.geometry_dirty {
            self.scroll.geometry_dirty = false;
            effects.push(Effect::SaveConfig);
        }
    }
}
