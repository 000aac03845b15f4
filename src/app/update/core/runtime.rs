use super::super::super::messages::Message;
use super::super::super::state::{App, TEXT_SCROLL_ID};
use super::super::Effect;
use crate::backend::BackendClient;
use crate::speech::pack_chunks;
use iced::Event;
use iced::Task;
use iced::event;
use iced::keyboard;
use iced::window;
use tracing::{debug, info};

impl App {
    pub(in crate::app::update) fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::SaveConfig => {
                self.save_config();
                Task::none()
            }
            Effect::StartUtterance {
                session: kind,
                word_offset,
            } => {
                let Some(engine) = self.engine.clone() else {
                    self.session_mut(kind).reset();
                    return Task::none();
                };
                let dir = self.speech_dir(kind);
                let soft = self.config.chunk_soft_chars;
                let hard = self.config.chunk_hard_chars;
                let threads = self.config.synth_threads;

                let session = self.session_mut(kind);
                let request_id = session.request_id;
                let tail: Vec<String> = session
                    .words
                    .get(word_offset..)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default();
                if tail.is_empty() {
                    session.reset();
                    return Task::none();
                }
                let cancel = session.cancel.clone();
                let chunks = pack_chunks(&tail, soft, hard);
                info!(
                    ?kind,
                    word_offset,
                    words = tail.len(),
                    chunk_count = chunks.len(),
                    request_id,
                    "Preparing utterance"
                );

                Task::perform(
                    async move {
                        match engine.prepare_utterance(&dir, &chunks, threads, &cancel) {
                            Ok(files) => Message::UtterancePrepared {
                                session: kind,
                                request_id,
                                word_offset,
                                chunks,
                                files,
                            },
                            Err(err) => Message::UtteranceFailed {
                                session: kind,
                                request_id,
                                error: err.to_string(),
                            },
                        }
                    },
                    |msg| msg,
                )
            }
            Effect::UploadFile { path, request_id } => {
                let client = BackendClient::new(&self.config.backend_url);
                let max_bytes = self.config.max_file_mib * 1024 * 1024;
                Task::perform(
                    async move {
                        let result = super::super::upload::run_upload(client, &path, max_bytes)
                            .await
                            .map_err(|err| err.to_string());
                        Message::UploadFinished { request_id, result }
                    },
                    |msg| msg,
                )
            }
            Effect::FetchDefinition {
                word,
                context,
                request_id,
            } => {
                let client = BackendClient::new(&self.config.backend_url);
                Task::perform(
                    async move {
                        let result = client
                            .fetch_definition(&word, &context)
                            .await
                            .map_err(|err| err.to_string());
                        Message::DefinitionFetched { request_id, result }
                    },
                    |msg| msg,
                )
            }
            Effect::AutoScrollToCurrent => {
                if !self.config.auto_scroll {
                    return Task::none();
                }
                if let Some(index) = self.main.current_word {
                    if let Some(offset) = self.scroll_offset_for_word(index) {
                        // Skip the snap when the viewport is already there.
                        if (offset.y - self.scroll.last_offset.y).abs() < 0.005 {
                            return Task::none();
                        }
                        self.scroll.last_offset = offset;
                        return iced::widget::scrollable::snap_to(TEXT_SCROLL_ID.clone(), offset);
                    }
                }
                Task::none()
            }
            Effect::QuitSafely => {
                debug!("Safe quit requested");
                self.save_config();
                self.stop_all_playback();
                iced::exit()
            }
        }
    }
}

pub(super) fn runtime_event_to_message(
    event: Event,
    status: event::Status,
    _window_id: window::Id,
) -> Option<Message> {
    if status == event::Status::Captured {
        return None;
    }
    match event {
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized {
            width: size.width,
            height: size.height,
        }),
        Event::Window(window::Event::Moved(position)) => Some(Message::WindowMoved {
            x: position.x,
            y: position.y,
        }),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            Some(Message::KeyPressed { key, modifiers })
        }
        _ => None,
    }
}
