use super::messages::Message;
use super::state::{
    App, DEFINITION_ERROR_TEXT, DEFINITION_LOADING_TEXT, MAX_FONT_SIZE, MAX_SPEECH_RATE_WPM,
    MAX_SPEECH_VOLUME, MIN_FONT_SIZE, MIN_SPEECH_RATE_WPM, MIN_SPEECH_VOLUME, SessionKind,
};
use crate::document::BlockKind;
use iced::alignment::{Horizontal, Vertical};
use iced::widget::text::{LineHeight, Span, Wrapping};
use iced::widget::{
    Column, Row, button, center, checkbox, column, container, horizontal_space, mouse_area, opaque,
    row, scrollable, slider, stack, text, text_input,
};
use iced::{Background, Element, Length, Padding};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let theme_label = if matches!(self.config.theme, crate::config::ThemeMode::Night) {
            "Day Mode"
        } else {
            "Night Mode"
        };
        let theme_toggle = button(theme_label).on_press(Message::ToggleTheme);
        let settings_toggle = button(if self.config.show_settings {
            "Hide Settings"
        } else {
            "Show Settings"
        })
        .on_press(Message::ToggleSettings);

        let title = if self.document.source_name.is_empty() {
            "Read Along".to_string()
        } else {
            self.document.source_name.clone()
        };

        let toolbar = row![
            theme_toggle,
            settings_toggle,
            text(title),
            horizontal_space(),
            text(self.status_label()),
        ]
        .spacing(10)
        .align_y(Vertical::Center)
        .width(Length::Fill);

        let text_view = scrollable(
            container(self.document_view())
                .width(Length::Fill)
                .padding([self.config.margin_vertical, self.config.margin_horizontal]),
        )
        .on_scroll(|viewport| Message::Scrolled {
            offset: viewport.relative_offset(),
            viewport_height: viewport.bounds().height,
            content_height: viewport.content_bounds().height,
        })
        .id(super::state::TEXT_SCROLL_ID.clone())
        .height(Length::FillPortion(1));

        let mut content: Column<'_, Message> =
            column![toolbar, self.upload_panel(), text_view]
                .padding(16)
                .spacing(12)
                .height(Length::Fill);

        if self.document.loaded {
            content = content.push(self.playback_controls());
        }

        let mut layout: Row<'_, Message> = row![container(content).width(Length::Fill)].spacing(16);
        if self.config.show_settings {
            layout = layout.push(self.settings_panel());
        }

        let base: Element<'_, Message> = layout.into();
        if self.definition.open {
            overlay(base, self.definition_modal(), Message::ModalClosed)
        } else if self.upload.in_flight {
            let card = container(text("Recognizing document..."))
                .padding(16)
                .style(container::rounded_box);
            stack![base, opaque(center(opaque(card)))].into()
        } else {
            base
        }
    }
}

impl App {
    fn status_label(&self) -> String {
        if self.upload.in_flight {
            return "Recognizing document...".to_string();
        }
        let session = if self.definition.open {
            &self.modal
        } else {
            &self.main
        };
        match session.lifecycle {
            super::state::PlaybackLifecycle::Preparing { .. } => "Preparing audio...".to_string(),
            super::state::PlaybackLifecycle::Speaking => "Speaking".to_string(),
            super::state::PlaybackLifecycle::Paused { .. } => "Paused".to_string(),
            super::state::PlaybackLifecycle::Idle => String::new(),
        }
    }

    fn upload_panel(&self) -> Element<'_, Message> {
        let path_field = text_input("Path to a photo or PDF", &self.upload.path_input)
            .on_input(Message::PathInputChanged)
            .on_submit(Message::UploadRequested)
            .width(Length::Fill);

        let upload_button = if self.upload.in_flight {
            button("Uploading...")
        } else {
            button("Upload").on_press(Message::UploadRequested)
        };

        let mut panel = column![
            row![path_field, upload_button]
                .spacing(8)
                .align_y(Vertical::Center)
        ]
        .spacing(4);

        if let Some(error) = &self.upload.error {
            panel = panel.push(text(error.clone()).size(14.0));
        }
        panel.into()
    }

    /// The document body as one rich text run: every word is its own
    /// clickable span so clicks map straight to word indices, and the word
    /// being spoken carries the highlight background.
    fn document_view(&self) -> Element<'_, Message> {
        if !self.document.loaded {
            return text("Upload a photo or a PDF of a document to read along.")
                .size(self.config.font_size as f32)
                .width(Length::Fill)
                .align_x(Horizontal::Left)
                .into();
        }

        let base_size = self.config.font_size as f32;
        let line_height = LineHeight::Relative(self.config.line_spacing);
        let highlight = self.highlight_color();
        let highlighted = self.main.current_word;

        let mut spans: Vec<Span<'_, Message>> = Vec::new();
        let mut word_idx = 0usize;
        for (block_idx, block) in self.document.blocks.iter().enumerate() {
            if block_idx > 0 {
                spans.push(Span::new("\n\n").size(base_size).line_height(line_height));
            }
            let size = match block.kind {
                BlockKind::Heading(level) => heading_size(base_size, level),
                BlockKind::Paragraph | BlockKind::ListItem => base_size,
            };
            if matches!(block.kind, BlockKind::ListItem) {
                spans.push(Span::new("• ").size(size).line_height(line_height));
            }

            let mut first = true;
            while word_idx < self.document.words.len()
                && self.document.words[word_idx].block == block_idx
            {
                let unit = &self.document.words[word_idx];
                if !first {
                    spans.push(Span::new(" ").size(size).line_height(line_height));
                }
                first = false;

                let mut span: Span<'_, Message> = Span::new(unit.text.as_str())
                    .size(size)
                    .line_height(line_height)
                    .link(Message::WordClicked(unit.index));
                if Some(unit.index) == highlighted {
                    span = span
                        .background(Background::Color(highlight))
                        .padding(Padding::from(2u16));
                }
                spans.push(span);
                word_idx += 1;
            }
        }

        let rich: iced::widget::text::Rich<'_, Message> =
            iced::widget::text::Rich::with_spans(spans);
        rich.width(Length::Fill)
            .wrapping(Wrapping::WordOrGlyph)
            .align_x(Horizontal::Left)
            .into()
    }

    fn play_controls(&self, kind: SessionKind) -> Row<'_, Message> {
        let session = self.session(kind);
        let play_or_pause = if session.is_speaking() {
            button("Pause").on_press(Message::Pause(kind))
        } else if session.is_paused() {
            button("Resume").on_press(Message::Play(kind))
        } else {
            button("Play").on_press(Message::Play(kind))
        };
        let stop = if session.is_speaking() || session.is_paused() {
            button("Stop").on_press(Message::Stop(kind))
        } else {
            button("Stop")
        };
        row![play_or_pause, stop].spacing(8).align_y(Vertical::Center)
    }

    fn playback_controls(&self) -> Element<'_, Message> {
        let rate = column![
            text(format!("Rate: {} wpm", self.config.speech_rate_wpm)),
            slider(
                MIN_SPEECH_RATE_WPM as f32..=MAX_SPEECH_RATE_WPM as f32,
                self.config.speech_rate_wpm as f32,
                |value| Message::SpeechRateChanged(value.round() as u32),
            )
            .step(10.0)
        ]
        .spacing(2)
        .width(Length::FillPortion(1));

        let volume = column![
            text(format!("Volume: {:.0}%", self.config.speech_volume * 100.0)),
            slider(
                MIN_SPEECH_VOLUME..=MAX_SPEECH_VOLUME,
                self.config.speech_volume,
                Message::SpeechVolumeChanged,
            )
            .step(0.05)
        ]
        .spacing(2)
        .width(Length::FillPortion(1));

        container(
            row![
                self.play_controls(SessionKind::Main),
                horizontal_space(),
                rate,
                volume,
            ]
            .spacing(16)
            .align_y(Vertical::Center)
            .width(Length::Fill),
        )
        .padding(8)
        .into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let font_slider = slider(
            MIN_FONT_SIZE as f32..=MAX_FONT_SIZE as f32,
            self.config.font_size as f32,
            |value| Message::FontSizeChanged(value.round() as u32),
        );

        let panel = column![
            text("Settings").size(20.0),
            row![
                text(format!("Font: {}", self.config.font_size)),
                font_slider
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            checkbox("Auto-scroll to spoken word", self.config.auto_scroll)
                .on_toggle(Message::AutoScrollChanged),
        ]
        .spacing(12)
        .width(Length::Fixed(280.0));

        container(panel).padding(12).into()
    }

    fn definition_modal(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match &self.definition.status {
            super::state::DefinitionStatus::Loading => text(DEFINITION_LOADING_TEXT).into(),
            super::state::DefinitionStatus::Failed => text(DEFINITION_ERROR_TEXT).into(),
            // A definition that tokenizes to nothing still shows its raw text.
            super::state::DefinitionStatus::Ready(markdown) if self.modal.words.is_empty() => {
                text(markdown.clone()).into()
            }
            super::state::DefinitionStatus::Ready(_) => self.definition_body(),
        };

        let mut controls: Row<'_, Message> = row![].spacing(8).align_y(Vertical::Center);
        if matches!(
            self.definition.status,
            super::state::DefinitionStatus::Ready(_)
        ) && !self.modal.words.is_empty()
        {
            controls = controls.push(self.play_controls(SessionKind::Modal));
        }
        controls = controls.push(horizontal_space());
        controls = controls.push(button("Close").on_press(Message::ModalClosed));

        container(
            column![
                text(self.definition.word.clone()).size(22.0),
                scrollable(body).height(Length::Shrink),
                controls,
            ]
            .spacing(12),
        )
        .width(Length::Fixed(420.0))
        .padding(16)
        .style(container::rounded_box)
        .into()
    }

    /// Definition text rendered word by word so the modal's own playback can
    /// highlight along.
    fn definition_body(&self) -> Element<'_, Message> {
        let highlight = self.highlight_color();
        let highlighted = self.modal.current_word;

        let mut spans: Vec<Span<'_, Message>> = Vec::new();
        for (idx, word) in self.modal.words.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::new(" "));
            }
            let mut span: Span<'_, Message> = Span::new(word.as_str());
            if Some(idx) == highlighted {
                span = span
                    .background(Background::Color(highlight))
                    .padding(Padding::from(2u16));
            }
            spans.push(span);
        }

        let rich: iced::widget::text::Rich<'_, Message> =
            iced::widget::text::Rich::with_spans(spans);
        rich.width(Length::Fill).wrapping(Wrapping::WordOrGlyph).into()
    }
}

fn heading_size(base: f32, level: u8) -> f32 {
    let factor = match level {
        1 => 1.6,
        2 => 1.4,
        3 => 1.25,
        _ => 1.1,
    };
    base * factor
}

/// Standard modal composition: the base view stays visible but inert behind
/// an opaque click-catcher that closes the overlay.
fn overlay<'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base,
        opaque(mouse_area(center(opaque(content))).on_press(on_blur))
    ]
    .into()
}
