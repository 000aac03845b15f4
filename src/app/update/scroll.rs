use super::super::state::App;
use iced::widget::scrollable::RelativeOffset;

impl App {
    pub(super) fn handle_scrolled(
        &mut self,
        offset: RelativeOffset,
        viewport_height: f32,
        content_height: f32,
    ) {
        self.scroll.last_offset = sanitize_offset(offset);
        self.scroll.viewport_height = finite_or_zero(viewport_height);
        self.scroll.content_height = finite_or_zero(content_height);
    }

    /// Geometry changes persist through the debounced save on the next
    /// signal poll, not on every drag event.
    pub(super) fn handle_window_resized(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.config.window_width = width;
            self.config.window_height = height;
            self.scroll.geometry_dirty = true;
        }
    }

    pub(super) fn handle_window_moved(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.config.window_pos_x = Some(x);
            self.config.window_pos_y = Some(y);
            self.scroll.geometry_dirty = true;
        }
    }

    /// Estimate where to scroll so the word at `index` sits about a third of
    /// the way down the viewport. The estimate weights words by their text
    /// length, which tracks rendered height closely enough for auto-scroll.
    /// `None` when the content already fits on screen.
    pub(super) fn scroll_offset_for_word(&self, index: usize) -> Option<RelativeOffset> {
        let words = &self.document.words;
        if words.is_empty() || index >= words.len() {
            return None;
        }
        let viewport = self.scroll.viewport_height;
        let content = self.scroll.content_height;
        if content > 0.0 && content <= viewport {
            return None;
        }

        let total: usize = words.iter().map(|w| w.text.chars().count() + 1).sum();
        let before: usize = words[..index]
            .iter()
            .map(|w| w.text.chars().count() + 1)
            .sum();
        let word_fraction = before as f32 / total.max(1) as f32;

        let y = if content > viewport && viewport > 0.0 {
            ((word_fraction * content - viewport / 3.0) / (content - viewport)).clamp(0.0, 1.0)
        } else {
            word_fraction.clamp(0.0, 1.0)
        };
        Some(RelativeOffset { x: 0.0, y })
    }
}

fn sanitize_offset(offset: RelativeOffset) -> RelativeOffset {
    RelativeOffset {
        x: finite_or_zero(offset.x).clamp(0.0, 1.0),
        y: finite_or_zero(offset.y).clamp(0.0, 1.0),
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn fixture() -> App {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        let paragraphs: Vec<String> = (0..40)
            .map(|i| format!("Paragraph number {i} with a handful of words."))
            .collect();
        app.apply_markdown("scan.png".into(), "scan.png".into(), &paragraphs.join("\n\n"));
        app
    }

    #[test]
    fn short_content_never_scrolls() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.apply_markdown("scan.png".into(), "scan.png".into(), "Cats are great.");
        app.handle_scrolled(RelativeOffset::START, 800.0, 200.0);
        assert_eq!(app.scroll_offset_for_word(1), None);
    }

    #[test]
    fn offsets_grow_with_word_position() {
        let mut app = fixture();
        app.handle_scrolled(RelativeOffset::START, 400.0, 4000.0);
        let early = app.scroll_offset_for_word(0).unwrap();
        let mid = app.scroll_offset_for_word(app.document.words.len() / 2).unwrap();
        let late = app.scroll_offset_for_word(app.document.words.len() - 1).unwrap();
        assert!(early.y <= mid.y);
        assert!(mid.y < late.y);
        assert!((0.0..=1.0).contains(&late.y));
    }

    #[test]
    fn out_of_range_word_yields_no_offset() {
        let app = fixture();
        assert_eq!(app.scroll_offset_for_word(usize::MAX), None);
    }

    #[test]
    fn window_geometry_marks_config_dirty() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        app.handle_window_resized(1024.0, 768.0);
        assert_eq!(app.config.window_width, 1024.0);
        assert!(app.scroll.geometry_dirty);

        app.scroll.geometry_dirty = false;
        app.handle_window_resized(f32::NAN, 500.0);
        assert!(!app.scroll.geometry_dirty);
    }
}
