use super::super::state::{
    App, MAX_FONT_SIZE, MAX_SPEECH_RATE_WPM, MAX_SPEECH_VOLUME, MIN_FONT_SIZE,
    MIN_SPEECH_RATE_WPM, MIN_SPEECH_VOLUME,
};
use super::Effect;
use crate::config::ThemeMode;
use tracing::info;

impl App {
    pub(super) fn handle_toggle_theme(&mut self, effects: &mut Vec<Effect>) {
        self.config.theme = match self.config.theme {
            ThemeMode::Day => ThemeMode::Night,
            ThemeMode::Night => ThemeMode::Day,
        };
        info!(theme = %self.config.theme, "Switched theme");
        effects.push(Effect::SaveConfig);
    }

    pub(super) fn handle_toggle_settings(&mut self, effects: &mut Vec<Effect>) {
        self.config.show_settings = !self.config.show_settings;
        effects.push(Effect::SaveConfig);
    }

    pub(super) fn handle_font_size_changed(&mut self, size: u32, effects: &mut Vec<Effect>) {
        self.config.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        effects.push(Effect::SaveConfig);
    }

    /// Rate changes apply from the next utterance onward; the one currently
    /// playing keeps its audio.
    pub(super) fn handle_speech_rate_changed(&mut self, rate: u32, effects: &mut Vec<Effect>) {
        let rate = rate.clamp(MIN_SPEECH_RATE_WPM, MAX_SPEECH_RATE_WPM);
        if rate == self.config.speech_rate_wpm {
            return;
        }
        self.config.speech_rate_wpm = rate;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_rate(rate);
        }
        effects.push(Effect::SaveConfig);
    }

    /// Volume applies to the live sink immediately.
    pub(super) fn handle_speech_volume_changed(&mut self, volume: f32, effects: &mut Vec<Effect>) {
        let volume = volume.clamp(MIN_SPEECH_VOLUME, MAX_SPEECH_VOLUME);
        self.config.speech_volume = volume;
        if let Some(playback) = self.device.playback.as_ref() {
            playback.set_volume(volume);
        }
        effects.push(Effect::SaveConfig);
    }

    pub(super) fn handle_auto_scroll_changed(&mut self, enabled: bool, effects: &mut Vec<Effect>) {
        self.config.auto_scroll = enabled;
        effects.push(Effect::SaveConfig);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn theme_toggle_flips_and_persists() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        let mut effects = Vec::new();
        app.handle_toggle_theme(&mut effects);
        assert_eq!(app.config.theme, ThemeMode::Day);
        assert!(matches!(effects[0], Effect::SaveConfig));
    }

    #[test]
    fn sliders_clamp_to_their_ranges() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        let mut effects = Vec::new();

        app.handle_font_size_changed(500, &mut effects);
        assert_eq!(app.config.font_size, MAX_FONT_SIZE);

        app.handle_speech_rate_changed(10_000, &mut effects);
        assert_eq!(app.config.speech_rate_wpm, MAX_SPEECH_RATE_WPM);

        app.handle_speech_volume_changed(-1.0, &mut effects);
        assert_eq!(app.config.speech_volume, MIN_SPEECH_VOLUME);
    }

    #[test]
    fn unchanged_rate_does_not_rewrite_config() {
        let (mut app, _) = App::bootstrap(AppConfig::default(), None);
        let rate = app.config.speech_rate_wpm;
        let mut effects = Vec::new();
        app.handle_speech_rate_changed(rate, &mut effects);
        assert!(effects.is_empty());
    }
}
