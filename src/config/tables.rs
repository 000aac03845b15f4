use super::defaults;
use super::models::{AppConfig, HighlightColor, LogLevel, ThemeMode};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    backend: BackendConfig,
    #[serde(default)]
    upload: UploadConfig,
    #[serde(default)]
    definitions: DefinitionsConfig,
    #[serde(default)]
    speech: SpeechConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    cache: CacheConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            theme: tables.appearance.theme,
            font_size: tables.appearance.font_size,
            line_spacing: tables.appearance.line_spacing,
            margin_horizontal: tables.appearance.margin_horizontal,
            margin_vertical: tables.appearance.margin_vertical,
            window_width: tables.appearance.window_width,
            window_height: tables.appearance.window_height,
            window_pos_x: tables.appearance.window_pos_x,
            window_pos_y: tables.appearance.window_pos_y,
            day_highlight: tables.appearance.day_highlight,
            night_highlight: tables.appearance.night_highlight,
            backend_url: tables.backend.url,
            max_file_mib: tables.upload.max_file_mib,
            context_chars: tables.definitions.context_chars,
            synth_command: tables.speech.synth_command,
            preferred_voices: tables.speech.preferred_voices,
            speech_rate_wpm: tables.speech.rate_wpm,
            speech_volume: tables.speech.volume,
            chunk_soft_chars: tables.speech.chunk_soft_chars,
            chunk_hard_chars: tables.speech.chunk_hard_chars,
            pause_between_chunks: tables.speech.pause_between_chunks,
            synth_threads: tables.speech.threads,
            auto_scroll: tables.ui.auto_scroll,
            show_settings: tables.ui.show_settings,
            log_level: tables.logging.log_level,
            cache_dir: tables.cache.dir,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                theme: config.theme,
                font_size: config.font_size,
                line_spacing: config.line_spacing,
                margin_horizontal: config.margin_horizontal,
                margin_vertical: config.margin_vertical,
                window_width: config.window_width,
                window_height: config.window_height,
                window_pos_x: config.window_pos_x,
                window_pos_y: config.window_pos_y,
                day_highlight: config.day_highlight,
                night_highlight: config.night_highlight,
            },
            backend: BackendConfig {
                url: config.backend_url.clone(),
            },
            upload: UploadConfig {
                max_file_mib: config.max_file_mib,
            },
            definitions: DefinitionsConfig {
                context_chars: config.context_chars,
            },
            speech: SpeechConfig {
                synth_command: config.synth_command.clone(),
                preferred_voices: config.preferred_voices.clone(),
                rate_wpm: config.speech_rate_wpm,
                volume: config.speech_volume,
                chunk_soft_chars: config.chunk_soft_chars,
                chunk_hard_chars: config.chunk_hard_chars,
                pause_between_chunks: config.pause_between_chunks,
                threads: config.synth_threads,
            },
            ui: UiConfig {
                auto_scroll: config.auto_scroll,
                show_settings: config.show_settings,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            cache: CacheConfig {
                dir: config.cache_dir.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AppearanceConfig {
    #[serde(default)]
    theme: ThemeMode,
    #[serde(default = "defaults::default_font_size")]
    font_size: u32,
    #[serde(default = "defaults::default_line_spacing")]
    line_spacing: f32,
    #[serde(default = "defaults::default_margin_horizontal")]
    margin_horizontal: u16,
    #[serde(default = "defaults::default_margin_vertical")]
    margin_vertical: u16,
    #[serde(default = "defaults::default_window_width")]
    window_width: f32,
    #[serde(default = "defaults::default_window_height")]
    window_height: f32,
    #[serde(default)]
    window_pos_x: Option<f32>,
    #[serde(default)]
    window_pos_y: Option<f32>,
    #[serde(default = "defaults::default_day_highlight")]
    day_highlight: HighlightColor,
    #[serde(default = "defaults::default_night_highlight")]
    night_highlight: HighlightColor,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            theme: ThemeMode::default(),
            font_size: defaults::default_font_size(),
            line_spacing: defaults::default_line_spacing(),
            margin_horizontal: defaults::default_margin_horizontal(),
            margin_vertical: defaults::default_margin_vertical(),
            window_width: defaults::default_window_width(),
            window_height: defaults::default_window_height(),
            window_pos_x: None,
            window_pos_y: None,
            day_highlight: defaults::default_day_highlight(),
            night_highlight: defaults::default_night_highlight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct BackendConfig {
    #[serde(default = "defaults::default_backend_url")]
    url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: defaults::default_backend_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct UploadConfig {
    #[serde(default = "defaults::default_max_file_mib")]
    max_file_mib: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_mib: defaults::default_max_file_mib(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct DefinitionsConfig {
    #[serde(default = "defaults::default_context_chars")]
    context_chars: usize,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        DefinitionsConfig {
            context_chars: defaults::default_context_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SpeechConfig {
    #[serde(default)]
    synth_command: String,
    #[serde(default)]
    preferred_voices: Vec<String>,
    #[serde(default = "defaults::default_speech_rate_wpm")]
    rate_wpm: u32,
    #[serde(default = "defaults::default_speech_volume")]
    volume: f32,
    #[serde(default = "defaults::default_chunk_soft_chars")]
    chunk_soft_chars: usize,
    #[serde(default = "defaults::default_chunk_hard_chars")]
    chunk_hard_chars: usize,
    #[serde(default = "defaults::default_pause_between_chunks")]
    pause_between_chunks: f32,
    #[serde(default = "defaults::default_synth_threads")]
    threads: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            synth_command: String::new(),
            preferred_voices: Vec::new(),
            rate_wpm: defaults::default_speech_rate_wpm(),
            volume: defaults::default_speech_volume(),
            chunk_soft_chars: defaults::default_chunk_soft_chars(),
            chunk_hard_chars: defaults::default_chunk_hard_chars(),
            pause_between_chunks: defaults::default_pause_between_chunks(),
            threads: defaults::default_synth_threads(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct UiConfig {
    #[serde(default = "defaults::default_auto_scroll")]
    auto_scroll: bool,
    #[serde(default = "defaults::default_show_settings")]
    show_settings: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            auto_scroll: defaults::default_auto_scroll(),
            show_settings: defaults::default_show_settings(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct CacheConfig {
    #[serde(default = "defaults::default_cache_dir")]
    dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: defaults::default_cache_dir(),
        }
    }
}
