use serde::Deserialize;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "crate::config::defaults::default_font_size")]
    pub font_size: u32,
    #[serde(default = "crate::config::defaults::default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default = "crate::config::defaults::default_margin_horizontal")]
    pub margin_horizontal: u16,
    #[serde(default = "crate::config::defaults::default_margin_vertical")]
    pub margin_vertical: u16,
    #[serde(default = "crate::config::defaults::default_window_width")]
    pub window_width: f32,
    #[serde(default = "crate::config::defaults::default_window_height")]
    pub window_height: f32,
    #[serde(default)]
    pub window_pos_x: Option<f32>,
    #[serde(default)]
    pub window_pos_y: Option<f32>,
    #[serde(default = "crate::config::defaults::default_day_highlight")]
    pub day_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_night_highlight")]
    pub night_highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_backend_url")]
    pub backend_url: String,
    #[serde(default = "crate::config::defaults::default_max_file_mib")]
    pub max_file_mib: u64,
    #[serde(default = "crate::config::defaults::default_context_chars")]
    pub context_chars: usize,
    #[serde(default)]
    pub synth_command: String,
    #[serde(default)]
    pub preferred_voices: Vec<String>,
    #[serde(default = "crate::config::defaults::default_speech_rate_wpm")]
    pub speech_rate_wpm: u32,
    #[serde(default = "crate::config::defaults::default_speech_volume")]
    pub speech_volume: f32,
    #[serde(default = "crate::config::defaults::default_chunk_soft_chars")]
    pub chunk_soft_chars: usize,
    #[serde(default = "crate::config::defaults::default_chunk_hard_chars")]
    pub chunk_hard_chars: usize,
    #[serde(default = "crate::config::defaults::default_pause_between_chunks")]
    pub pause_between_chunks: f32,
    #[serde(default = "crate::config::defaults::default_synth_threads")]
    pub synth_threads: usize,
    #[serde(default = "crate::config::defaults::default_auto_scroll")]
    pub auto_scroll: bool,
    #[serde(default = "crate::config::defaults::default_show_settings")]
    pub show_settings: bool,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::Night,
            font_size: crate::config::defaults::default_font_size(),
            line_spacing: crate::config::defaults::default_line_spacing(),
            margin_horizontal: crate::config::defaults::default_margin_horizontal(),
            margin_vertical: crate::config::defaults::default_margin_vertical(),
            window_width: crate::config::defaults::default_window_width(),
            window_height: crate::config::defaults::default_window_height(),
            window_pos_x: None,
            window_pos_y: None,
            day_highlight: crate::config::defaults::default_day_highlight(),
            night_highlight: crate::config::defaults::default_night_highlight(),
            backend_url: crate::config::defaults::default_backend_url(),
            max_file_mib: crate::config::defaults::default_max_file_mib(),
            context_chars: crate::config::defaults::default_context_chars(),
            synth_command: String::new(),
            preferred_voices: Vec::new(),
            speech_rate_wpm: crate::config::defaults::default_speech_rate_wpm(),
            speech_volume: crate::config::defaults::default_speech_volume(),
            chunk_soft_chars: crate::config::defaults::default_chunk_soft_chars(),
            chunk_hard_chars: crate::config::defaults::default_chunk_hard_chars(),
            pause_between_chunks: crate::config::defaults::default_pause_between_chunks(),
            synth_threads: crate::config::defaults::default_synth_threads(),
            auto_scroll: crate::config::defaults::default_auto_scroll(),
            show_settings: crate::config::defaults::default_show_settings(),
            log_level: crate::config::defaults::default_log_level(),
            cache_dir: crate::config::defaults::default_cache_dir(),
        }
    }
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Day,
    Night,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Night
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", label)
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
