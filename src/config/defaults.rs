pub(crate) fn default_font_size() -> u32 {
    22
}

pub(crate) fn default_line_spacing() -> f32 {
    1.2
}

pub(crate) fn default_margin_horizontal() -> u16 {
    100
}

pub(crate) fn default_margin_vertical() -> u16 {
    12
}

pub(crate) fn default_window_width() -> f32 {
    1024.0
}

pub(crate) fn default_window_height() -> f32 {
    768.0
}

pub(crate) fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

pub(crate) fn default_max_file_mib() -> u64 {
    50
}

pub(crate) fn default_context_chars() -> usize {
    500
}

pub(crate) fn default_speech_rate_wpm() -> u32 {
    180
}

pub(crate) fn default_speech_volume() -> f32 {
    1.0
}

pub(crate) fn default_chunk_soft_chars() -> usize {
    300
}

pub(crate) fn default_chunk_hard_chars() -> usize {
    400
}

pub(crate) fn default_pause_between_chunks() -> f32 {
    0.05
}

pub(crate) fn default_synth_threads() -> usize {
    4
}

pub(crate) fn default_auto_scroll() -> bool {
    true
}

pub(crate) fn default_show_settings() -> bool {
    true
}

pub(crate) fn default_day_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.2,
        g: 0.4,
        b: 0.7,
        a: 0.15,
    }
}

pub(crate) fn default_night_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.8,
        g: 0.8,
        b: 0.5,
        a: 0.2,
    }
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_cache_dir() -> String {
    crate::cache::DEFAULT_CACHE_DIR.to_string()
}
