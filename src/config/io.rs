use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("config TOML did not parse")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    let tables = ConfigTables::from(config);
    toml::to_string_pretty(&tables).context("config did not serialize")
}

/// Persist the config, creating the directory if needed.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    let serialized = serialize_config(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    fs::write(path, serialized).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "Saved configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, ThemeMode};

    #[test]
    fn empty_document_is_all_defaults() {
        let config = parse_config("").unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.theme, defaults.theme);
        assert_eq!(config.backend_url, defaults.backend_url);
        assert_eq!(config.speech_rate_wpm, defaults.speech_rate_wpm);
        assert_eq!(config.max_file_mib, defaults.max_file_mib);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = parse_config(
            r#"
                [backend]
                url = "http://10.0.0.2:9000"

                [speech]
                rate_wpm = 140

                [logging]
                log_level = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:9000");
        assert_eq!(config.speech_rate_wpm, 140);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.context_chars, AppConfig::default().context_chars);
    }

    #[test]
    fn round_trips_through_tables() {
        let mut config = AppConfig::default();
        config.theme = ThemeMode::Day;
        config.backend_url = "http://localhost:5000".into();
        config.preferred_voices = vec!["Samantha".into()];
        config.window_pos_x = Some(40.0);

        let serialized = serialize_config(&config).unwrap();
        let reparsed = parse_config(&serialized).unwrap();
        assert_eq!(reparsed.theme, ThemeMode::Day);
        assert_eq!(reparsed.backend_url, config.backend_url);
        assert_eq!(reparsed.preferred_voices, config.preferred_voices);
        assert_eq!(reparsed.window_pos_x, Some(40.0));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config("[speech\nrate_wpm = 3").is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");
        let mut config = AppConfig::default();
        config.max_file_mib = 5;
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).max_file_mib, 5);
    }
}
