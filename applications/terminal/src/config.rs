/// Terminal host configuration
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mixtape.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    /// Catalog feed: one entry per track row, in display order
    #[serde(default)]
    pub tracks: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_title")]
    pub title: String,

    /// Directory that catalog file names are resolved against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Volume the device starts at (0.0 - 1.0), before the slider takes over
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    #[serde(default = "default_time_update_interval_ms")]
    pub time_update_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// File name or relative path of the audio file
    pub file: String,

    /// Display title (defaults to the file name)
    #[serde(default)]
    pub title: Option<String>,
}

impl CatalogEntry {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.file)
    }
}

impl PlayerSettings {
    pub fn time_update_interval(&self) -> Duration {
        Duration::from_millis(self.time_update_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            tracks: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `mixtape.toml` is read when
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (e.g. MIXTAPE_PLAYER__BASE_DIR)
        settings = settings.add_source(
            config::Environment::with_prefix("MIXTAPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(AppError::Config(format!(
                "initial_volume must be between 0.0 and 1.0, got {}",
                self.player.initial_volume
            )));
        }

        if self.player.time_update_interval_ms == 0 {
            return Err(AppError::Config(
                "time_update_interval_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(entry) = self.tracks.iter().find(|t| t.file.trim().is_empty()) {
            return Err(AppError::Config(format!(
                "Track {:?} has an empty file name",
                entry.display_title()
            )));
        }

        // Rows are matched to the loaded source by file name
        for (i, entry) in self.tracks.iter().enumerate() {
            if self.tracks[..i].iter().any(|t| t.file == entry.file) {
                return Err(AppError::Config(format!(
                    "Track file listed twice: {}",
                    entry.file
                )));
            }
        }

        Ok(())
    }
}

// Default values
fn default_player() -> PlayerSettings {
    PlayerSettings {
        title: default_title(),
        base_dir: default_base_dir(),
        initial_volume: default_initial_volume(),
        time_update_interval_ms: default_time_update_interval_ms(),
    }
}

fn default_title() -> String {
    "Portfolio of audio samples".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_time_update_interval_ms() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let file = write_config("");
        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.player.title, "Portfolio of audio samples");
        assert_eq!(config.player.base_dir, PathBuf::from("."));
        assert_eq!(config.player.initial_volume, 1.0);
        assert_eq!(
            config.player.time_update_interval(),
            Duration::from_millis(250)
        );
        assert!(config.tracks.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn catalog_is_read_in_order() {
        let file = write_config(
            r#"
            [player]
            title = "Demo reel"
            base_dir = "samples"

            [[tracks]]
            file = "Press_One.mp3"
            title = "Press one"

            [[tracks]]
            file = "Jingle.ogg"
            "#,
        );
        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.player.title, "Demo reel");
        assert_eq!(config.player.base_dir, PathBuf::from("samples"));
        assert_eq!(config.tracks.len(), 2);
        assert_eq!(config.tracks[0].display_title(), "Press one");
        assert_eq!(config.tracks[1].display_title(), "Jingle.ogg");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/mixtape.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let file = write_config("[player]\ninitial_volume = 1.5\n");
        let config = AppConfig::load(Some(file.path())).unwrap();

        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn duplicate_files_are_rejected() {
        let file = write_config(
            r#"
            [[tracks]]
            file = "a.mp3"

            [[tracks]]
            file = "a.mp3"
            "#,
        );
        let config = AppConfig::load(Some(file.path())).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("a.mp3"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let file = write_config("[player]\ntime_update_interval_ms = 0\n");
        let config = AppConfig::load(Some(file.path())).unwrap();

        assert!(config.validate().is_err());
    }
}
