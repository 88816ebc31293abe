/// Application configuration
use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use forza_artwork::ArtworkConfig;
use forza_catalog::{ArchiveConfig, ManifestConfig};
use forza_playback::PlayerConfig;
use forza_search_client::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given
const DEFAULT_CONFIG_FILE: &str = "forza-radio.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub artwork: ArtworkConfig,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Where tracks come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Static JSON manifest
    #[default]
    Manifest,
    /// Remote archive feed (always runs in ExternalFeed mode)
    Archive,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub kind: SourceKind,

    #[serde(default)]
    pub manifest: Option<ManifestConfig>,

    #[serde(default)]
    pub archive: Option<ArchiveConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Preference database file
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,

    /// Keep preferences in memory only
    #[serde(default)]
    pub in_memory: bool,
}

/// Simulated audio backend timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Length every simulated track reports
    #[serde(default = "default_track_secs")]
    pub track_secs: f64,

    /// Progress tick period
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Time from load to playable
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `forza-radio.toml` is read
    /// when present. `FORZA_`-prefixed variables override both, with `__`
    /// between nested keys (`FORZA_SEARCH__CLIENT_ID`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("FORZA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::build(settings)
    }

    fn build(settings: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = settings
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Self>()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.source.kind {
            SourceKind::Manifest => match &self.source.manifest {
                Some(manifest) if !manifest.url.trim().is_empty() => {}
                _ => bail!("Manifest source needs source.manifest.url"),
            },
            SourceKind::Archive => match &self.source.archive {
                Some(archive) if !archive.uploader.trim().is_empty() => {}
                _ => bail!("Archive source needs source.archive.uploader"),
            },
        }

        if !(0.0..=1.0).contains(&self.player.default_volume) {
            bail!(
                "player.default_volume must be within [0, 1], got {}",
                self.player.default_volume
            );
        }

        if self.player.preload_after_secs < 0.0 {
            bail!("player.preload_after_secs must not be negative");
        }

        if self.simulation.track_secs <= 0.0 || self.simulation.tick_ms == 0 {
            bail!("simulation.track_secs and simulation.tick_ms must be positive");
        }

        Ok(())
    }
}

// Default values
impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            preferences_path: default_preferences_path(),
            in_memory: false,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            track_secs: default_track_secs(),
            tick_ms: default_tick_ms(),
            load_delay_ms: default_load_delay_ms(),
        }
    }
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("./data/preferences.redb")
}

fn default_track_secs() -> f64 {
    30.0
}

fn default_tick_ms() -> u64 {
    250
}

fn default_load_delay_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use forza_core::PlaybackMode;

    fn parse(toml: &str) -> Result<AppConfig> {
        AppConfig::build(
            config::Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_manifest_config_with_defaults() {
        let config = parse(
            r#"
            [source.manifest]
            url = "https://radio.example/songs.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.kind, SourceKind::Manifest);
        assert_eq!(config.player.preload_after_secs, 7.0);
        assert_eq!(config.player.initial_mode, PlaybackMode::Sequential);
        assert_eq!(config.artwork.request_timeout_ms, 5000);
        assert!(config.search.client_id.is_none());
        assert_eq!(config.simulation.tick_ms, 250);
    }

    #[test]
    fn test_archive_config() {
        let config = parse(
            r#"
            [source]
            kind = "archive"

            [source.archive]
            uploader = "dj@example.com"

            [player]
            autoplay = true
            initial_mode = "shuffled"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.kind, SourceKind::Archive);
        let archive = config.source.archive.unwrap();
        assert_eq!(archive.identifier_prefix, "music");
        assert!(config.player.autoplay);
        assert_eq!(config.player.initial_mode, PlaybackMode::Shuffled);
    }

    #[test]
    fn test_missing_source_rejected() {
        let err = parse("").unwrap_err();
        assert!(err.to_string().contains("source.manifest.url"));

        let err = parse("[source]\nkind = \"archive\"\n").unwrap_err();
        assert!(err.to_string().contains("source.archive.uploader"));
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        let err = parse(
            r#"
            [source.manifest]
            url = "https://radio.example/songs.json"

            [player]
            default_volume = 1.5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("default_volume"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
