use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Data file used when neither the CLI nor the config names one.
pub const DEFAULT_DATA_FILE: &str = "netflix.csv";

/// Application configuration loaded from TOML config file.
/// All fields have defaults; the config file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog CSV to analyze (overrides `netflix.csv` in the working directory).
    pub data_path: Option<PathBuf>,
    /// Report sizes and windows.
    pub report: ReportConfig,
}

/// Sizes of the ranked tables and time windows used by the reports.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub top_countries: usize,
    pub top_genres: usize,
    pub top_ratings: usize,
    /// Countries broken down by type in the geography report.
    pub country_breakdown: usize,
    /// Rows and columns of the genre × country heatmap.
    pub heatmap_genres: usize,
    pub heatmap_countries: usize,
    /// Release-year window, counted back from the newest release.
    pub release_window_years: i32,
    /// "Recent" window for the release-share insight.
    pub recent_window_years: i32,
    /// Niche examples shown by the simulator.
    pub examples: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_countries: 15,
            top_genres: 15,
            top_ratings: 10,
            country_breakdown: 5,
            heatmap_genres: 10,
            heatmap_countries: 10,
            release_window_years: 30,
            recent_window_years: 5,
            examples: 5,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/streamscope/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve the data file: CLI > config > `netflix.csv`.
    pub fn resolve_data_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.data_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
