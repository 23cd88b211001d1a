// Dashboard configuration (optional snap_scope.toml in the working directory).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "snap_scope.toml";

pub const DEFAULT_PAGE_SIZE: usize = 10;

const CROSSWALK_URL: &str =
    "https://raw.githubusercontent.com/dynastyprocess/data/master/files/db_playerids.csv";
const PARTICIPATION_URL: &str = "https://github.com/nflverse/nflverse-data/releases/download/snap_counts/snap_counts_2023.parquet";
const PERFORMANCE_URL: &str = "https://github.com/nflverse/nflverse-data/releases/download/player_stats/player_stats_2023.parquet";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Table rows per page.
    pub page_size: usize,
    /// Performance rows outside these positions are dropped before the join.
    pub positions: Vec<String>,
    pub sources: SourceLocations,
}

/// Locations (URL or local path) of the three source tables. The defaults
/// are the 2023 season releases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceLocations {
    /// Legacy key → canonical key crosswalk.
    pub crosswalk: String,
    /// Weekly snap counts, keyed by the legacy key.
    pub participation: String,
    /// Weekly player stats, keyed by the canonical key.
    pub performance: String,
}

impl Default for SourceLocations {
    fn default() -> Self {
        Self {
            crosswalk: CROSSWALK_URL.to_string(),
            participation: PARTICIPATION_URL.to_string(),
            performance: PERFORMANCE_URL.to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            positions: ["QB", "RB", "WR", "TE"].map(String::from).to_vec(),
            sources: SourceLocations::default(),
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("{} not found, using default sources", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|err| match err {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError {
                field: "page_size".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.positions.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "positions".into(),
                message: "at least one position is required".into(),
            });
        }
        for (field, location) in [
            ("sources.crosswalk", &self.sources.crosswalk),
            ("sources.participation", &self.sources.participation),
            ("sources.performance", &self.sources.performance),
        ] {
            if location.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    field: field.into(),
                    message: "location must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    pub fn crosswalk_location(&self) -> &str {
        &self.sources.crosswalk
    }

    pub fn participation_location(&self) -> &str {
        &self.sources.participation
    }

    pub fn performance_location(&self) -> &str {
        &self.sources.performance
    }
}
