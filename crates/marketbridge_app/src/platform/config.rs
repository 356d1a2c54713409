use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use marketbridge_core::PacingConfig;
use marketbridge_engine::AnalysisSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "marketbridge.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Where the loaded settings came from. Reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { missing: PathBuf },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "loaded config from {}", path.display()),
            ConfigSource::Defaults { missing } => {
                write!(f, "no config at {}; using defaults", missing.display())
            }
        }
    }
}

/// Settings read from `marketbridge.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub tick_interval_ms: u64,
    pub log_destination: LogDestination,
    pub verbose: bool,
    pub pacing: PacingSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    pub stage_interval_ms: u64,
    pub percent_interval_ms: u64,
    pub percent_step: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = AnalysisSettings::default();
        Self {
            analysis_url: settings.base_url,
            connect_timeout_ms: duration_ms(settings.connect_timeout),
            request_timeout_ms: duration_ms(settings.request_timeout),
            tick_interval_ms: 75,
            log_destination: LogDestination::default(),
            verbose: false,
            pacing: PacingSection::default(),
        }
    }
}

impl Default for PacingSection {
    fn default() -> Self {
        let pacing = PacingConfig::default();
        Self {
            stage_interval_ms: duration_ms(pacing.stage_interval),
            percent_interval_ms: duration_ms(pacing.percent_interval),
            percent_step: pacing.percent_step,
        }
    }
}

impl AppConfig {
    /// Loads the file at `path`. A missing file yields the defaults.
    ///
    /// Runs before the logger exists, so the outcome is returned as a
    /// [`ConfigSource`] instead of being logged here.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let source = ConfigSource::Defaults {
                    missing: path.to_path_buf(),
                };
                return Ok((Self::default(), source));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            base_url: self.analysis_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn pacing(&self) -> PacingConfig {
        PacingConfig {
            stage_interval: Duration::from_millis(self.pacing.stage_interval_ms),
            percent_interval: Duration::from_millis(self.pacing.percent_interval_ms),
            percent_step: self.pacing.percent_step,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
