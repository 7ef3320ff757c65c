use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::schedule::date_format::parse_clock_time;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid clock time '{value}' for {field}")]
    InvalidTime { field: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub schedule: ScheduleConfig,
    pub labels: DisplayLabels,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    pub default_start: String,
    pub default_end: String,
}

/// Fallback texts and colors used when a record lacks display data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayLabels {
    pub unassigned_task: String,
    pub unknown_vehicle: String,
    pub unknown_worker: String,
    pub vacation: String,
    pub absence_color: String,
    pub default_vehicle_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub database: PathBuf,
}

impl ScheduleConfig {
    pub fn working_hours(&self) -> Result<(NaiveTime, NaiveTime), ConfigError> {
        let start = parse_clock_time(&self.default_start).map_err(|_| ConfigError::InvalidTime {
            field: "schedule.default_start",
            value: self.default_start.clone(),
        })?;
        let end = parse_clock_time(&self.default_end).map_err(|_| ConfigError::InvalidTime {
            field: "schedule.default_end",
            value: self.default_end.clone(),
        })?;
        Ok((start, end))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_start: "08:00".to_string(),
            default_end: "16:00".to_string(),
        }
    }
}

impl Default for DisplayLabels {
    fn default() -> Self {
        Self {
            unassigned_task: "No job".to_string(),
            unknown_vehicle: "Unknown vehicle".to_string(),
            unknown_worker: "Worker".to_string(),
            vacation: "Vacation".to_string(),
            absence_color: "#9ca3af".to_string(),
            default_vehicle_color: "#3b82f6".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.schedule.working_hours()?;
        Ok(config)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dispatch-planner")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            labels: DisplayLabels::default(),
            storage: StorageConfig {
                database: Self::config_dir().join("schedule.db"),
            },
        }
    }
}
