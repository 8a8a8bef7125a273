//! Planner configuration, stored as `.planner/config.toml`.

use crate::error::{PlannerError, Result};
use crate::graph::AdjacencyMode;
use crate::grid::GridConfig;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the configuration inside the planner directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Complete planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Who owns the records in this planner.
    #[serde(default)]
    pub user: UserConfig,

    /// Grid layout.
    #[serde(default)]
    pub grid: GridConfig,

    /// Session linking.
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Storage location.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Loads the configuration from `planner_dir`, or defaults if absent.
    pub fn load(planner_dir: &Path) -> Result<Self> {
        let path = planner_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| PlannerError::ConfigError(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| PlannerError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to `planner_dir`.
    pub fn save(&self, planner_dir: &Path) -> Result<()> {
        let path = planner_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| PlannerError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| PlannerError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.user.user_id()?;
        self.grid.validate()?;
        if self.storage.database.trim().is_empty() {
            return Err(PlannerError::ConfigError(
                "storage.database must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Record owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Owning user id (default: "local").
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: "local".to_string(),
        }
    }
}

impl UserConfig {
    /// The configured id as a [`UserId`].
    pub fn user_id(&self) -> Result<UserId> {
        UserId::new(self.id.as_str())
            .map_err(|_| PlannerError::ConfigError("user.id must not be empty".to_string()))
    }
}

/// Session linking options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Also link blocks in the same slot on neighboring days (default: true).
    pub horizontal_adjacency: bool,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            horizontal_adjacency: true,
        }
    }
}

impl SessionsConfig {
    /// Adjacency rule implied by these options.
    pub fn adjacency_mode(&self) -> AdjacencyMode {
        if self.horizontal_adjacency {
            AdjacencyMode::VerticalAndHorizontal
        } else {
            AdjacencyMode::Vertical
        }
    }
}

/// Storage options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file name, relative to the planner directory (default: "planner.redb").
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: "planner.redb".to_string(),
        }
    }
}
