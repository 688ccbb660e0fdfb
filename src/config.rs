use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Constants
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";
const PRIMARY_FILE: &str = "supermarkt_sales.xlsx";
const ANNOTATIONS_FILE: &str = "opmerkingen.xlsx";
const BIND_ADDR: &str = "127.0.0.1:3000";
const CACHE_TTL_MS: u64 = 1000;

/// Names of the columns the dashboard gives meaning to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Schema {
    /// Join key shared by the primary and annotations files.
    pub key_column: String,

    /// Free-text note column, the only one users may edit.
    pub annotation_column: String,

    /// Numeric column summed in the summary panel.
    pub total_column: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            key_column: "Invoice ID".to_string(),
            annotation_column: "Opmerkingen".to_string(),
            total_column: "Total".to_string(),
        }
    }
}

/// Display defaults for the grid.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    pub column_width: u32,
    pub annotation_width: u32,
    pub stripe_color: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            column_width: 120,
            annotation_width: 200,
            stripe_color: "#f0f0f0".to_string(),
        }
    }
}

/// Runtime configuration. Every field has a default, so an absent or partial
/// config file is fine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub primary_path: PathBuf,
    pub annotations_path: PathBuf,
    pub bind_addr: String,
    pub cache_ttl_ms: u64,
    pub schema: Schema,
    pub grid: GridSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::from(PRIMARY_FILE),
            annotations_path: PathBuf::from(ANNOTATIONS_FILE),
            bind_addr: BIND_ADDR.to_string(),
            cache_ttl_ms: CACHE_TTL_MS,
            schema: Schema::default(),
            grid: GridSettings::default(),
        }
    }
}

impl Config {
    /// Reads a JSON config file. A missing file yields the defaults.
    ///
    /// # Errors
    /// * `DashboardError::Config` if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let config_error = |reason: String| DashboardError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&data).map_err(|e| config_error(e.to_string()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
