//! # Configuration
//!
//! Runtime settings for the HOA backend, read from a YAML file.
//!
//! ```yaml
//! server:
//!   bind: "127.0.0.1:3000"
//!   cors_origin: "http://localhost:8080"
//! database:
//!   url: "sqlite:hoa.db"
//! admin:
//!   access_key: "change-me"
//! dues:
//!   default_monthly_cents: 150000
//! reservations:
//!   hold_minutes: 15
//!   max_days_ahead: 60
//!   sweep_interval_secs: 60
//! vehicles:
//!   max_per_resident: 3
//! logging:
//!   level: "info"
//! ```
//!
//! Every section is optional. A missing file means all defaults. The
//! environment variables `HOA_DATABASE_URL`, `HOA_BIND` and `HOA_ADMIN_KEY`
//! win over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH_ENV: &str = "HOA_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "hoa.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:hoa.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub access_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            access_key: "change-me".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuesConfig {
    /// Monthly due used for any period no explicit rate covers
    pub default_monthly_cents: i64,
}

impl Default for DuesConfig {
    fn default() -> Self {
        Self {
            default_monthly_cents: 150_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    pub hold_minutes: i64,
    pub max_days_ahead: i64,
    pub sweep_interval_secs: u64,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            hold_minutes: 15,
            max_days_ahead: 60,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub max_per_resident: usize,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self { max_per_resident: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub dues: DuesConfig,
    pub reservations: ReservationConfig,
    pub vehicles: VehicleConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `$HOA_CONFIG` (or `hoa.yaml`) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file_or_default(Path::new(&path))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file, falling back to defaults when it does not exist
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HOA_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(bind) = std::env::var("HOA_BIND") {
            self.server.bind = bind;
        }
        if let Ok(key) = std::env::var("HOA_ADMIN_KEY") {
            self.admin.access_key = key;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.admin.access_key.trim().is_empty() {
            anyhow::bail!("admin.access_key cannot be empty");
        }
        if self.dues.default_monthly_cents < 0 {
            anyhow::bail!("dues.default_monthly_cents cannot be negative");
        }
        if self.reservations.hold_minutes <= 0 {
            anyhow::bail!("reservations.hold_minutes must be positive");
        }
        if self.reservations.max_days_ahead < 0 {
            anyhow::bail!("reservations.max_days_ahead cannot be negative");
        }
        if self.reservations.sweep_interval_secs == 0 {
            anyhow::bail!("reservations.sweep_interval_secs must be positive");
        }
        Ok(())
    }
}
