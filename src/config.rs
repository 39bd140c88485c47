use crate::service::{EngineSettings, DEFAULT_ADAPTER_TIMEOUT, DEFAULT_SEARCH_RADIUS_M};
use crate::engine::ranker::TOP_RECOMMENDATIONS;
use crate::engine::reroute::DEFAULT_DRIVE_BUDGET_MINUTES;
use crate::registry::DEFAULT_REGISTRY_PATH;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub registry: Option<RegistrySection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    pub search_radius_m: Option<f64>,
    pub adapter_timeout_ms: Option<u64>,
    pub reroute_drive_budget_minutes: Option<f64>,
    pub top_recommendations: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    /// Registry file path (default: data/registry.json). An explicitly
    /// empty path is treated as missing.
    pub fn registry_path(&self) -> &Path {
        match self.registry.as_ref().and_then(|r| r.path.as_deref()) {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => Path::new(DEFAULT_REGISTRY_PATH),
        }
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let section = self.engine.as_ref();
        EngineSettings {
            search_radius_m: section
                .and_then(|e| e.search_radius_m)
                .unwrap_or(DEFAULT_SEARCH_RADIUS_M),
            adapter_timeout: section
                .and_then(|e| e.adapter_timeout_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_ADAPTER_TIMEOUT),
            drive_budget_minutes: section
                .and_then(|e| e.reroute_drive_budget_minutes)
                .unwrap_or(DEFAULT_DRIVE_BUDGET_MINUTES),
            top_recommendations: section
                .and_then(|e| e.top_recommendations)
                .unwrap_or(TOP_RECOMMENDATIONS),
        }
    }
}
