use super::types::{DirectoriesConfig, ServerConfig, ToolsConfig};
use crate::error_handling::types::ConfigError;
use log::{debug, info};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;

/// Application configuration loaded from a TOML file.
///
/// # Fields Overview
///
/// - `server`: bind address and port of the HTTP front end
/// - `tools`: external cracker/dumper commands
/// - `directories`: working directories for logs, restores, artifacts,
///   dictionaries and rules
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tools: ToolsConfig,
    pub directories: DirectoriesConfig,
}

impl Config {
    /// Reads and validates the configuration from `path`.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Creates every configured working directory that does not exist yet.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        let dirs = [
            &self.directories.logs,
            &self.directories.restores,
            &self.directories.cracked,
            &self.directories.dumps,
            &self.directories.dictionaries,
            &self.directories.rules,
        ];
        for dir in dirs {
            std::fs::create_dir_all(dir).map_err(|e| {
                ConfigError::DirectoryError(format!(
                    "failed to create {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            debug!("Working directory ready: {}", dir.display());
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::BadBindAddress(format!("{}: {}", self.server.bind_address, e)))?;

        if self.server.port == 0 {
            return Err(ConfigError::BadPort("port must be non-zero".to_string()));
        }

        if self.tools.cracker_binary.trim().is_empty() {
            return Err(ConfigError::EmptyToolCommand(
                "cracker_binary is empty".to_string(),
            ));
        }
        if self.tools.dumper_binary.trim().is_empty() {
            return Err(ConfigError::EmptyToolCommand(
                "dumper_binary is empty".to_string(),
            ));
        }

        Ok(())
    }
}
