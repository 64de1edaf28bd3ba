//! Configuration management for emcp
//!
//! This module handles loading, validation, and management of the
//! configuration from YAML files. Command line flags are applied on top of
//! the loaded file by the CLI.

use crate::error::{EmcpError, Result};
use crate::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Modbus TCP connection configuration
    pub modbus: ModbusConfig,

    /// HTTP side channel configuration
    pub http: HttpConfig,

    /// Status refresh options
    pub status: StatusConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Modbus TCP connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModbusConfig {
    /// Host name or IP address of the charge controller
    pub host: String,

    /// TCP port (typically 502)
    pub port: u16,

    /// Modbus unit (slave) ID of the controller
    pub unit_id: u8,

    /// Connect timeout in milliseconds
    pub connection_timeout_ms: u64,

    /// Per-request timeout in milliseconds
    pub operation_timeout_ms: u64,
}

/// HTTP hard reset parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Deadline for the reset request. The controller never answers it, so
    /// this is also how long a reset takes.
    pub reset_timeout_ms: u64,
}

impl HttpConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

/// Status refresh options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Also read the actual charging current holding register on refresh
    pub read_charging_current: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Log file or directory; empty disables file logging
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to the console (stderr)
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = ["emcp.yaml", "/etc/emcp/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.modbus.host.trim().is_empty() {
            return Err(EmcpError::validation(
                "modbus.host",
                "Host cannot be empty",
            ));
        }

        if self.modbus.port == 0 {
            return Err(EmcpError::validation(
                "modbus.port",
                "Port must be greater than 0",
            ));
        }

        if self.modbus.connection_timeout_ms == 0 {
            return Err(EmcpError::validation(
                "modbus.connection_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if self.modbus.operation_timeout_ms == 0 {
            return Err(EmcpError::validation(
                "modbus.operation_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if self.http.reset_timeout_ms == 0 {
            return Err(EmcpError::validation(
                "http.reset_timeout_ms",
                "Must be greater than 0",
            ));
        }

        if parse_log_level(&self.logging.level).is_err() {
            return Err(EmcpError::validation(
                "logging.level".to_string(),
                format!("Unknown log level '{}'", self.logging.level),
            ));
        }

        Ok(())
    }
}
