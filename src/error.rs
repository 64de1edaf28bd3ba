//! Error types and handling for emcp
//!
//! This module defines the error types used throughout the crate. Transport
//! failures, wire contract violations and refresh stage failures each get
//! their own variant so callers can tell a dead link from a firmware mismatch.

use std::fmt;
use thiserror::Error;

/// Result type alias for emcp operations
pub type Result<T> = std::result::Result<T, EmcpError>;

/// Stages of the multi-register status refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    ReadInputRegisters,
    ParseInputRegisters,
    ReadOvercurrentProtection,
    ParseOvercurrentProtection,
    ReadDiscreteInputs,
    ParseDiscreteInputs,
    ReadChargingCurrent,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefreshStage::ReadInputRegisters => "read input register status",
            RefreshStage::ParseInputRegisters => "parse input register status",
            RefreshStage::ReadOvercurrentProtection => "read overcurrent protection register",
            RefreshStage::ParseOvercurrentProtection => "parse overcurrent protection register",
            RefreshStage::ReadDiscreteInputs => "read discrete input status",
            RefreshStage::ParseDiscreteInputs => "parse discrete input status",
            RefreshStage::ReadChargingCurrent => "read actual charging current",
        };
        f.write_str(s)
    }
}

/// Main error type for emcp
#[derive(Debug, Error)]
pub enum EmcpError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Modbus communication errors
    #[error("Modbus error: {message}")]
    Modbus { message: String },

    /// HTTP transport errors (hard reset side channel)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Payload length does not match the fixed contract of a register region
    #[error("Invalid length of {region} payload - expected {expected}, got {actual}")]
    InvalidLength {
        region: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Vehicle state code outside 'A'..='F'
    #[error("Invalid vehicle state '{code}'")]
    InvalidVehicleState { code: u16 },

    /// A refresh stage failed; the cache keeps its previous status
    #[error("Failed to {stage}: {source}")]
    Refresh {
        stage: RefreshStage,
        #[source]
        source: Box<EmcpError>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl EmcpError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        EmcpError::Config {
            message: message.into(),
        }
    }

    /// Create a new Modbus error
    pub fn modbus<S: Into<String>>(message: S) -> Self {
        EmcpError::Modbus {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        EmcpError::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        EmcpError::Timeout {
            message: message.into(),
        }
    }

    pub fn invalid_length(region: &'static str, expected: usize, actual: usize) -> Self {
        EmcpError::InvalidLength {
            region,
            expected,
            actual,
        }
    }

    pub fn invalid_vehicle_state(code: u16) -> Self {
        EmcpError::InvalidVehicleState { code }
    }

    /// Wrap an error with the refresh stage it happened in
    pub fn refresh(stage: RefreshStage, source: EmcpError) -> Self {
        EmcpError::Refresh {
            stage,
            source: Box::new(source),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        EmcpError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        EmcpError::Io {
            message: message.into(),
        }
    }

    /// Stage of a failed refresh, if this error came out of one
    pub fn refresh_stage(&self) -> Option<RefreshStage> {
        match self {
            EmcpError::Refresh { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping refresh stage wrappers
    pub fn root(&self) -> &EmcpError {
        match self {
            EmcpError::Refresh { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the failure came from the Modbus or HTTP link rather than the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root(),
            EmcpError::Modbus { .. } | EmcpError::Network { .. } | EmcpError::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for EmcpError {
    fn from(err: std::io::Error) -> Self {
        EmcpError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for EmcpError {
    fn from(err: serde_yaml::Error) -> Self {
        EmcpError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EmcpError {
    fn from(err: serde_json::Error) -> Self {
        EmcpError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "http-reset")]
impl From<reqwest::Error> for EmcpError {
    fn from(err: reqwest::Error) -> Self {
        EmcpError::network(err.to_string())
    }
}
