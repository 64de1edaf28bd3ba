use crate::error::{EmcpError, Result};
use tracing::Level;

/// Parse a log level name, case-insensitive. `WARNING` is accepted for `WARN`.
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.trim().to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(EmcpError::config(format!(
            "Invalid log level: {}",
            level_str
        ))),
    }
}

/// Default filter directives when `RUST_LOG` is unset.
///
/// tokio-modbus frame logging is only let through at TRACE.
pub fn filter_directives(level: Level) -> String {
    let modbus = if level == Level::TRACE { Level::TRACE } else { Level::WARN };
    format!(
        "emcp={},tokio_modbus={}",
        level.as_str().to_lowercase(),
        modbus.as_str().to_lowercase()
    )
}
