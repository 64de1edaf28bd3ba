use super::*;

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 502,
            unit_id: 180,
            connection_timeout_ms: 5000,
            operation_timeout_ms: 3000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            reset_timeout_ms: 1000,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            read_charging_current: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: String::new(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}
