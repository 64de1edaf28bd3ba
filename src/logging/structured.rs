use tracing::{debug, error, info, trace, warn};

/// Fields attached to every message of a logger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    /// Emitting module, e.g. "modbus" or "status_cache"
    pub component: String,
    /// Controller host, when the logger is bound to one session
    pub host: Option<String>,
    /// Modbus unit ID of that controller
    pub unit_id: Option<u8>,
}

impl LogContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn with_unit(mut self, unit_id: u8) -> Self {
        self.unit_id = Some(unit_id);
        self
    }
}

macro_rules! emit {
    ($level:ident, $logger:expr, $message:expr) => {{
        let ctx = &$logger.context;
        match (&ctx.host, ctx.unit_id) {
            (Some(host), Some(unit)) => {
                $level!(component = %ctx.component, host = %host, unit, "{}", $message)
            }
            (Some(host), None) => $level!(component = %ctx.component, host = %host, "{}", $message),
            _ => $level!(component = %ctx.component, "{}", $message),
        }
    }};
}

/// Logger bound to a [`LogContext`]. Context is recorded as separate
/// tracing fields, so JSON output keeps them queryable.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn info(&self, message: &str) {
        emit!(info, self, message);
    }

    pub fn warn(&self, message: &str) {
        emit!(warn, self, message);
    }

    pub fn error(&self, message: &str) {
        emit!(error, self, message);
    }

    pub fn debug(&self, message: &str) {
        emit!(debug, self, message);
    }

    pub fn trace(&self, message: &str) {
        emit!(trace, self, message);
    }
}

pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
