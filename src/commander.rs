//! Single-value commands against the charge controller
//!
//! Each command is one Modbus request plus a decode, with no dependency on
//! the cached status. The hard reset goes through the controller's web
//! configuration page instead of Modbus.

use crate::decoder::decode_register_u16;
use crate::error::{EmcpError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::registers::{CHARGING_CURRENT_ADDR, CHARGING_ENABLED_COIL_ADDR, DIGIMODE_COIL_ADDR, coil_value};
use crate::transport::ModbusTransport;

/// Read holding register 300, the actual charging current in amps
pub(crate) async fn read_charging_current<T>(transport: &mut T) -> Result<u16>
where
    T: ModbusTransport + ?Sized,
{
    let raw = transport
        .read_holding_registers(CHARGING_CURRENT_ADDR, 1)
        .await?;
    decode_register_u16("charging current register", &raw)
}

async fn read_coil<T>(transport: &mut T, address: u16) -> Result<bool>
where
    T: ModbusTransport + ?Sized,
{
    let raw = transport.read_coils(address, 1).await?;
    match raw.first() {
        Some(&byte) => Ok(byte != 0),
        None => Err(EmcpError::invalid_length("coil", 1, 0)),
    }
}

/// Issues commands over a borrowed Modbus session
pub struct Commander<'a, T: ModbusTransport + ?Sized> {
    transport: &'a mut T,
    logger: StructuredLogger,
}

impl<'a, T: ModbusTransport + ?Sized> Commander<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self {
            transport,
            logger: get_logger("commander"),
        }
    }

    pub async fn read_actual_charging_current(&mut self) -> Result<u16> {
        let amps = read_charging_current(&mut *self.transport).await?;
        self.logger
            .debug(&format!("Actual charging current: {} A", amps));
        Ok(amps)
    }

    pub async fn write_actual_charging_current(&mut self, amps: u16) -> Result<()> {
        self.logger
            .info(&format!("Setting charging current to {} A", amps));
        self.transport
            .write_single_register(CHARGING_CURRENT_ADDR, amps)
            .await
    }

    /// Charging station availability (coil 402)
    pub async fn read_charging_enabled(&mut self) -> Result<bool> {
        read_coil(&mut *self.transport, CHARGING_ENABLED_COIL_ADDR).await
    }

    pub async fn write_charging_enabled(&mut self, enabled: bool) -> Result<()> {
        self.logger
            .info(&format!("Setting charging station availability to {}", enabled));
        self.transport
            .write_single_coil(CHARGING_ENABLED_COIL_ADDR, coil_value(enabled))
            .await
    }

    /// Digital communication mode (coil 401)
    pub async fn read_digimode_enabled(&mut self) -> Result<bool> {
        read_coil(&mut *self.transport, DIGIMODE_COIL_ADDR).await
    }

    pub async fn write_digimode_enabled(&mut self, enabled: bool) -> Result<()> {
        self.logger
            .info(&format!("Setting digital communication mode to {}", enabled));
        self.transport
            .write_single_coil(DIGIMODE_COIL_ADDR, coil_value(enabled))
            .await
    }
}

/// URL of the controller's reset trigger
pub fn reset_url(host: &str) -> String {
    format!("http://{}/config.html?reset=1", host)
}

/// How the reset request ended
#[cfg(feature = "http-reset")]
#[derive(Debug)]
enum ResetOutcome {
    /// The controller answered before resetting
    Answered(reqwest::StatusCode),
    /// No answer within the deadline; the controller went down mid-request
    DeadlineExceeded,
    Failed(reqwest::Error),
}

#[cfg(feature = "http-reset")]
fn classify_reset(result: std::result::Result<reqwest::Response, reqwest::Error>) -> ResetOutcome {
    match result {
        Ok(resp) => ResetOutcome::Answered(resp.status()),
        Err(e) if e.is_timeout() => ResetOutcome::DeadlineExceeded,
        Err(e) => ResetOutcome::Failed(e),
    }
}

/// Trigger a hard reset through the web configuration page.
///
/// The controller resets before replying, so hitting `deadline` counts as
/// success. Any other HTTP failure is returned.
#[cfg(feature = "http-reset")]
pub async fn hard_reset(host: &str, deadline: std::time::Duration) -> Result<()> {
    let logger = get_logger("commander");
    let url = reset_url(host);
    logger.info(&format!("Requesting hard reset via {}", url));

    let client = reqwest::Client::builder()
        .timeout(deadline)
        .pool_max_idle_per_host(0)
        .build()?;

    match classify_reset(client.get(&url).send().await) {
        ResetOutcome::Answered(status) => {
            logger.info(&format!("Controller answered reset request with {}", status));
            Ok(())
        }
        ResetOutcome::DeadlineExceeded => {
            logger.info("Reset sent, controller did not answer");
            Ok(())
        }
        ResetOutcome::Failed(e) => {
            logger.error(&format!("Reset request failed: {}", e));
            Err(e.into())
        }
    }
}
