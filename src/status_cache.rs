//! Status cache for the charge controller
//!
//! A refresh is a multi-stage read because the controller spreads its state
//! over several Modbus regions:
//!
//! 1. input registers 100..142 (status and measurements)
//! 2. input register 142 (overcurrent protection threshold)
//! 3. discrete inputs 200..208 (digital I/O)
//! 4. optionally holding register 300 (actual charging current)
//!
//! Every stage decodes into a local value. The new [`Status`] replaces the
//! cached one only once all stages succeeded, so a failed refresh never
//! leaves a half-updated snapshot behind.

use crate::commander::read_charging_current;
use crate::config::StatusConfig;
use crate::decoder::{
    decode_discrete_input_block, decode_input_register_block, decode_overcurrent_protection,
};
use crate::error::{EmcpError, RefreshStage, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::registers::{
    DISCRETE_INPUT_STATUS_ADDR, DISCRETE_INPUT_STATUS_COUNT, INPUT_REGISTER_STATUS_ADDR,
    INPUT_REGISTER_STATUS_COUNT, OVERCURRENT_PROTECTION_ADDR, OVERCURRENT_PROTECTION_COUNT,
};
use crate::status::Status;
use crate::transport::ModbusTransport;
use chrono::{DateTime, Utc};

/// Freshness of the cached status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never refreshed, or the last refresh failed
    Stale,
    /// The last refresh completed every stage
    Fresh,
}

/// Owns the last committed [`Status`] of one controller
#[derive(Debug)]
pub struct StatusCache {
    status: Option<Status>,
    state: CacheState,
    refreshed_at: Option<DateTime<Utc>>,
    read_charging_current: bool,
    logger: StructuredLogger,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(&StatusConfig::default())
    }
}

impl StatusCache {
    pub fn new(config: &StatusConfig) -> Self {
        Self {
            status: None,
            state: CacheState::Stale,
            refreshed_at: None,
            read_charging_current: config.read_charging_current,
            logger: get_logger("status_cache"),
        }
    }

    /// Read every status region and commit the result as a whole.
    ///
    /// On error the cache turns [`CacheState::Stale`] and keeps the previous
    /// status; the error names the stage that failed.
    pub async fn refresh<T>(&mut self, transport: &mut T) -> Result<&Status>
    where
        T: ModbusTransport + ?Sized,
    {
        self.logger.debug("Refreshing controller status");
        match fetch_status(transport, self.read_charging_current).await {
            Ok(status) => {
                self.state = CacheState::Fresh;
                self.refreshed_at = Some(Utc::now());
                self.logger.debug(&format!(
                    "Status committed: vehicle state {}, fault word {:#06x}",
                    status.ev_status,
                    status.errorcode.bits()
                ));
                Ok(&*self.status.insert(status))
            }
            Err(e) => {
                self.state = CacheState::Stale;
                self.logger.warn(&format!("Status refresh failed: {}", e));
                Err(e)
            }
        }
    }

    /// Last committed status, whether or not the latest refresh succeeded
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_fresh(&self) -> bool {
        self.state == CacheState::Fresh
    }

    /// Time of the last successful commit
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

async fn fetch_status<T>(transport: &mut T, with_charging_current: bool) -> Result<Status>
where
    T: ModbusTransport + ?Sized,
{
    let stage = |at: RefreshStage| move |e: EmcpError| EmcpError::refresh(at, e);

    let raw = transport
        .read_input_registers(INPUT_REGISTER_STATUS_ADDR, INPUT_REGISTER_STATUS_COUNT)
        .await
        .map_err(stage(RefreshStage::ReadInputRegisters))?;
    let input =
        decode_input_register_block(&raw).map_err(stage(RefreshStage::ParseInputRegisters))?;

    let raw = transport
        .read_input_registers(OVERCURRENT_PROTECTION_ADDR, OVERCURRENT_PROTECTION_COUNT)
        .await
        .map_err(stage(RefreshStage::ReadOvercurrentProtection))?;
    let overcurrent_protection = decode_overcurrent_protection(&raw)
        .map_err(stage(RefreshStage::ParseOvercurrentProtection))?;

    let raw = transport
        .read_discrete_inputs(DISCRETE_INPUT_STATUS_ADDR, DISCRETE_INPUT_STATUS_COUNT)
        .await
        .map_err(stage(RefreshStage::ReadDiscreteInputs))?;
    let discrete =
        decode_discrete_input_block(&raw).map_err(stage(RefreshStage::ParseDiscreteInputs))?;

    let actual_charging_current = if with_charging_current {
        Some(
            read_charging_current(transport)
                .await
                .map_err(stage(RefreshStage::ReadChargingCurrent))?,
        )
    } else {
        None
    };

    Ok(Status::from_parts(
        input,
        overcurrent_protection,
        discrete,
        actual_charging_current,
    ))
}
