//! Modbus TCP client for the EM-CP-PP-ETH charge controller
//!
//! This module provides the tokio-modbus backed [`ModbusTransport`]
//! implementation: one TCP session per controller, bounded by connect and
//! per-operation timeouts. Nothing is retried here; failures go straight
//! back to the caller.

use crate::config::ModbusConfig;
use crate::error::{EmcpError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::registers::{COIL_OFF, COIL_ON};
use crate::transport::{ModbusTransport, pack_bits, registers_to_bytes};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tokio_modbus::client::{Context, tcp};
use tokio_modbus::prelude::{Reader, Slave, Writer};

/// Modbus TCP client for controller communication
pub struct ModbusClient {
    /// Modbus TCP client connection
    client: Option<Context>,

    /// Configuration
    config: ModbusConfig,

    /// Connection timeout
    connection_timeout: Duration,

    /// Operation timeout
    operation_timeout: Duration,

    /// Logger
    logger: StructuredLogger,
}

impl ModbusClient {
    /// Create a new Modbus client
    pub fn new(config: &ModbusConfig) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("modbus")
                .with_host(&config.host)
                .with_unit(config.unit_id),
        );
        Self {
            client: None,
            config: config.clone(),
            connection_timeout: Duration::from_millis(config.connection_timeout_ms),
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
            logger,
        }
    }

    /// Connect to the charge controller
    pub async fn connect(&mut self) -> Result<()> {
        let address = format!("{}:{}", self.config.host, self.config.port);

        self.logger.info(&format!(
            "Connecting to Modbus server at {} (unit {})",
            address, self.config.unit_id
        ));

        let socket_addr = tokio::net::lookup_host(address.as_str())
            .await
            .map_err(|e| EmcpError::modbus(format!("Invalid socket address: {}", e)))?
            .next()
            .ok_or_else(|| EmcpError::modbus(format!("Invalid socket address: {}", address)))?;

        let slave = Slave(self.config.unit_id);
        match timeout(self.connection_timeout, tcp::connect_slave(socket_addr, slave)).await {
            Ok(Ok(client)) => {
                self.client = Some(client);
                self.logger.info("Successfully connected to Modbus server");
                Ok(())
            }
            Ok(Err(e)) => {
                let error_msg = format!("Failed to connect to Modbus server: {}", e);
                self.logger.error(&error_msg);
                Err(EmcpError::modbus(error_msg))
            }
            Err(_) => {
                let error_msg = "Connection timeout".to_string();
                self.logger.error(&error_msg);
                Err(EmcpError::timeout(error_msg))
            }
        }
    }

    /// Drop the session
    pub fn disconnect(&mut self) {
        if self.client.take().is_some() {
            self.logger.info("Disconnecting from Modbus server");
        }
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Split borrows of the live session, or error if not connected
    fn session(&mut self) -> Result<(&mut Context, &StructuredLogger, Duration)> {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| EmcpError::modbus("Not connected to Modbus server"))?;
        Ok((client, &self.logger, self.operation_timeout))
    }
}

/// Await a tokio-modbus request under a deadline and flatten its nested result
async fn complete<T>(
    logger: &StructuredLogger,
    operation: &str,
    deadline: Duration,
    request: impl Future<Output = tokio_modbus::Result<T>>,
) -> Result<T> {
    match timeout(deadline, request).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(exception))) => {
            let error_msg = format!("Failed to {}: exception {:?}", operation, exception);
            logger.error(&error_msg);
            Err(EmcpError::modbus(error_msg))
        }
        Ok(Err(e)) => {
            let error_msg = format!("Failed to {}: {}", operation, e);
            logger.error(&error_msg);
            Err(EmcpError::modbus(error_msg))
        }
        Err(_) => {
            let error_msg = format!("{} timeout", operation);
            logger.error(&error_msg);
            Err(EmcpError::timeout(error_msg))
        }
    }
}

#[async_trait::async_trait]
impl ModbusTransport for ModbusClient {
    async fn read_input_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!(
            "Reading {} input registers from address {}",
            count, address
        ));
        let words = complete(
            logger,
            "read input registers",
            deadline,
            client.read_input_registers(address, count),
        )
        .await?;
        logger.trace(&format!("Read {} registers: {:?}", words.len(), words));
        Ok(registers_to_bytes(&words))
    }

    async fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!(
            "Reading {} holding registers from address {}",
            count, address
        ));
        let words = complete(
            logger,
            "read holding registers",
            deadline,
            client.read_holding_registers(address, count),
        )
        .await?;
        logger.trace(&format!("Read {} registers: {:?}", words.len(), words));
        Ok(registers_to_bytes(&words))
    }

    async fn read_discrete_inputs(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!(
            "Reading {} discrete inputs from address {}",
            count, address
        ));
        let bits = complete(
            logger,
            "read discrete inputs",
            deadline,
            client.read_discrete_inputs(address, count),
        )
        .await?;
        Ok(pack_bits(&bits))
    }

    async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!("Reading {} coils from address {}", count, address));
        let bits = complete(
            logger,
            "read coils",
            deadline,
            client.read_coils(address, count),
        )
        .await?;
        Ok(pack_bits(&bits))
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> Result<()> {
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!("Writing value {} to register {}", value, address));
        complete(
            logger,
            "write single register",
            deadline,
            client.write_single_register(address, value),
        )
        .await?;
        logger.debug("Successfully wrote single register");
        Ok(())
    }

    async fn write_single_coil(&mut self, address: u16, value: u16) -> Result<()> {
        let state = match value {
            COIL_ON => true,
            COIL_OFF => false,
            other => {
                return Err(EmcpError::modbus(format!(
                    "Invalid coil value {:#06x}, expected 0xFF00 or 0x0000",
                    other
                )));
            }
        };
        let (client, logger, deadline) = self.session()?;
        logger.debug(&format!("Writing coil {} = {}", address, state));
        complete(
            logger,
            "write single coil",
            deadline,
            client.write_single_coil(address, state),
        )
        .await?;
        logger.debug("Successfully wrote single coil");
        Ok(())
    }
}
