//! # emcp - Phoenix Contact EM-CP-PP-ETH charge controller client
//!
//! Talks to the charge controller over Modbus TCP, decodes its register
//! map into typed status values and issues the few write commands the
//! controller supports. A hard reset goes through the controller's web
//! configuration page.
//!
//! ## Architecture
//!
//! - `registers`: register and coil addresses
//! - `status`: typed status model (vehicle state, fault flags, measurements)
//! - `decoder`: byte-level decoding of register payloads
//! - `transport`: the Modbus operations the crate needs, as a trait
//! - `modbus`: tokio-modbus backed transport
//! - `status_cache`: multi-stage refresh with atomic commit
//! - `commander`: single-value reads and writes, HTTP hard reset
//! - `format`: human-readable status output
//! - `cli`: command line front end
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing

pub mod cli;
pub mod commander;
pub mod config;
pub mod decoder;
pub mod error;
pub mod format;
pub mod logging;
pub mod modbus;
pub mod registers;
pub mod status;
pub mod status_cache;
pub mod transport;

// Re-export commonly used types
pub use commander::Commander;
pub use config::Config;
pub use error::{EmcpError, Result};
pub use modbus::ModbusClient;
pub use status::{Status, VehicleState};
pub use status_cache::{CacheState, StatusCache};
pub use transport::ModbusTransport;
