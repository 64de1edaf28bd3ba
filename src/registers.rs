//! Register map of the EM-CP-PP-ETH charge controller
//!
//! Addresses are fixed by the controller firmware. All multi-byte values are
//! big-endian; 32-bit measurements additionally arrive word-swapped.

/// Input register block holding status and measurements
pub const INPUT_REGISTER_STATUS_ADDR: u16 = 100;
pub const INPUT_REGISTER_STATUS_COUNT: u16 = 42;
pub const INPUT_REGISTER_STATUS_BYTES: usize = INPUT_REGISTER_STATUS_COUNT as usize * 2;

/// Overcurrent protection threshold, the register right after the status block
pub const OVERCURRENT_PROTECTION_ADDR: u16 = INPUT_REGISTER_STATUS_ADDR + INPUT_REGISTER_STATUS_COUNT;
pub const OVERCURRENT_PROTECTION_COUNT: u16 = 1;
pub const OVERCURRENT_PROTECTION_BYTES: usize = 2;

/// Discrete inputs carrying the digital I/O states
pub const DISCRETE_INPUT_STATUS_ADDR: u16 = 200;
pub const DISCRETE_INPUT_STATUS_COUNT: u16 = 8;
pub const DISCRETE_INPUT_STATUS_BYTES: usize = 1;

/// Holding register with the actual charging current in amps
pub const CHARGING_CURRENT_ADDR: u16 = 300;

/// Coil enabling the digital communication mode
pub const DIGIMODE_COIL_ADDR: u16 = 401;

/// Coil making the charging station (un)available
pub const CHARGING_ENABLED_COIL_ADDR: u16 = 402;

/// Wire value of a coil switched on
pub const COIL_ON: u16 = 0xFF00;
/// Wire value of a coil switched off
pub const COIL_OFF: u16 = 0x0000;

/// Encode a boolean as a single coil write value
pub const fn coil_value(state: bool) -> u16 {
    if state { COIL_ON } else { COIL_OFF }
}
