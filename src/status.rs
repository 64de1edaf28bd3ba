//! Typed snapshot of the charge controller state
//!
//! A [`Status`] is only ever produced whole by a successful refresh; see
//! [`crate::status_cache::StatusCache`].

use crate::error::{EmcpError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle connection state as reported by the controller (IEC 61851 / J1772)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleState {
    /// No vehicle connected
    A,
    /// Vehicle connected, not charging
    B,
    /// Charging
    C,
    /// Charging with ventilation
    D,
    /// Short circuit or no power
    E,
    /// Controller error
    F,
}

impl VehicleState {
    pub const ALL: [VehicleState; 6] = [
        VehicleState::A,
        VehicleState::B,
        VehicleState::C,
        VehicleState::D,
        VehicleState::E,
        VehicleState::F,
    ];

    /// Register value of this state (ASCII letter)
    pub const fn code(self) -> u16 {
        match self {
            VehicleState::A => 65,
            VehicleState::B => 66,
            VehicleState::C => 67,
            VehicleState::D => 68,
            VehicleState::E => 69,
            VehicleState::F => 70,
        }
    }

    pub const fn as_char(self) -> char {
        self.code() as u8 as char
    }
}

impl TryFrom<u16> for VehicleState {
    type Error = EmcpError;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            65 => Ok(VehicleState::A),
            66 => Ok(VehicleState::B),
            67 => Ok(VehicleState::C),
            68 => Ok(VehicleState::D),
            69 => Ok(VehicleState::E),
            70 => Ok(VehicleState::F),
            other => Err(EmcpError::invalid_vehicle_state(other)),
        }
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

bitflags! {
    /// Fault word of the controller. Flags are independent; several can be
    /// raised at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Errorcode: u16 {
        const CABLE_13A_20A = 1 << 0;
        const CABLE_13A = 1 << 1;
        const INVALID_PP = 1 << 2;
        const INVALID_CP = 1 << 3;
        const STATE_F = 1 << 4;
        const LOCKING = 1 << 5;
        const UNLOCKING = 1 << 6;
        const FAILURE_LD = 1 << 7;
        const OVERCURRENT = 1 << 8;
        const COM_MEASUREMENT_FAILURE = 1 << 9;
        const REJECTED_STATE_D = 1 << 10;
        const CONTACTOR_FAILURE = 1 << 11;
        const CP_NO_DIODE = 1 << 12;
    }
}

impl Errorcode {
    /// Decode the raw fault word. Bits without a name are kept so that
    /// [`Errorcode::is_ok`] still reflects the whole word.
    pub const fn from_word(word: u16) -> Self {
        Self::from_bits_retain(word)
    }

    /// True iff the raw fault word is zero. Bits 13-15 have no name, so a
    /// word using only those is not OK yet has no named flag set.
    pub const fn is_ok(&self) -> bool {
        self.bits() == 0
    }

    pub const fn cable_13a_20a(&self) -> bool {
        self.contains(Self::CABLE_13A_20A)
    }
    pub const fn cable_13a(&self) -> bool {
        self.contains(Self::CABLE_13A)
    }
    pub const fn invalid_pp(&self) -> bool {
        self.contains(Self::INVALID_PP)
    }
    pub const fn invalid_cp(&self) -> bool {
        self.contains(Self::INVALID_CP)
    }
    pub const fn state_f(&self) -> bool {
        self.contains(Self::STATE_F)
    }
    pub const fn locking(&self) -> bool {
        self.contains(Self::LOCKING)
    }
    pub const fn unlocking(&self) -> bool {
        self.contains(Self::UNLOCKING)
    }
    pub const fn failure_ld(&self) -> bool {
        self.contains(Self::FAILURE_LD)
    }
    pub const fn overcurrent(&self) -> bool {
        self.contains(Self::OVERCURRENT)
    }
    pub const fn com_measurement_failure(&self) -> bool {
        self.contains(Self::COM_MEASUREMENT_FAILURE)
    }
    pub const fn rejected_state_d(&self) -> bool {
        self.contains(Self::REJECTED_STATE_D)
    }
    pub const fn contactor_failure(&self) -> bool {
        self.contains(Self::CONTACTOR_FAILURE)
    }
    pub const fn cp_no_diode(&self) -> bool {
        self.contains(Self::CP_NO_DIODE)
    }
}

bitflags! {
    /// Digital inputs, low nibble of the discrete input byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DigitalInputs: u8 {
        const EN = 0x01;
        const XR = 0x02;
        const LD = 0x04;
        const ML = 0x08;
    }
}

bitflags! {
    /// Digital outputs, high nibble of the discrete input byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DigitalOutputs: u8 {
        const CR = 0x10;
        const LR = 0x20;
        const VR = 0x40;
        const ER = 0x80;
    }
}

/// Scaled 32-bit measurements of the input register block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    /// Volts
    pub l1_voltage: f64,
    pub l2_voltage: f64,
    pub l3_voltage: f64,
    /// Amps
    pub l1_current: f64,
    pub l2_current: f64,
    pub l3_current: f64,
    /// Watts
    pub active_power: f64,
    pub reactive_power: f64,
    /// Volt-amps
    pub apparent_power: f64,
    pub power_factor: f64,
    /// kWh
    pub energy: f64,
    /// Peak power of the current charge sequence, watts
    pub max_power: f64,
    pub current_charge_power: f64,
    /// Hz
    pub frequency: f64,
    /// Amps
    pub l1_max_current: f64,
    pub l2_max_current: f64,
    pub l3_max_current: f64,
}

impl Measurements {
    pub const COUNT: usize = 17;

    /// Values in register order
    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.l1_voltage,
            self.l2_voltage,
            self.l3_voltage,
            self.l1_current,
            self.l2_current,
            self.l3_current,
            self.active_power,
            self.reactive_power,
            self.apparent_power,
            self.power_factor,
            self.energy,
            self.max_power,
            self.current_charge_power,
            self.frequency,
            self.l1_max_current,
            self.l2_max_current,
            self.l3_max_current,
        ]
    }

    /// Build from values in register order
    pub fn from_array(v: [f64; Self::COUNT]) -> Self {
        Self {
            l1_voltage: v[0],
            l2_voltage: v[1],
            l3_voltage: v[2],
            l1_current: v[3],
            l2_current: v[4],
            l3_current: v[5],
            active_power: v[6],
            reactive_power: v[7],
            apparent_power: v[8],
            power_factor: v[9],
            energy: v[10],
            max_power: v[11],
            current_charge_power: v[12],
            frequency: v[13],
            l1_max_current: v[14],
            l2_max_current: v[15],
            l3_max_current: v[16],
        }
    }
}

/// Everything decoded from the 84-byte input register block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRegisterStatus {
    pub ev_status: VehicleState,
    /// Raw proximity pilot current code
    pub proximity_current: u16,
    /// Raw seconds register divided by 60. Does not match the minutes shown
    /// by the controller's own web UI.
    pub charge_time_minutes: u16,
    pub charge_time_hours: u16,
    pub dip_configuration: u16,
    pub firmware_version: u32,
    pub errorcode: Errorcode,
    pub measurements: Measurements,
}

/// Digital I/O decoded from the discrete input byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscreteInputStatus {
    pub inputs: DigitalInputs,
    pub outputs: DigitalOutputs,
}

/// Snapshot of the charge controller after a complete refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub ev_status: VehicleState,
    pub proximity_current: u16,
    pub charge_time_hours: u16,
    pub charge_time_minutes: u16,
    pub dip_configuration: u16,
    pub firmware_version: u32,
    pub errorcode: Errorcode,
    pub measurements: Measurements,
    pub overcurrent_protection: u16,
    pub digital_inputs: DigitalInputs,
    pub digital_outputs: DigitalOutputs,
    /// Only present when the refresh also fetched the holding register
    pub actual_charging_current: Option<u16>,
}

impl Status {
    /// Assemble a snapshot from the decoded stages of one refresh
    pub fn from_parts(
        input: InputRegisterStatus,
        overcurrent_protection: u16,
        discrete: DiscreteInputStatus,
        actual_charging_current: Option<u16>,
    ) -> Self {
        Self {
            ev_status: input.ev_status,
            proximity_current: input.proximity_current,
            charge_time_hours: input.charge_time_hours,
            charge_time_minutes: input.charge_time_minutes,
            dip_configuration: input.dip_configuration,
            firmware_version: input.firmware_version,
            errorcode: input.errorcode,
            measurements: input.measurements,
            overcurrent_protection,
            digital_inputs: discrete.inputs,
            digital_outputs: discrete.outputs,
            actual_charging_current,
        }
    }
}
