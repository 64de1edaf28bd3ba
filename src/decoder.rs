//! Register decoder for the EM-CP-PP-ETH status blocks
//!
//! Pure functions turning raw big-endian Modbus payloads into typed values.
//! Length and vehicle state are validated; scaled values are passed through
//! as the device reports them.
//!
//! 32-bit measurements occupy two registers with the low word first, so each
//! 4-byte group is word-swapped before the big-endian decode.

use crate::error::{EmcpError, Result};
use crate::registers::{
    DISCRETE_INPUT_STATUS_BYTES, INPUT_REGISTER_STATUS_BYTES, OVERCURRENT_PROTECTION_BYTES,
};
use crate::status::{
    DigitalInputs, DigitalOutputs, DiscreteInputStatus, Errorcode, InputRegisterStatus,
    Measurements, VehicleState,
};

/// Byte offset of the first 32-bit measurement in the input register block
pub const MEASUREMENTS_OFFSET: usize = 16;
/// Length of the measurement area
pub const MEASUREMENTS_BYTES: usize = Measurements::COUNT * 4;

/// Scale applied to a raw measurement integer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Divide(f64),
    Multiply(f64),
    Raw,
}

impl Scale {
    pub fn apply(self, raw: u32) -> f64 {
        let raw = f64::from(raw);
        match self {
            Scale::Divide(d) => raw / d,
            Scale::Multiply(m) => raw * m,
            Scale::Raw => raw,
        }
    }

    /// Inverse of [`Scale::apply`], rounded to the nearest register value
    pub fn invert(self, value: f64) -> u32 {
        let raw = match self {
            Scale::Divide(d) => value * d,
            Scale::Multiply(m) => value / m,
            Scale::Raw => value,
        };
        raw.round() as u32
    }
}

/// Scale of each measurement, in register order (see [`Measurements::to_array`])
pub const MEASUREMENT_SCALES: [Scale; Measurements::COUNT] = [
    Scale::Divide(100.0),   // L1 voltage
    Scale::Divide(100.0),   // L2 voltage
    Scale::Divide(100.0),   // L3 voltage
    Scale::Divide(1000.0),  // L1 current
    Scale::Divide(1000.0),  // L2 current
    Scale::Divide(1000.0),  // L3 current
    Scale::Multiply(10.0),  // active power
    Scale::Raw,             // reactive power
    Scale::Multiply(10.0),  // apparent power
    Scale::Divide(1000.0),  // power factor
    Scale::Divide(100.0),   // energy
    Scale::Multiply(10.0),  // max power
    Scale::Raw,             // current charge power
    Scale::Divide(100.0),   // frequency
    Scale::Raw,             // L1 max current
    Scale::Raw,             // L2 max current
    Scale::Raw,             // L3 max current
];

/// Exchange the two 16-bit words of a 4-byte group. Its own inverse.
pub const fn swap_words(group: [u8; 4]) -> [u8; 4] {
    [group[2], group[3], group[0], group[1]]
}

fn be_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

fn be_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn word_swapped_u32(buf: &[u8], offset: usize) -> u32 {
    let group = [
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ];
    u32::from_be_bytes(swap_words(group))
}

/// Decode the 84-byte input register block (registers 100..142)
pub fn decode_input_register_block(buf: &[u8]) -> Result<InputRegisterStatus> {
    let buf: &[u8; INPUT_REGISTER_STATUS_BYTES] = buf.try_into().map_err(|_| {
        EmcpError::invalid_length("input register", INPUT_REGISTER_STATUS_BYTES, buf.len())
    })?;

    let ev_status = VehicleState::try_from(be_u16(buf, 0))?;

    let mut values = [0.0f64; Measurements::COUNT];
    for (i, (value, scale)) in values.iter_mut().zip(MEASUREMENT_SCALES).enumerate() {
        *value = scale.apply(word_swapped_u32(buf, MEASUREMENTS_OFFSET + i * 4));
    }

    Ok(InputRegisterStatus {
        ev_status,
        proximity_current: be_u16(buf, 2),
        // Seconds register; the controller's web UI shows something else.
        charge_time_minutes: be_u16(buf, 4) / 60,
        charge_time_hours: be_u16(buf, 6),
        dip_configuration: be_u16(buf, 8),
        firmware_version: be_u32(buf, 10),
        errorcode: Errorcode::from_word(be_u16(buf, 14)),
        measurements: Measurements::from_array(values),
    })
}

/// Decode the single discrete input byte (discrete inputs 200..208)
pub fn decode_discrete_input_block(buf: &[u8]) -> Result<DiscreteInputStatus> {
    let &[state] = buf else {
        return Err(EmcpError::invalid_length(
            "discrete input",
            DISCRETE_INPUT_STATUS_BYTES,
            buf.len(),
        ));
    };
    Ok(DiscreteInputStatus {
        inputs: DigitalInputs::from_bits_truncate(state),
        outputs: DigitalOutputs::from_bits_truncate(state),
    })
}

/// Decode the overcurrent protection threshold (input register 142)
pub fn decode_overcurrent_protection(buf: &[u8]) -> Result<u16> {
    match *buf {
        [hi, lo] => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(EmcpError::invalid_length(
            "overcurrent protection",
            OVERCURRENT_PROTECTION_BYTES,
            buf.len(),
        )),
    }
}

/// Decode a single holding register value
pub fn decode_register_u16(region: &'static str, buf: &[u8]) -> Result<u16> {
    match *buf {
        [hi, lo] => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(EmcpError::invalid_length(region, 2, buf.len())),
    }
}

/// Encode measurements back into their word-swapped wire form
pub fn encode_measurements(measurements: &Measurements) -> [u8; MEASUREMENTS_BYTES] {
    let mut out = [0u8; MEASUREMENTS_BYTES];
    for ((chunk, value), scale) in out
        .chunks_exact_mut(4)
        .zip(measurements.to_array())
        .zip(MEASUREMENT_SCALES)
    {
        chunk.copy_from_slice(&swap_words(scale.invert(value).to_be_bytes()));
    }
    out
}

/// Encode a decoded block back into register bytes. Charge minutes are
/// written back as whole minutes worth of seconds.
pub fn encode_input_register_block(status: &InputRegisterStatus) -> [u8; INPUT_REGISTER_STATUS_BYTES] {
    let mut out = [0u8; INPUT_REGISTER_STATUS_BYTES];
    out[0..2].copy_from_slice(&status.ev_status.code().to_be_bytes());
    out[2..4].copy_from_slice(&status.proximity_current.to_be_bytes());
    out[4..6].copy_from_slice(&status.charge_time_minutes.saturating_mul(60).to_be_bytes());
    out[6..8].copy_from_slice(&status.charge_time_hours.to_be_bytes());
    out[8..10].copy_from_slice(&status.dip_configuration.to_be_bytes());
    out[10..14].copy_from_slice(&status.firmware_version.to_be_bytes());
    out[14..16].copy_from_slice(&status.errorcode.bits().to_be_bytes());
    out[MEASUREMENTS_OFFSET..].copy_from_slice(&encode_measurements(&status.measurements));
    out
}

/// Encode digital I/O flags back into the discrete input byte
pub fn encode_discrete_input_block(status: &DiscreteInputStatus) -> [u8; DISCRETE_INPUT_STATUS_BYTES] {
    [status.inputs.bits() | status.outputs.bits()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with_state(code: u16) -> Vec<u8> {
        let mut buf = vec![0u8; INPUT_REGISTER_STATUS_BYTES];
        buf[0..2].copy_from_slice(&code.to_be_bytes());
        buf
    }

    #[test]
    fn swap_words_is_involution() {
        let g = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(swap_words(g), [0x56, 0x78, 0x12, 0x34]);
        assert_eq!(swap_words(swap_words(g)), g);
    }

    #[test]
    fn decodes_l1_voltage_from_swapped_words() {
        let mut buf = block_with_state(0x0042);
        // 23000 = 0x000059D8, low word first on the wire
        buf[16..20].copy_from_slice(&[0x59, 0xD8, 0x00, 0x00]);
        let s = decode_input_register_block(&buf).unwrap();
        assert_eq!(s.ev_status, VehicleState::B);
        assert!((s.measurements.l1_voltage - 230.00).abs() < 1e-9);
    }

    #[test]
    fn charge_minutes_are_seconds_over_sixty() {
        let mut buf = block_with_state(65);
        buf[4..6].copy_from_slice(&125u16.to_be_bytes());
        buf[6..8].copy_from_slice(&3u16.to_be_bytes());
        let s = decode_input_register_block(&buf).unwrap();
        assert_eq!(s.charge_time_minutes, 2);
        assert_eq!(s.charge_time_hours, 3);
    }

    #[test]
    fn header_fields_decode_big_endian() {
        let mut buf = block_with_state(67);
        buf[2..4].copy_from_slice(&32u16.to_be_bytes());
        buf[8..10].copy_from_slice(&0x0102u16.to_be_bytes());
        buf[10..14].copy_from_slice(&0x0001_0203u32.to_be_bytes());
        buf[14..16].copy_from_slice(&0x0100u16.to_be_bytes());
        let s = decode_input_register_block(&buf).unwrap();
        assert_eq!(s.proximity_current, 32);
        assert_eq!(s.dip_configuration, 0x0102);
        assert_eq!(s.firmware_version, 0x0001_0203);
        assert!(s.errorcode.overcurrent());
        assert!(!s.errorcode.is_ok());
    }

    #[test]
    fn scales_follow_register_table() {
        assert_eq!(Scale::Divide(1000.0).apply(16_000), 16.0);
        assert_eq!(Scale::Multiply(10.0).apply(368), 3680.0);
        assert_eq!(Scale::Raw.apply(7), 7.0);
        assert_eq!(Scale::Divide(100.0).invert(230.0), 23_000);
        assert_eq!(Scale::Multiply(10.0).invert(3680.0), 368);
    }

    #[test]
    fn rejects_wrong_lengths() {
        for len in [0usize, 1, 83, 85, 86] {
            let err = decode_input_register_block(&vec![0u8; len]).unwrap_err();
            assert!(matches!(
                err,
                EmcpError::InvalidLength { expected: 84, actual, .. } if actual == len
            ));
        }
        assert!(decode_discrete_input_block(&[]).is_err());
        assert!(decode_discrete_input_block(&[0, 0]).is_err());
        assert!(decode_overcurrent_protection(&[1]).is_err());
    }

    #[test]
    fn discrete_byte_splits_into_nibbles() {
        let s = decode_discrete_input_block(&[0x81]).unwrap();
        assert_eq!(s.inputs, DigitalInputs::EN);
        assert_eq!(s.outputs, DigitalOutputs::ER);
        assert_eq!(encode_discrete_input_block(&s), [0x81]);
    }

    #[test]
    fn overcurrent_register_is_plain_big_endian() {
        assert_eq!(decode_overcurrent_protection(&[0x00, 0x10]).unwrap(), 16);
        assert_eq!(decode_register_u16("holding register", &[0x01, 0x00]).unwrap(), 256);
    }
}
