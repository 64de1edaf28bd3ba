use crate::error::Result;

/// Modbus master operations used by the status cache and the commander.
///
/// Every read returns the raw payload as it appears in the Modbus response:
/// registers as big-endian byte pairs, coils and discrete inputs packed eight
/// per byte, lowest address in the least significant bit.
///
/// Implementations are a single session and are not meant to be shared;
/// callers hold `&mut` access for the duration of each operation.
#[async_trait::async_trait]
pub trait ModbusTransport: Send {
    async fn read_input_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>>;

    async fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>>;

    async fn read_discrete_inputs(&mut self, address: u16, count: u16) -> Result<Vec<u8>>;

    async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<u8>>;

    async fn write_single_register(&mut self, address: u16, value: u16) -> Result<()>;

    /// `value` is the wire encoding, 0xFF00 for on and 0x0000 for off
    async fn write_single_coil(&mut self, address: u16, value: u16) -> Result<()>;
}

/// Flatten 16-bit registers into their big-endian byte stream
pub fn registers_to_bytes(registers: &[u16]) -> Vec<u8> {
    registers.iter().flat_map(|r| r.to_be_bytes()).collect()
}

/// Pack bits the way a Modbus response carries them
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|&(_, &on)| on)
                .fold(0u8, |acc, (i, _)| acc | (1 << i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_flatten_big_endian() {
        assert_eq!(registers_to_bytes(&[0x0042, 0x1234]), vec![0x00, 0x42, 0x12, 0x34]);
        assert!(registers_to_bytes(&[]).is_empty());
    }

    #[test]
    fn bits_pack_lsb_first() {
        let bits = [true, false, false, false, false, false, false, true];
        assert_eq!(pack_bits(&bits), vec![0x81]);
        assert_eq!(pack_bits(&[false, true, true]), vec![0x06]);
        assert_eq!(pack_bits(&[true; 9]), vec![0xFF, 0x01]);
    }
}
