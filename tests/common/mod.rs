#![allow(dead_code)]

use emcp::decoder::{encode_discrete_input_block, encode_input_register_block};
use emcp::error::{EmcpError, Result};
use emcp::registers::{
    CHARGING_CURRENT_ADDR, COIL_ON, DISCRETE_INPUT_STATUS_ADDR, INPUT_REGISTER_STATUS_ADDR,
    OVERCURRENT_PROTECTION_ADDR,
};
use emcp::status::{
    DigitalInputs, DigitalOutputs, DiscreteInputStatus, Errorcode, InputRegisterStatus,
    Measurements, VehicleState,
};
use emcp::transport::ModbusTransport;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Input,
    Holding,
    Discrete,
    Coil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Register(u16, u16),
    Coil(u16, u16),
}

/// In-memory controller: payloads keyed by region and start address
#[derive(Debug, Default)]
pub struct MockTransport {
    payloads: HashMap<(Region, u16), Vec<u8>>,
    failures: HashSet<(Region, u16)>,
    pub reads: Vec<(Region, u16, u16)>,
    pub writes: Vec<Write>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller answering every status region
    pub fn healthy() -> Self {
        let mut mock = Self::new();
        mock.set_status(&sample_input(), 20, &sample_discrete(), 16);
        mock
    }

    pub fn set_status(
        &mut self,
        input: &InputRegisterStatus,
        overcurrent_protection: u16,
        discrete: &DiscreteInputStatus,
        charging_current: u16,
    ) {
        self.set_payload(
            Region::Input,
            INPUT_REGISTER_STATUS_ADDR,
            encode_input_register_block(input).to_vec(),
        );
        self.set_payload(
            Region::Input,
            OVERCURRENT_PROTECTION_ADDR,
            overcurrent_protection.to_be_bytes().to_vec(),
        );
        self.set_payload(
            Region::Discrete,
            DISCRETE_INPUT_STATUS_ADDR,
            encode_discrete_input_block(discrete).to_vec(),
        );
        self.set_payload(
            Region::Holding,
            CHARGING_CURRENT_ADDR,
            charging_current.to_be_bytes().to_vec(),
        );
    }

    pub fn set_payload(&mut self, region: Region, address: u16, bytes: Vec<u8>) {
        self.payloads.insert((region, address), bytes);
    }

    pub fn fail(&mut self, region: Region, address: u16) {
        self.failures.insert((region, address));
    }

    pub fn heal(&mut self, region: Region, address: u16) {
        self.failures.remove(&(region, address));
    }

    fn read(&mut self, region: Region, address: u16, count: u16) -> Result<Vec<u8>> {
        self.reads.push((region, address, count));
        if self.failures.contains(&(region, address)) {
            return Err(EmcpError::modbus("Connection reset by peer"));
        }
        self.payloads
            .get(&(region, address))
            .cloned()
            .ok_or_else(|| EmcpError::modbus("exception IllegalDataAddress"))
    }
}

#[async_trait::async_trait]
impl ModbusTransport for MockTransport {
    async fn read_input_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        self.read(Region::Input, address, count)
    }

    async fn read_holding_registers(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        self.read(Region::Holding, address, count)
    }

    async fn read_discrete_inputs(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        self.read(Region::Discrete, address, count)
    }

    async fn read_coils(&mut self, address: u16, count: u16) -> Result<Vec<u8>> {
        self.read(Region::Coil, address, count)
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> Result<()> {
        if self.failures.contains(&(Region::Holding, address)) {
            return Err(EmcpError::timeout("write single register timeout"));
        }
        self.writes.push(Write::Register(address, value));
        self.set_payload(Region::Holding, address, value.to_be_bytes().to_vec());
        Ok(())
    }

    async fn write_single_coil(&mut self, address: u16, value: u16) -> Result<()> {
        if self.failures.contains(&(Region::Coil, address)) {
            return Err(EmcpError::timeout("write single coil timeout"));
        }
        self.writes.push(Write::Coil(address, value));
        self.set_payload(Region::Coil, address, vec![u8::from(value == COIL_ON)]);
        Ok(())
    }
}

pub fn sample_measurements() -> Measurements {
    Measurements::from_array([
        230.0, 231.5, 229.87, // voltages
        16.0, 15.999, 0.5, // currents
        3680.0, 12.0, 3700.0, // active, reactive, apparent power
        0.995, 12.34, 11040.0, // power factor, energy, max power
        3650.0, 50.0, // current charge power, frequency
        32.0, 32.0, 32.0, // max currents
    ])
}

pub fn sample_input() -> InputRegisterStatus {
    InputRegisterStatus {
        ev_status: VehicleState::C,
        proximity_current: 32,
        charge_time_minutes: 25,
        charge_time_hours: 1,
        dip_configuration: 0x0012,
        firmware_version: 0x0001_0203,
        errorcode: Errorcode::from_word(0),
        measurements: sample_measurements(),
    }
}

pub fn sample_discrete() -> DiscreteInputStatus {
    DiscreteInputStatus {
        inputs: DigitalInputs::EN | DigitalInputs::ML,
        outputs: DigitalOutputs::CR,
    }
}
