//! Human-readable rendering of a [`Status`]

use crate::status::{DigitalInputs, DigitalOutputs, Errorcode, Status};
use std::fmt;
use std::io;

impl fmt::Display for Errorcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }
        let mut parts: Vec<String> = self.iter_names().map(|(name, _)| name.to_string()).collect();
        let unnamed = self.bits() & !Errorcode::all().bits();
        if unnamed != 0 {
            parts.push(format!("{:#06x}", unnamed));
        }
        f.write_str(&parts.join(", "))
    }
}

fn write_flags<I>(f: &mut fmt::Formatter<'_>, flags: I) -> fmt::Result
where
    I: IntoIterator<Item = (&'static str, bool)>,
{
    let rendered: Vec<String> = flags
        .into_iter()
        .map(|(name, on)| format!("{}={}", name, on))
        .collect();
    f.write_str(&rendered.join(" "))
}

impl fmt::Display for DigitalInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flags(
            f,
            [
                ("EN", self.contains(DigitalInputs::EN)),
                ("XR", self.contains(DigitalInputs::XR)),
                ("LD", self.contains(DigitalInputs::LD)),
                ("ML", self.contains(DigitalInputs::ML)),
            ],
        )
    }
}

impl fmt::Display for DigitalOutputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flags(
            f,
            [
                ("CR", self.contains(DigitalOutputs::CR)),
                ("LR", self.contains(DigitalOutputs::LR)),
                ("VR", self.contains(DigitalOutputs::VR)),
                ("ER", self.contains(DigitalOutputs::ER)),
            ],
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.measurements;
        writeln!(f, "EV status: {}", self.ev_status)?;
        writeln!(f, "Proximity current: {} A", self.proximity_current)?;
        writeln!(
            f,
            "Charge time: {}:{:02}",
            self.charge_time_hours, self.charge_time_minutes
        )?;
        writeln!(f, "DIP configuration: {}", self.dip_configuration)?;
        writeln!(f, "Firmware version: {}", self.firmware_version)?;
        writeln!(f, "Error state: {}", self.errorcode)?;
        writeln!(
            f,
            "Voltage [V]: L1 {:.2}, L2 {:.2}, L3 {:.2}",
            m.l1_voltage, m.l2_voltage, m.l3_voltage
        )?;
        writeln!(
            f,
            "Current [A]: L1 {:.2}, L2 {:.2}, L3 {:.2}",
            m.l1_current, m.l2_current, m.l3_current
        )?;
        writeln!(f, "Active power [W]: {:.2}", m.active_power)?;
        writeln!(f, "Reactive power [var]: {:.2}", m.reactive_power)?;
        writeln!(f, "Apparent power [VA]: {:.2}", m.apparent_power)?;
        writeln!(f, "Power factor: {:.3}", m.power_factor)?;
        writeln!(f, "Energy [kWh]: {:.2}", m.energy)?;
        writeln!(f, "Max power (charge sequence) [W]: {:.2}", m.max_power)?;
        writeln!(f, "Current charge power: {:.2}", m.current_charge_power)?;
        writeln!(f, "Frequency [Hz]: {:.2}", m.frequency)?;
        writeln!(
            f,
            "Max current [A]: L1 {:.2}, L2 {:.2}, L3 {:.2}",
            m.l1_max_current, m.l2_max_current, m.l3_max_current
        )?;
        writeln!(f, "Overcurrent protection: {}", self.overcurrent_protection)?;
        writeln!(f, "Digital inputs: {}", self.digital_inputs)?;
        write!(f, "Digital outputs: {}", self.digital_outputs)?;
        if let Some(amps) = self.actual_charging_current {
            write!(f, "\nActual charging current: {} A", amps)?;
        }
        Ok(())
    }
}

/// Write the formatted status followed by a newline
pub fn write_formatted_status<W: io::Write>(out: &mut W, status: &Status) -> io::Result<()> {
    writeln!(out, "{}", status)
}
