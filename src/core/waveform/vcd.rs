//! IEEE 1364 Value Change Dump output.

use crate::core::errors::SimError;
use crate::core::values::Value;
use std::io::{self, Write};
use vcd_ng::{IdCode, SimulationCommand, TimescaleUnit};

/// VCD writer for one monitor.
///
/// All signals live in a single scope; `vcd_ng` assigns the identifier
/// codes in declaration order.
pub struct VcdWriter<W: Write> {
    writer: vcd_ng::Writer<W>,
    id_codes: Vec<IdCode>,
    current_time: Option<u64>,
}

impl<W: Write> VcdWriter<W> {
    /// Write the header and variable definitions for `signals`, given as
    /// `(name, width)` pairs
    pub fn new(writer: W, scope: &str, timescale: &str, signals: &[(&str, u32)]) -> Result<Self, SimError> {
        let (ratio, unit) = parse_timescale(timescale)?;
        let mut writer = vcd_ng::Writer::new(writer);
        writer.timescale(ratio, unit)?;
        writer.add_module(scope)?;
        let mut id_codes = Vec::with_capacity(signals.len());
        for (name, width) in signals {
            id_codes.push(writer.add_wire(*width, name)?);
        }
        writer.upscope()?;
        writer.enddefinitions()?;
        Ok(Self {
            writer,
            id_codes,
            current_time: None,
        })
    }

    /// Write the initial value of every signal
    pub fn dump_initial(&mut self, time: u64, values: &[Value]) -> Result<(), SimError> {
        self.advance(time)?;
        self.writer.begin(SimulationCommand::Dumpvars)?;
        for (signal, value) in values.iter().enumerate() {
            self.write_value(signal, value)?;
        }
        self.writer.end()?;
        Ok(())
    }

    /// Write one value change
    pub fn change(&mut self, time: u64, signal: usize, value: &Value) -> Result<(), SimError> {
        self.advance(time)?;
        self.write_value(signal, value)
    }

    /// Close the dump; dropping the writer flushes any buffering below it
    pub fn close(self) {
        drop(self.writer);
    }

    fn advance(&mut self, time: u64) -> Result<(), SimError> {
        if self.current_time != Some(time) {
            self.writer.timestamp(time)?;
            self.current_time = Some(time);
        }
        Ok(())
    }

    fn write_value(&mut self, signal: usize, value: &Value) -> Result<(), SimError> {
        let id_code = self.id_codes[signal];
        let token = value.to_vcd();
        match token.strip_prefix('b') {
            Some(bits) => {
                let bits: Vec<vcd_ng::Value> = bits.chars().map(vcd_bit).collect();
                self.writer.change_vector(id_code, &bits)?;
            }
            None => {
                let bit = token.chars().next().map_or(vcd_ng::Value::X, vcd_bit);
                self.writer.change_scalar(id_code, bit)?;
            }
        }
        Ok(())
    }
}

fn vcd_bit(c: char) -> vcd_ng::Value {
    match c {
        '0' => vcd_ng::Value::V0,
        '1' => vcd_ng::Value::V1,
        'z' => vcd_ng::Value::Z,
        _ => vcd_ng::Value::X,
    }
}

/// Split a timescale such as `10ns` into its ratio and unit
fn parse_timescale(timescale: &str) -> Result<(u32, TimescaleUnit), SimError> {
    let invalid = || {
        SimError::WaveformIo(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid VCD timescale '{}'", timescale),
        ))
    };
    let text = timescale.trim();
    let split = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let ratio: u32 = text[..split].parse().map_err(|_| invalid())?;
    let unit = match text[split..].trim() {
        "s" => TimescaleUnit::S,
        "ms" => TimescaleUnit::MS,
        "us" => TimescaleUnit::US,
        "ns" => TimescaleUnit::NS,
        "ps" => TimescaleUnit::PS,
        "fs" => TimescaleUnit::FS,
        _ => return Err(invalid()),
    };
    Ok((ratio, unit))
}
