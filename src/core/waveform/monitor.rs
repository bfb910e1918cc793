use crate::core::components::instance::PartInstance;
use crate::core::errors::SimError;
use crate::core::types::PortRef;
use crate::core::values::Value;
use crate::core::waveform::vcd::VcdWriter;
use log::{trace, warn};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;

/// One emitted waveform sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveRecord {
    pub time: u64,
    pub signal: String,
    pub value: Value,
}

/// Resolved monitor attached to a built engine
pub struct WaveformMonitor {
    time_path: String,
    time_reference: PortRef,
    names: Vec<String>,
    signals: Vec<PortRef>,
    last_values: Vec<Value>,
    last_time: Option<u64>,
    keep_records: bool,
    records: Vec<WaveRecord>,
    writer: Option<VcdWriter<BufWriter<File>>>,
}

impl WaveformMonitor {
    pub(crate) fn new(
        time_path: String,
        time_reference: PortRef,
        signals: Vec<(String, PortRef)>,
        keep_records: bool,
        writer: Option<VcdWriter<BufWriter<File>>>,
    ) -> Self {
        let (names, signals): (Vec<_>, Vec<_>) = signals.into_iter().unzip();
        Self {
            time_path,
            time_reference,
            names,
            signals,
            last_values: Vec::new(),
            last_time: None,
            keep_records,
            records: Vec::new(),
            writer,
        }
    }

    /// Sample every signal against the time reference.
    ///
    /// Nothing is emitted while the time reference is undefined. The first
    /// defined sample emits every signal, later samples only the changes.
    pub(crate) fn sample(&mut self, parts: &[PartInstance]) -> Result<(), SimError> {
        let read = |port: PortRef| parts[port.part.index()].ports[port.port].value();

        let Some(time) = read(self.time_reference).as_u64() else {
            trace!("[{}] Time reference undefined, sample skipped", self.time_path);
            return Ok(());
        };
        let values: Vec<Value> = self.signals.iter().map(|&port| read(port)).collect();

        match self.last_time {
            None => {
                if self.keep_records {
                    for (name, value) in self.names.iter().zip(&values) {
                        self.records.push(WaveRecord {
                            time,
                            signal: name.clone(),
                            value: *value,
                        });
                    }
                }
                if let Some(writer) = self.writer.as_mut() {
                    writer.dump_initial(time, &values)?;
                }
            }
            Some(last) if time < last => {
                warn!(
                    "[{}] Time reference moved backwards from {} to {}, sample dropped",
                    self.time_path, last, time
                );
                return Ok(());
            }
            Some(_) => {
                for (index, value) in values.iter().enumerate() {
                    if *value == self.last_values[index] {
                        continue;
                    }
                    if self.keep_records {
                        self.records.push(WaveRecord {
                            time,
                            signal: self.names[index].clone(),
                            value: *value,
                        });
                    }
                    if let Some(writer) = self.writer.as_mut() {
                        writer.change(time, index, value)?;
                    }
                }
            }
        }

        self.last_time = Some(time);
        self.last_values = values;
        Ok(())
    }

    /// All records emitted so far, in emission order. Empty when the
    /// monitor was configured without in-memory records.
    pub fn records(&self) -> &[WaveRecord] {
        &self.records
    }

    /// Records of one signal
    pub fn records_for<'a>(&'a self, signal: &'a str) -> impl Iterator<Item = &'a WaveRecord> + 'a {
        self.records.iter().filter(move |record| record.signal == signal)
    }

    pub fn signal_names(&self) -> &[String] {
        &self.names
    }

    /// Close the VCD stream; later samples only reach the in-memory records
    pub(crate) fn close(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.close();
        }
    }
}

impl std::fmt::Debug for WaveformMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformMonitor")
            .field("time_reference", &self.time_path)
            .field("signals", &self.names)
            .field("records", &self.records.len())
            .field("vcd", &self.writer.is_some())
            .finish()
    }
}
