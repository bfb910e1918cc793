//! Waveform monitors.
//!
//! A monitor samples a set of ports against a time reference port after
//! every step and keeps a change-only record stream, optionally written out
//! as a VCD file.

pub mod monitor;
pub mod spec;
pub mod vcd;

pub use monitor::{WaveRecord, WaveformMonitor};
pub use spec::WaveformSpec;
pub use vcd::VcdWriter;
