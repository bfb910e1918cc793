pub mod builder;
pub mod components;
pub mod connections;
pub mod errors;
pub mod events;
pub mod execution;
pub mod types;
pub mod values;
pub mod waveform;
