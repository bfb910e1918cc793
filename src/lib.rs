//! Hierarchical, step-based simulation of hardware parts.
//!
//! A design is a tree of parts with typed ports, wired by dotted paths,
//! elaborated once by [`Simulation`] and stepped by [`CycleEngine`].

pub mod core;

// Re-export commonly used types
pub use crate::core::builder::{PartInfo, Simulation};
pub use crate::core::components::{Behavior, Component, EvalContext, PartBuilder, PortSpec, QueueSpec, Schedule};
pub use crate::core::errors::{SimError, TopologyError};
pub use crate::core::events::EventQueue;
pub use crate::core::execution::{CycleEngine, ExecutionStrategy, SimulationConfig, SimulationEngine, StopHandle};
pub use crate::core::values::{Logic, Value, ValueType};
pub use crate::core::waveform::{WaveRecord, WaveformSpec};
