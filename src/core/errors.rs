//! Error types for design construction and simulation.
//!
//! Construction problems are [`TopologyError`]s and are fatal: the design
//! cannot be simulated. Runtime problems are [`SimError`] variants; queue
//! overflow is reported to the producer and leaves the step loop intact,
//! while scheduling violations halt the run with the step index and the
//! path of the offending part.

use crate::core::values::ValueType;
use std::io;

/// Errors detected while elaborating a design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// Two ports/queues (or two children) of one part share a name.
    #[error("duplicate {kind} '{name}' in '{path}'")]
    DuplicateIdentifier {
        path: String,
        kind: &'static str,
        name: String,
    },

    /// A dotted path does not name a declared part, port or queue.
    #[error("unresolved path '{path}'")]
    UnresolvedPath { path: String },

    /// The endpoints of a wire carry different value types.
    #[error("type mismatch wiring '{source_path}' ({source_type}) to '{dest}' ({dest_type})")]
    TypeMismatch {
        source_path: String,
        source_type: ValueType,
        dest: String,
        dest_type: ValueType,
    },

    /// The endpoint directions are not legal for the wire's scope.
    #[error("direction mismatch wiring '{source_path}' to '{dest}': {reason}")]
    DirectionMismatch {
        source_path: String,
        dest: String,
        reason: String,
    },

    /// The endpoints are not siblings or parent/child of each other.
    #[error("illegal wire '{source_path}' -> '{dest}': {reason}")]
    IllegalWire {
        source_path: String,
        dest: String,
        reason: String,
    },

    /// A destination already has an incoming wire.
    #[error("'{dest}' is already driven by '{existing}', cannot also connect '{source_path}'")]
    DoubleDriven {
        dest: String,
        existing: String,
        source_path: String,
    },

    /// A declared initial value does not match its port type.
    #[error("initial value of '{path}' has type {found}, port is {expected}")]
    InitialValueType {
        path: String,
        expected: ValueType,
        found: ValueType,
    },

    /// Any other malformed declaration (bad width, zero capacity, ...).
    #[error("invalid declaration '{path}': {reason}")]
    InvalidDeclaration { path: String, reason: String },

    /// Siblings under a dataflow strategy form a zero-delay loop.
    #[error("combinational cycle among children of '{path}'")]
    CombinationalCycle { path: String },
}

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The design is malformed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// An event queue was full when a producer tried to enqueue.
    #[error("event queue '{queue}' overflow (capacity {capacity})")]
    Overflow { queue: String, capacity: usize },

    /// A producer enqueued a value of the wrong type.
    #[error("event queue '{queue}' expects {expected}, got {found}")]
    QueueTypeMismatch {
        queue: String,
        expected: ValueType,
        found: ValueType,
    },

    /// A behavior accessed a port in a way its part is not allowed to.
    #[error("scheduling violation at step {step} in '{path}': {reason}")]
    SchedulingViolation {
        step: u64,
        path: String,
        reason: String,
    },

    /// A behavior reported a failure of its own.
    #[error("behavior of '{path}' failed at step {step}: {message}")]
    Behavior {
        step: u64,
        path: String,
        message: String,
    },

    /// A lookup by path on a built engine failed.
    #[error("no {kind} at '{path}'")]
    NotFound { kind: &'static str, path: String },

    /// Failed to set up the worker pool for concurrent strategies.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

impl SimError {
    /// Whether the run must halt on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SimError::Overflow { .. } | SimError::QueueTypeMismatch { .. })
    }
}
