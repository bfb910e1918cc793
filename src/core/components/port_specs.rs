use crate::core::values::{Value, ValueType};

/// Direction of a port relative to its owning part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Receives its value from a single upstream connection
    In,
    /// Written by the owning part's behavior
    Out,
}

/// Retention semantic of a port value between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Semantic {
    /// Keeps the last written value until rewritten
    #[default]
    Persistent,
    /// Falls back to the initial value on every step it is not written
    Transient,
}

/// Port specification for part inputs and outputs
#[derive(Debug, Clone)]
pub struct PortSpec {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: Direction,
    /// Value type carried by the port
    pub value_type: ValueType,
    /// Value held before anything is written or delivered
    pub initial: Value,
    /// Retention semantic
    pub semantic: Semantic,
    /// Optional description for documentation
    pub description: Option<String>,
}

impl PortSpec {
    /// Create a new input port starting out UNKNOWN
    pub fn input(name: &str, value_type: ValueType) -> Self {
        Self::new(name, Direction::In, value_type)
    }

    /// Create a new output port starting out UNKNOWN
    pub fn output(name: &str, value_type: ValueType) -> Self {
        Self::new(name, Direction::Out, value_type)
    }

    fn new(name: &str, direction: Direction, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            direction,
            value_type,
            initial: Value::unknown(value_type),
            semantic: Semantic::Persistent,
            description: None,
        }
    }

    /// Set the initial (reset) value
    pub fn with_initial(mut self, initial: impl Into<Value>) -> Self {
        self.initial = initial.into();
        self
    }

    /// Mark this port as transient
    pub fn transient(mut self) -> Self {
        self.semantic = Semantic::Transient;
        self
    }

    /// Mark this port as persistent
    pub fn persistent(mut self) -> Self {
        self.semantic = Semantic::Persistent;
        self
    }

    /// Add a description to this port
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::In
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Out
    }
}

/// Event queue specification
#[derive(Debug, Clone)]
pub struct QueueSpec {
    /// Queue name, shares the namespace of the part's ports
    pub name: String,
    /// Always `In` for queues read by the owning part
    pub direction: Direction,
    /// Element type, must match every wired port
    pub value_type: ValueType,
    /// Maximum number of pending events
    pub capacity: usize,
}

impl QueueSpec {
    /// Create an input event queue
    pub fn input(name: &str, value_type: ValueType, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::In,
            value_type,
            capacity,
        }
    }
}
