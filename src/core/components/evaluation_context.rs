use crate::core::components::instance::PartMeta;
use crate::core::components::port_specs::{Direction, PortSpec};
use crate::core::components::state::PortState;
use crate::core::errors::SimError;
use crate::core::events::QueuedEvent;
use crate::core::values::{Logic, Value};

/// Evaluation context provided to a behavior during one step.
///
/// Only the part's own ports and queues are addressable. Reads return the
/// values committed before the behavior started; writes are staged until the
/// behavior returns.
pub struct EvalContext<'a> {
    step: u64,
    meta: &'a PartMeta,
    ports: &'a [PortState],
    events: &'a [Option<QueuedEvent>],
    staged: &'a mut [Option<Value>],
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(
        step: u64,
        meta: &'a PartMeta,
        ports: &'a [PortState],
        events: &'a [Option<QueuedEvent>],
        staged: &'a mut [Option<Value>],
    ) -> Self {
        Self {
            step,
            meta,
            ports,
            events,
            staged,
        }
    }

    /// Index of the step being evaluated
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Fully qualified path of the part
    pub fn path(&self) -> &str {
        &self.meta.path
    }

    fn port(&self, name: &str) -> Result<(usize, &'a PortSpec), SimError> {
        let meta: &'a PartMeta = self.meta;
        meta.port_index
            .get(name)
            .map(|&index| (index, &meta.ports[index]))
            .ok_or_else(|| self.violation(format!("access to undeclared port '{}'", name)))
    }

    /// Read the committed value of one of the part's ports
    pub fn read(&self, name: &str) -> Result<Value, SimError> {
        let (index, _) = self.port(name)?;
        Ok(self.ports[index].value())
    }

    /// Read a logic port
    pub fn read_logic(&self, name: &str) -> Result<Logic, SimError> {
        self.read(name)?.as_logic().ok_or_else(|| {
            self.violation(format!("port '{}' is not a logic port", name))
        })
    }

    /// Whether the port has held a defined value at least once
    pub fn ever_defined(&self, name: &str) -> Result<bool, SimError> {
        let (index, _) = self.port(name)?;
        Ok(self.ports[index].ever_defined())
    }

    /// Stage a value for one of the part's output ports
    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SimError> {
        let value = value.into();
        let (index, spec) = self.port(name)?;
        if spec.direction == Direction::In {
            return Err(self.violation(format!("write to input port '{}'", name)));
        }
        if self.meta.wire_driven[index] {
            return Err(self.violation(format!(
                "write to output port '{}' which is driven by a child wire",
                name
            )));
        }
        if value.value_type() != spec.value_type {
            return Err(self.violation(format!(
                "write of {} value to {} port '{}'",
                value.value_type(),
                spec.value_type,
                name
            )));
        }
        self.staged[index] = Some(value);
        Ok(())
    }

    /// Event popped from the named queue this step, if any
    pub fn event(&self, queue: &str) -> Result<Option<&QueuedEvent>, SimError> {
        let index = self
            .meta
            .queue_index
            .get(queue)
            .copied()
            .ok_or_else(|| self.violation(format!("access to undeclared queue '{}'", queue)))?;
        Ok(self.events[index].as_ref())
    }

    /// Build a scheduling violation carrying this step and part path
    pub fn violation(&self, reason: impl Into<String>) -> SimError {
        SimError::SchedulingViolation {
            step: self.step,
            path: self.meta.path.clone(),
            reason: reason.into(),
        }
    }

    /// Build a behavior failure carrying this step and part path
    pub fn fail(&self, message: impl Into<String>) -> SimError {
        SimError::Behavior {
            step: self.step,
            path: self.meta.path.clone(),
            message: message.into(),
        }
    }
}
