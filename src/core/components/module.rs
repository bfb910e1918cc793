use crate::core::components::evaluation_context::EvalContext;
use crate::core::components::port_specs::{PortSpec, QueueSpec};
use crate::core::components::schedule::{EdgeTrigger, Schedule};
use crate::core::components::traits::{Behavior, FnBehavior};
use crate::core::errors::SimError;
use crate::core::execution::config::ExecutionStrategy;

/// Declaration of a part before elaboration.
///
/// A part owns its ports, event queues and children. Wires declared here
/// use paths relative to the part: `"en"` names one of its own ports and
/// `"alu.result"` a port of its child `alu`.
pub struct PartBuilder {
    pub(crate) name: String,
    pub(crate) ports: Vec<PortSpec>,
    pub(crate) queues: Vec<QueueSpec>,
    pub(crate) children: Vec<PartBuilder>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) schedule: Schedule,
    pub(crate) edge: Option<EdgeTrigger>,
    pub(crate) strategy: Option<ExecutionStrategy>,
    pub(crate) wires: Vec<(String, String)>,
    pub(crate) event_wires: Vec<(String, String)>,
}

impl PartBuilder {
    /// Create a new part with no ports, children or behavior
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ports: Vec::new(),
            queues: Vec::new(),
            children: Vec::new(),
            behavior: None,
            schedule: Schedule::always(),
            edge: None,
            strategy: None,
            wires: Vec::new(),
            event_wires: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a port; declaration order is preserved
    pub fn port(mut self, spec: PortSpec) -> Self {
        self.ports.push(spec);
        self
    }

    pub fn ports(mut self, specs: impl IntoIterator<Item = PortSpec>) -> Self {
        self.ports.extend(specs);
        self
    }

    /// Declare an event queue
    pub fn queue(mut self, spec: QueueSpec) -> Self {
        self.queues.push(spec);
        self
    }

    /// Add a child part; children are invoked in declaration order unless
    /// the strategy says otherwise
    pub fn child(mut self, child: PartBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = PartBuilder>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach the behavior routine
    pub fn behavior<B: Behavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Attach a closure as the behavior routine
    pub fn behavior_fn<F>(self, f: F) -> Self
    where
        F: FnMut(&mut EvalContext<'_>) -> Result<(), SimError> + Send + 'static,
    {
        self.behavior(FnBehavior(f))
    }

    /// Set the scheduling condition
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Make the behavior body edge sensitive
    pub fn edge(mut self, trigger: EdgeTrigger) -> Self {
        self.edge = Some(trigger);
        self
    }

    pub fn rising_edge(self, port: &str) -> Self {
        self.edge(EdgeTrigger::rising(port))
    }

    pub fn falling_edge(self, port: &str) -> Self {
        self.edge(EdgeTrigger::falling(port))
    }

    /// Set the execution strategy for the children of this part
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Declare a wire between two paths relative to this part
    pub fn wire(mut self, source: &str, dest: &str) -> Self {
        self.wires.push((source.to_string(), dest.to_string()));
        self
    }

    /// Declare a wire from one of this part's queues to a port
    pub fn wire_event(mut self, queue: &str, dest: &str) -> Self {
        self.event_wires.push((queue.to_string(), dest.to_string()));
        self
    }
}

impl std::fmt::Debug for PartBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartBuilder")
            .field("name", &self.name)
            .field("ports", &self.ports)
            .field("queues", &self.queues)
            .field("children", &self.children)
            .field("schedule", &self.schedule)
            .field("edge", &self.edge)
            .field("strategy", &self.strategy)
            .finish()
    }
}
