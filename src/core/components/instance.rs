use crate::core::components::evaluation_context::EvalContext;
use crate::core::components::port_specs::{PortSpec, QueueSpec, Semantic};
use crate::core::components::schedule::{EdgeDetector, ResolvedSchedule};
use crate::core::components::state::PortState;
use crate::core::components::traits::Behavior;
use crate::core::errors::SimError;
use crate::core::events::{EventQueue, QueuedEvent};
use crate::core::execution::config::ExecutionStrategy;
use crate::core::types::PartId;
use crate::core::values::Value;
use log::trace;
use std::collections::HashMap;

/// Static description of an elaborated part, fixed after construction
#[derive(Debug)]
pub struct PartMeta {
    pub(crate) name: String,
    pub(crate) path: String,
    /// Read-only back reference, used for wire classification only
    pub(crate) parent: Option<PartId>,
    /// Children in declaration order
    pub(crate) children: Vec<PartId>,
    /// Children in execution order
    pub(crate) child_order: Vec<PartId>,
    /// Number of arena slots taken by this part and all its descendants
    pub(crate) subtree_len: usize,
    pub(crate) strategy: ExecutionStrategy,
    pub(crate) ports: Vec<PortSpec>,
    pub(crate) port_index: HashMap<String, usize>,
    pub(crate) queues: Vec<QueueSpec>,
    pub(crate) queue_index: HashMap<String, usize>,
    pub(crate) child_index: HashMap<String, PartId>,
    /// Per port: whether a wire drives it
    pub(crate) wire_driven: Vec<bool>,
}

impl PartMeta {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<PartId> {
        self.parent
    }

    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    pub fn ports(&self) -> &[PortSpec] {
        &self.ports
    }

    pub fn queues(&self) -> &[QueueSpec] {
        &self.queues
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Elaborated part: static description plus runtime state
pub struct PartInstance {
    pub(crate) meta: PartMeta,
    pub(crate) ports: Vec<PortState>,
    pub(crate) queues: Vec<EventQueue>,
    /// Events popped from each queue during the current step
    pub(crate) events: Vec<Option<QueuedEvent>>,
    pub(crate) staged: Vec<Option<Value>>,
    pub(crate) schedule: ResolvedSchedule,
    pub(crate) edge: Option<EdgeDetector>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl PartInstance {
    pub fn meta(&self) -> &PartMeta {
        &self.meta
    }

    pub fn port_value(&self, index: usize) -> Option<Value> {
        self.ports.get(index).map(PortState::value)
    }

    /// Evaluate the scheduling predicate against committed values
    pub(crate) fn is_ready(&self) -> bool {
        self.schedule.is_ready(&self.ports, &self.queues)
    }

    /// Take a look at the head event of every queue of this part. The
    /// events stay queued until the behavior is allowed to fire.
    pub(crate) fn peek_events(&mut self) {
        for (slot, queue) in self.events.iter_mut().zip(&self.queues) {
            *slot = queue.peek();
        }
    }

    /// Remove the events peeked this step from their queues
    fn consume_events(&mut self) {
        for (slot, queue) in self.events.iter().zip(&self.queues) {
            if let Some(event) = slot {
                queue.remove_head(event.id);
            }
        }
    }

    /// Deliver a queue-fed value to one of this part's input ports
    pub(crate) fn deliver(&mut self, port: usize, event: Option<Value>) {
        match event {
            Some(value) => self.ports[port].set(value),
            None if self.meta.ports[port].semantic == Semantic::Transient => {
                let initial = self.meta.ports[port].initial;
                self.ports[port].set(initial);
            }
            None => {}
        }
    }

    /// Run the behavior body if the edge trigger allows it, then commit.
    ///
    /// Peeked events are consumed only when the edge fires; otherwise they
    /// wait for a later step. Returns whether the body ran. The edge latch
    /// moves to the sampled value whether or not the edge fired.
    pub(crate) fn run_behavior(&mut self, step: u64) -> Result<bool, SimError> {
        let sample = self
            .edge
            .as_ref()
            .map(|detector| self.ports[detector.port].value());
        let fires = match (&self.edge, &sample) {
            (Some(detector), Some(value)) => detector.fires(value),
            _ => true,
        };

        let mut ran = false;
        if fires {
            self.consume_events();
            if let Some(behavior) = self.behavior.as_mut() {
                self.staged.iter_mut().for_each(|slot| *slot = None);
                let mut ctx = EvalContext::new(
                    step,
                    &self.meta,
                    &self.ports,
                    &self.events,
                    &mut self.staged,
                );
                behavior.evaluate(&mut ctx)?;
                ran = true;
                self.commit();
            }
        }

        if let (Some(detector), Some(value)) = (self.edge.as_mut(), sample) {
            detector.latch(value);
        }
        Ok(ran)
    }

    /// Move staged writes into the output ports; unwritten transient
    /// outputs fall back to their initial value.
    fn commit(&mut self) {
        for (index, spec) in self.meta.ports.iter().enumerate() {
            if !spec.is_output() || self.meta.wire_driven[index] {
                continue;
            }
            match self.staged[index].take() {
                Some(value) => self.ports[index].set(value),
                None if spec.semantic == Semantic::Transient => self.ports[index].set(spec.initial),
                None => {}
            }
        }
        trace!("[{}] Committed outputs", self.meta.path);
    }
}

impl std::fmt::Debug for PartInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartInstance")
            .field("path", &self.meta.path)
            .field("ports", &self.ports)
            .field("queues", &self.queues)
            .finish()
    }
}
