use crate::core::builder::hierarchy::{self, Endpoint, PartInfo};
use crate::core::components::instance::{PartInstance, PartMeta};
use crate::core::components::module::PartBuilder;
use crate::core::components::port_specs::PortSpec;
use crate::core::components::schedule::{ArgSlot, EdgeDetector};
use crate::core::components::state::PortState;
use crate::core::connections::{
    ConnectionManager, ConnectionValidator, EndpointInfo, PortValidator, WireSource,
};
use crate::core::errors::{SimError, TopologyError};
use crate::core::events::EventQueue;
use crate::core::execution::config::{ExecutionStrategy, SimulationConfig};
use crate::core::execution::cycle_engine::CycleEngine;
use crate::core::execution::execution_order::ExecutionOrderBuilder;
use crate::core::execution::simulation_engine::SimulationEngine;
use crate::core::types::{join_path, PartId, PortRef, QueueRef};
use crate::core::waveform::{VcdWriter, WaveformMonitor, WaveformSpec};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;

/// Wire declared on a `PartBuilder`, with paths already made absolute
enum PendingWire {
    Port { source: String, dest: String },
    Event { queue: String, dest: String },
}

struct PendingMonitor {
    spec: WaveformSpec,
    time_reference: PortRef,
    signals: Vec<(String, PortRef)>,
}

/// Elaborated design that still accepts wires and monitors
///
/// Construction resolves the part tree into a pre-order arena once; every
/// later lookup goes through that arena and is never repeated per step.
pub struct Simulation {
    config: SimulationConfig,
    parts: Vec<PartInstance>,
    /// Strategy declared on each part, `None` to use the configured default
    declared_strategy: Vec<Option<ExecutionStrategy>>,
    connections: ConnectionManager,
    monitors: Vec<PendingMonitor>,
}

impl Simulation {
    /// Elaborate a design with the default configuration
    pub fn new(root: PartBuilder) -> Result<Self, TopologyError> {
        Self::with_config(root, SimulationConfig::default())
    }

    /// Elaborate a design
    pub fn with_config(root: PartBuilder, config: SimulationConfig) -> Result<Self, TopologyError> {
        if root.name.is_empty() || root.name.contains('.') {
            return Err(TopologyError::InvalidDeclaration {
                path: root.name.clone(),
                reason: "root name must be a single path segment".to_string(),
            });
        }

        let mut parts = Vec::new();
        let mut declared_strategy = Vec::new();
        let mut wires = Vec::new();
        Self::elaborate(root, None, "", &mut parts, &mut declared_strategy, &mut wires)?;

        let mut simulation = Self {
            config,
            connections: ConnectionManager::new(parts.len()),
            parts,
            declared_strategy,
            monitors: Vec::new(),
        };
        for wire in wires {
            match wire {
                PendingWire::Port { source, dest } => simulation.wire(&source, &dest)?,
                PendingWire::Event { queue, dest } => simulation.wire_event(&queue, &dest)?,
            }
        }
        Ok(simulation)
    }

    /// Place `builder` and its subtree into the arena in pre-order
    fn elaborate(
        builder: PartBuilder,
        parent: Option<PartId>,
        parent_path: &str,
        parts: &mut Vec<PartInstance>,
        declared_strategy: &mut Vec<Option<ExecutionStrategy>>,
        wires: &mut Vec<PendingWire>,
    ) -> Result<PartId, TopologyError> {
        let PartBuilder {
            name,
            ports,
            queues,
            children,
            behavior,
            schedule,
            edge,
            strategy,
            wires: local_wires,
            event_wires,
        } = builder;
        let path = join_path(parent_path, &name);

        let child_names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
        PortValidator::validate_declarations(&path, &ports, &queues, &child_names)?;

        let port_index: HashMap<String, usize> = ports
            .iter()
            .enumerate()
            .map(|(index, port)| (port.name.clone(), index))
            .collect();
        let queue_index: HashMap<String, usize> = queues
            .iter()
            .enumerate()
            .map(|(index, queue)| (queue.name.clone(), index))
            .collect();

        let schedule = schedule.resolve(&path, |arg| {
            port_index
                .get(arg)
                .map(|&index| ArgSlot::Port(index))
                .or_else(|| queue_index.get(arg).map(|&index| ArgSlot::Queue(index)))
        })?;

        let edge = match edge {
            Some(trigger) => {
                let port = *port_index.get(&trigger.port).ok_or_else(|| {
                    TopologyError::UnresolvedPath {
                        path: join_path(&path, &trigger.port),
                    }
                })?;
                Some(EdgeDetector::new(port, trigger.kind))
            }
            None => None,
        };

        let id = PartId::from_raw(parts.len() as u32);
        let port_count = ports.len();
        let queue_count = queues.len();
        let port_states = ports.iter().map(|port| PortState::new(port.initial)).collect();
        let event_queues = queues
            .iter()
            .map(|queue| EventQueue::new(&join_path(&path, &queue.name), queue.value_type, queue.capacity))
            .collect();

        parts.push(PartInstance {
            meta: PartMeta {
                name,
                path: path.clone(),
                parent,
                children: Vec::new(),
                child_order: Vec::new(),
                subtree_len: 1,
                strategy: ExecutionStrategy::default(),
                ports,
                port_index,
                queues,
                queue_index,
                child_index: HashMap::new(),
                wire_driven: vec![false; port_count],
            },
            ports: port_states,
            queues: event_queues,
            events: vec![None; queue_count],
            staged: vec![None; port_count],
            schedule,
            edge,
            behavior,
        });
        declared_strategy.push(strategy);

        for child in children {
            let child_name = child.name.clone();
            let child_id = Self::elaborate(child, Some(id), &path, parts, declared_strategy, wires)?;
            let meta = &mut parts[id.index()].meta;
            meta.children.push(child_id);
            meta.child_index.insert(child_name, child_id);
        }
        parts[id.index()].meta.subtree_len = parts.len() - id.index();

        wires.extend(local_wires.into_iter().map(|(source, dest)| PendingWire::Port {
            source: join_path(&path, &source),
            dest: join_path(&path, &dest),
        }));
        wires.extend(event_wires.into_iter().map(|(queue, dest)| PendingWire::Event {
            queue: join_path(&path, &queue),
            dest: join_path(&path, &dest),
        }));
        Ok(id)
    }

    fn port_spec(&self, port: PortRef) -> &PortSpec {
        &self.parts[port.part.index()].meta.ports[port.port]
    }

    fn endpoint_info<'a>(&self, path: &'a str, port: PortRef) -> EndpointInfo<'a> {
        EndpointInfo {
            path,
            part: port.part,
            parent: self.parts[port.part.index()].meta.parent,
            direction: self.port_spec(port).direction,
        }
    }

    fn source_path(&self, source: WireSource) -> String {
        match source {
            WireSource::Port(port) => {
                let meta = &self.parts[port.part.index()].meta;
                join_path(&meta.path, &meta.ports[port.port].name)
            }
            WireSource::Queue(queue) => {
                let meta = &self.parts[queue.part.index()].meta;
                join_path(&meta.path, &meta.queues[queue.queue].name)
            }
        }
    }

    fn check_driver(&self, source_path: &str, dest_path: &str, dest: PortRef) -> Result<(), TopologyError> {
        match self.connections.driver_of(dest) {
            Some(existing) => Err(TopologyError::DoubleDriven {
                dest: dest_path.to_string(),
                existing: self.source_path(existing),
                source_path: source_path.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Connect two endpoints given by full dotted paths such as
    /// `top.src.out_0` and `top.reg.in_0`.
    ///
    /// A queue path as source is treated like [`wire_event`](Self::wire_event).
    pub fn wire(&mut self, source: &str, dest: &str) -> Result<(), TopologyError> {
        let source_endpoint = hierarchy::resolve_endpoint(&self.parts, source)?;
        let dest_port = match hierarchy::resolve_endpoint(&self.parts, dest)? {
            Endpoint::Port(port) => port,
            Endpoint::Queue(_) => {
                return Err(TopologyError::DirectionMismatch {
                    source_path: source.to_string(),
                    dest: dest.to_string(),
                    reason: "event queues cannot be wire destinations".to_string(),
                })
            }
        };

        match source_endpoint {
            Endpoint::Port(source_port) => self.connect_ports(source, source_port, dest, dest_port),
            Endpoint::Queue(queue) => self.connect_queue(source, queue, dest, dest_port),
        }
    }

    /// Connect an event queue to an input port of its part or of one of its
    /// direct children
    pub fn wire_event(&mut self, queue: &str, dest: &str) -> Result<(), TopologyError> {
        match hierarchy::resolve_endpoint(&self.parts, queue)? {
            Endpoint::Queue(_) => self.wire(queue, dest),
            Endpoint::Port(_) => Err(TopologyError::IllegalWire {
                source_path: queue.to_string(),
                dest: dest.to_string(),
                reason: "source is not an event queue".to_string(),
            }),
        }
    }

    fn connect_ports(
        &mut self,
        source_path: &str,
        source: PortRef,
        dest_path: &str,
        dest: PortRef,
    ) -> Result<(), TopologyError> {
        let kind = ConnectionValidator::classify_port_wire(
            self.endpoint_info(source_path, source),
            self.endpoint_info(dest_path, dest),
        )?;
        PortValidator::validate_types(
            source_path,
            self.port_spec(source).value_type,
            dest_path,
            self.port_spec(dest).value_type,
        )?;
        self.check_driver(source_path, dest_path, dest)?;

        self.connections.add_port_wire(source, dest, kind);
        self.parts[dest.part.index()].meta.wire_driven[dest.port] = true;
        debug!("Wired {} -> {} ({:?})", source_path, dest_path, kind);
        Ok(())
    }

    fn connect_queue(
        &mut self,
        queue_path: &str,
        queue: QueueRef,
        dest_path: &str,
        dest: PortRef,
    ) -> Result<(), TopologyError> {
        ConnectionValidator::validate_queue_wire(queue_path, queue.part, self.endpoint_info(dest_path, dest))?;
        let element_type = self.parts[queue.part.index()].meta.queues[queue.queue].value_type;
        PortValidator::validate_types(queue_path, element_type, dest_path, self.port_spec(dest).value_type)?;
        self.check_driver(queue_path, dest_path, dest)?;

        self.connections.add_queue_wire(queue, dest);
        self.parts[dest.part.index()].meta.wire_driven[dest.port] = true;
        debug!("Wired event queue {} -> {}", queue_path, dest_path);
        Ok(())
    }

    /// Attach a waveform monitor; every path must name a port
    pub fn monitor(&mut self, spec: WaveformSpec) -> Result<(), TopologyError> {
        let time_reference = hierarchy::resolve_port(&self.parts, &spec.time_reference)?;
        let mut signals: Vec<(String, PortRef)> = Vec::with_capacity(spec.signals.len());
        for (name, path) in &spec.signals {
            if signals.iter().any(|(existing, _)| existing == name) {
                return Err(TopologyError::DuplicateIdentifier {
                    path: path.clone(),
                    kind: "signal",
                    name: name.clone(),
                });
            }
            signals.push((name.clone(), hierarchy::resolve_port(&self.parts, path)?));
        }
        self.monitors.push(PendingMonitor {
            spec,
            time_reference,
            signals,
        });
        Ok(())
    }

    /// Handle to an event queue, usable by producers before and after build
    pub fn queue(&self, path: &str) -> Result<EventQueue, SimError> {
        match hierarchy::resolve_endpoint(&self.parts, path)? {
            Endpoint::Queue(queue) => Ok(self.parts[queue.part.index()].queues[queue.queue].clone()),
            Endpoint::Port(_) => Err(SimError::NotFound {
                kind: "event queue",
                path: path.to_string(),
            }),
        }
    }

    /// Declared interface of the part at `path`
    pub fn interface(&self, path: &str) -> Result<PartInfo, SimError> {
        hierarchy::part_info(&self.parts, path).ok_or_else(|| SimError::NotFound {
            kind: "part",
            path: path.to_string(),
        })
    }

    /// Number of elaborated parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build and wrap the engine in a run loop bounded by the configured
    /// step limit
    pub fn build_engine(self) -> Result<SimulationEngine, SimError> {
        let max_steps = self.config.max_steps;
        Ok(SimulationEngine::new(self.build()?, max_steps))
    }

    /// Finish construction: fix child orders, settle wired values, set up the
    /// worker pool and monitors, and take the initial monitor sample
    pub fn build(mut self) -> Result<CycleEngine, SimError> {
        for index in 0..self.parts.len() {
            let strategy = self.declared_strategy[index].unwrap_or(self.config.default_strategy);
            let order = match strategy {
                ExecutionStrategy::Dataflow => {
                    let meta = &self.parts[index].meta;
                    let names: Vec<&str> = meta
                        .children
                        .iter()
                        .map(|child| self.parts[child.index()].meta.name.as_str())
                        .collect();
                    let edges = self.connections.sibling_edges(PartId::from_raw(index as u32), meta);
                    ExecutionOrderBuilder::order_children(&meta.path, &names, &edges)?
                        .into_iter()
                        .map(|position| meta.children[position])
                        .collect()
                }
                ExecutionStrategy::Sequential | ExecutionStrategy::Concurrent => {
                    self.parts[index].meta.children.clone()
                }
            };
            let meta = &mut self.parts[index].meta;
            meta.strategy = strategy;
            meta.child_order = order;
        }

        self.connections.settle(&mut self.parts);

        let pool = match self.config.thread_pool_size {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        let root_name = self.parts[0].meta.name.clone();
        let mut monitors = Vec::with_capacity(self.monitors.len());
        for pending in std::mem::take(&mut self.monitors) {
            let writer = match &pending.spec.file {
                Some(path) => {
                    let widths: Vec<(&str, u32)> = pending
                        .signals
                        .iter()
                        .map(|(name, port)| (name.as_str(), self.port_spec(*port).value_type.width()))
                        .collect();
                    let file = File::create(path)?;
                    Some(VcdWriter::new(
                        BufWriter::new(file),
                        &root_name,
                        &pending.spec.timescale,
                        &widths,
                    )?)
                }
                None => None,
            };
            monitors.push(WaveformMonitor::new(
                pending.spec.time_reference,
                pending.time_reference,
                pending.signals,
                pending.spec.keep_records,
                writer,
            ));
        }

        info!(
            "Built simulation '{}': {} parts, {} wires, {} monitors",
            root_name,
            self.parts.len(),
            self.connections.len(),
            monitors.len()
        );
        CycleEngine::new(self.parts, self.connections, pool, monitors)
    }
}
