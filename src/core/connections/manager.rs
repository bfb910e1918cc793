use crate::core::components::instance::{PartInstance, PartMeta};
use crate::core::connections::connection_validator::WireKind;
use crate::core::types::{PartId, PortRef, QueueRef};
use std::collections::HashMap;

/// Driver of a wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSource {
    Port(PortRef),
    Queue(QueueRef),
}

/// Resolved wire table of an elaborated design
///
/// Wires are grouped by the part at which they propagate so that stepping a
/// part only touches its own subtree: down and queue wires by their source
/// part, sibling and up wires by the child that drives them.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Destination port -> its single driver
    drivers: HashMap<PortRef, WireSource>,
    /// Per part: (own input port, child input port)
    down: Vec<Vec<(usize, PortRef)>>,
    /// Per part: (own output port, sibling input or parent output)
    outgoing: Vec<Vec<(usize, PortRef)>>,
    /// Per part: (own queue, destination input port)
    queue_wires: Vec<Vec<(usize, PortRef)>>,
}

impl ConnectionManager {
    /// Create an empty table for `part_count` parts
    pub fn new(part_count: usize) -> Self {
        Self {
            drivers: HashMap::new(),
            down: vec![Vec::new(); part_count],
            outgoing: vec![Vec::new(); part_count],
            queue_wires: vec![Vec::new(); part_count],
        }
    }

    /// Current driver of a destination port, if any
    pub fn driver_of(&self, dest: PortRef) -> Option<WireSource> {
        self.drivers.get(&dest).copied()
    }

    pub fn is_driven(&self, dest: PortRef) -> bool {
        self.drivers.contains_key(&dest)
    }

    /// Record a validated port wire
    pub fn add_port_wire(&mut self, source: PortRef, dest: PortRef, kind: WireKind) {
        self.drivers.insert(dest, WireSource::Port(source));
        let group = match kind {
            WireKind::Down => &mut self.down,
            WireKind::Sibling | WireKind::Up => &mut self.outgoing,
        };
        group[source.part.index()].push((source.port, dest));
    }

    /// Record a validated queue wire
    pub fn add_queue_wire(&mut self, queue: QueueRef, dest: PortRef) {
        self.drivers.insert(dest, WireSource::Queue(queue));
        self.queue_wires[queue.part.index()].push((queue.queue, dest));
    }

    /// Number of wires in the table
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Wires among the children of `parent` as `(source, target)` positions
    /// in declaration order
    pub fn sibling_edges(&self, parent: PartId, meta: &PartMeta) -> Vec<(usize, usize)> {
        let position: HashMap<PartId, usize> = meta
            .children
            .iter()
            .enumerate()
            .map(|(i, &child)| (child, i))
            .collect();

        let mut edges = Vec::new();
        for (i, child) in meta.children.iter().enumerate() {
            for (_, dest) in &self.outgoing[child.index()] {
                if dest.part == parent {
                    continue;
                }
                if let Some(&j) = position.get(&dest.part) {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    /// Copy every down wire of the part at `parts[0]` (arena index `base`)
    pub(crate) fn propagate_down(&self, parts: &mut [PartInstance], base: usize) {
        for &(port, dest) in &self.down[base] {
            let value = parts[0].ports[port].value();
            parts[dest.part.index() - base].ports[dest.port].set(value);
        }
    }

    /// Copy the sibling and up wires driven by `child`, a child of the part
    /// at `parts[0]`
    pub(crate) fn propagate_outgoing(&self, parts: &mut [PartInstance], base: usize, child: PartId) {
        let source = child.index() - base;
        for &(port, dest) in &self.outgoing[child.index()] {
            let value = parts[source].ports[port].value();
            parts[dest.part.index() - base].ports[dest.port].set(value);
        }
    }

    /// Hand the events popped this step by the part at `parts[0]` to their
    /// wired ports
    pub(crate) fn deliver_events(&self, parts: &mut [PartInstance], base: usize) {
        for &(queue, dest) in &self.queue_wires[base] {
            let value = parts[0].events[queue].as_ref().map(|event| event.value);
            parts[dest.part.index() - base].deliver(dest.port, value);
        }
    }

    /// Propagate every port wire until all destinations match their
    /// drivers. Used once at build so wired inputs start out consistent.
    pub(crate) fn settle(&self, parts: &mut [PartInstance]) {
        let wires: Vec<(PortRef, PortRef)> = self
            .drivers
            .iter()
            .filter_map(|(dest, source)| match source {
                WireSource::Port(source) => Some((*source, *dest)),
                WireSource::Queue(_) => None,
            })
            .collect();

        // Port wires form chains without loops, so each pass settles at
        // least one more link.
        for _ in 0..=wires.len() {
            let mut changed = false;
            for (source, dest) in &wires {
                let value = parts[source.part.index()].ports[source.port].value();
                let target = &mut parts[dest.part.index()].ports[dest.port];
                if target.value() != value {
                    target.set(value);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

/// Connection statistics for debugging
#[derive(Debug)]
pub struct ConnectionStats {
    pub port_wires: usize,
    pub queue_wires: usize,
}

impl ConnectionManager {
    pub fn stats(&self) -> ConnectionStats {
        let queue_wires = self.queue_wires.iter().map(Vec::len).sum();
        ConnectionStats {
            port_wires: self.drivers.len() - queue_wires,
            queue_wires,
        }
    }
}
